mod loader;
mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{AgentTuning, Config, GatewayConfig, ProviderConfig, WorkspaceConfig};
