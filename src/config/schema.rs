use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration, constructed once at process start and passed by
/// reference to every component that needs it. There is no global lookup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub agent: AgentTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root of the internal workspace (inbox/rfq/orders/archive/output/memory
    /// live underneath). `~` expands to the user's home directory.
    #[serde(default = "default_workspace_root")]
    pub root: String,
    /// Drive-letter references ("d:", "d drive") resolve through this map.
    #[serde(default = "default_drives")]
    pub drives: BTreeMap<String, String>,
    /// Sibling directories of the home dir starting with this prefix are
    /// checked for cloud-synced variants of well-known folders.
    #[serde(default = "default_cloud_prefix", rename = "cloudPrefix")]
    pub cloud_prefix: String,
    /// Roots scanned by full-disk file search. Defaults to the home directory
    /// plus any configured drive root that exists.
    #[serde(default, rename = "searchRoots")]
    pub search_roots: Vec<String>,
}

fn default_workspace_root() -> String {
    "~/.deskbot/workspace".to_string()
}

fn default_drives() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("c".to_string(), "C:\\".to_string()),
        ("d".to_string(), "D:\\".to_string()),
    ])
}

fn default_cloud_prefix() -> String {
    "OneDrive".to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            drives: default_drives(),
            cloud_prefix: default_cloud_prefix(),
            search_roots: Vec::new(),
        }
    }
}

impl WorkspaceConfig {
    /// Workspace root with `~` expanded.
    pub fn root_path(&self) -> PathBuf {
        expand_home(&self.root)
    }

    pub fn inbox_dir(&self) -> PathBuf {
        self.root_path().join("inbox")
    }

    pub fn rfq_dir(&self) -> PathBuf {
        self.root_path().join("rfq")
    }

    pub fn orders_dir(&self) -> PathBuf {
        self.root_path().join("orders")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root_path().join("archive")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root_path().join("output")
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.root_path().join("memory")
    }

    /// Create every workspace subdirectory. Called once at startup.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dir in [
            self.inbox_dir(),
            self.rfq_dir(),
            self.orders_dir(),
            self.archive_dir(),
            self.output_dir(),
            self.memory_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                anyhow::anyhow!("Failed to create workspace directory {}: {}", dir.display(), e)
            })?;
        }
        Ok(())
    }

    /// Root for a drive-letter reference, if configured.
    pub fn drive_root(&self, letter: &str) -> Option<PathBuf> {
        self.drives.get(letter).map(PathBuf::from)
    }

    /// Effective full-disk search roots: configured roots when present,
    /// otherwise the home directory plus any existing drive root.
    pub fn effective_search_roots(&self) -> Vec<PathBuf> {
        if !self.search_roots.is_empty() {
            return self.search_roots.iter().map(|r| expand_home(r)).collect();
        }
        let mut roots = Vec::new();
        if let Some(home) = dirs::home_dir() {
            roots.push(home);
        }
        for root in self.drives.values() {
            let p = PathBuf::from(root);
            if p.is_dir() && !roots.contains(&p) {
                roots.push(p);
            }
        }
        roots
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, rename = "apiKey")]
    pub api_key: String,
    #[serde(default = "default_api_base", rename = "apiBase")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens", rename = "maxTokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_api_base() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTuning {
    /// Turns of prior history replayed to the model.
    #[serde(default = "default_history_window", rename = "historyWindow")]
    pub history_window: usize,
    /// Search hits rendered into the evidence block.
    #[serde(default = "default_max_search_results", rename = "maxSearchResults")]
    pub max_search_results: usize,
    /// Learned facts injected into the system prompt.
    #[serde(default = "default_fact_limit", rename = "factLimit")]
    pub fact_limit: usize,
    /// Extracted facts at or over this length are discarded as degenerate.
    #[serde(default = "default_max_fact_len", rename = "maxFactLen")]
    pub max_fact_len: usize,
    /// Fact extraction only runs for queries longer than this.
    #[serde(default = "default_min_learn_len", rename = "minLearnLen")]
    pub min_learn_len: usize,
    /// A recorded preview is consumable for this many turns.
    #[serde(default = "default_pending_ttl", rename = "pendingTtlTurns")]
    pub pending_ttl_turns: u32,
}

fn default_history_window() -> usize {
    20
}

fn default_max_search_results() -> usize {
    10
}

fn default_fact_limit() -> usize {
    15
}

fn default_max_fact_len() -> usize {
    150
}

fn default_min_learn_len() -> usize {
    10
}

fn default_pending_ttl() -> u32 {
    3
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_search_results: default_max_search_results(),
            fact_limit: default_fact_limit(),
            max_fact_len: default_max_fact_len(),
            min_learn_len: default_min_learn_len(),
            pending_ttl_turns: default_pending_ttl(),
        }
    }
}
