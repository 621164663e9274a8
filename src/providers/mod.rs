pub mod base;
pub mod deepseek;

pub use base::{ChatProvider, Message};
pub use deepseek::DeepSeekProvider;
