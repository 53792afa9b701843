pub mod config;
pub mod manager;

pub use config::{
    AgentConfig, AuthSettings, Config, ConfigError, ConfigResult, LlmConfig, LogLevel,
    LoggingConfig, MemoryConfig, ProviderSettings, SearchConfig, ServerConfig,
};
pub use manager::ConfigManager;

use std::path::PathBuf;

/// Parley home directory (`~/.parley`)
pub fn parley_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".parley"))
}

/// Default config file path
pub fn default_config_path() -> Option<PathBuf> {
    parley_dir().map(|dir| dir.join("config.json"))
}

/// Default directory for persisted facts
pub fn default_memory_dir() -> Option<PathBuf> {
    parley_dir().map(|dir| dir.join("memory"))
}

/// Expand a leading `~/` to the home directory
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}
