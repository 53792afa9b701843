//! Logging configuration
//!
//! Built from the `logging` section of the Parley config, then adjusted by the CLI.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Base filter directive (trace, debug, info, warn, error or a full `EnvFilter` string)
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,

    /// Daily-rolling log file, in addition to stdout
    pub file_path: Option<PathBuf>,

    /// Per-module levels, e.g. `parley_llm = "debug"`
    pub module_levels: HashMap<String, String>,

    /// ANSI colors on stdout
    pub ansi_colors: bool,

    /// Include the event target
    pub include_target: bool,

    /// Include line numbers
    pub include_line_number: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_path: None,
            module_levels: HashMap::new(),
            ansi_colors: true,
            include_target: true,
            include_line_number: true,
        }
    }
}

impl LogConfig {
    /// Set the base level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Toggle JSON output
    pub fn with_json_format(mut self, json: bool) -> Self {
        self.json_format = json;
        self
    }

    /// Also write to a daily-rolling file
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Add a module-specific level
    pub fn with_module_level(mut self, module: impl Into<String>, level: impl Into<String>) -> Self {
        self.module_levels.insert(module.into(), level.into());
        self
    }
}

impl From<&parley_config::LoggingConfig> for LogConfig {
    fn from(config: &parley_config::LoggingConfig) -> Self {
        let mut log_config = LogConfig::default()
            .with_log_level(config.level.as_str())
            .with_json_format(config.json_format);

        if let Some(path) = config.file.as_deref().and_then(parley_config::expand_tilde) {
            log_config = log_config.with_log_file(path);
        }

        log_config
    }
}
