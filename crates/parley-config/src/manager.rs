use crate::config::{Config, ConfigError, ConfigResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Loads, overrides and validates the process configuration.
///
/// Configuration is read once at startup; nothing here watches for changes.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Load the config file (if present), apply process environment overrides and validate.
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok()).await
    }

    /// Same as [`ConfigManager::load`] with an explicit environment lookup.
    pub async fn load_with_env<F>(path: &Path, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            info!("Loading config from {:?}", path);
            let content = tokio::fs::read_to_string(path).await?;
            let content = Self::expand_env_vars(&content, &lookup)?;
            serde_json::from_str(&content)?
        } else {
            info!("Config file {:?} not found, using defaults", path);
            Config::default()
        };

        config.apply_env(&lookup)?;
        Self::validate(&config)?;
        debug!("Active provider: {}", config.llm.provider);

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// Load from the default location (`~/.parley/config.json`)
    pub async fn load_default() -> ConfigResult<Self> {
        let config_path = Self::default_config_path()?;
        Self::load(&config_path).await
    }

    pub fn default_config_path() -> ConfigResult<PathBuf> {
        crate::default_config_path()
            .ok_or_else(|| ConfigError::InvalidPath("Could not find home directory".to_string()))
    }

    /// Wrap an already-built config (used by tests)
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self { path, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate a config
    pub fn validate(config: &Config) -> ConfigResult<()> {
        if config.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }

        if config.memory.buffer_capacity == 0 {
            return Err(ConfigError::Validation(
                "memory.buffer_capacity must be greater than 0".to_string(),
            ));
        }

        if config.memory.recent_window > config.memory.buffer_capacity {
            return Err(ConfigError::Validation(format!(
                "memory.recent_window ({}) cannot exceed memory.buffer_capacity ({})",
                config.memory.recent_window, config.memory.buffer_capacity
            )));
        }

        if config.llm.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "llm.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if config.agent.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "agent.name cannot be empty".to_string(),
            ));
        }

        config.active_provider()?;

        Ok(())
    }

    /// Expand `${VAR}` or `${VAR:-default}`
    fn expand_env_vars<F>(content: &str, lookup: &F) -> ConfigResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut result = content.to_string();

        for cap in env_var_pattern().captures_iter(content) {
            let full_match = &cap[0];
            let var_expr = &cap[1];

            let (var_name, default_value) = match var_expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (var_expr, None),
            };

            let replacement = match (lookup(var_name), default_value) {
                (Some(val), _) => val,
                (None, Some(default)) => default.to_string(),
                (None, None) => return Err(ConfigError::EnvVarNotFound(var_name.to_string())),
            };

            result = result.replace(full_match, &replacement);
        }

        Ok(result)
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}
