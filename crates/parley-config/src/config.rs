use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            agent: AgentConfig::default(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            memory: MemoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Apply environment overrides on top of file/default values.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = provider.trim().to_lowercase();
        }

        for settings in self.llm.providers.values_mut() {
            if let Some(env) = &settings.model_env {
                if let Some(model) = lookup(env).filter(|m| !m.trim().is_empty()) {
                    settings.model = Some(model);
                }
            }
        }

        if let Some(host) = lookup("PARLEY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PARLEY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("Invalid port number: {}", port)))?;
        }
        if let Some(level) = lookup("PARLEY_LOG") {
            self.logging.level = level.parse()?;
        }

        Ok(())
    }

    /// Settings of the active provider
    pub fn active_provider(&self) -> ConfigResult<&ProviderSettings> {
        self.llm
            .providers
            .get(&self.llm.provider)
            .ok_or_else(|| ConfigError::UnknownProvider(self.llm.provider.clone()))
    }

    /// Resolve the active provider's credential.
    ///
    /// Called once at startup; an unset or blank key is fatal.
    pub fn active_api_key<F>(&self, lookup: F) -> ConfigResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match &self.active_provider()?.auth {
            AuthSettings::ApiKey { env } => lookup(env)
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingCredential(env.clone())),
            AuthSettings::None => Ok(String::new()),
        }
    }

    /// Resolve the search API key, if search is enabled and a key is set.
    pub fn search_api_key<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.search.enabled {
            return None;
        }
        lookup(&self.search.api_key_env).filter(|key| !key.trim().is_empty())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Persona settings used by the prompt template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Name of the agent; `"{name}:"` is the agent turn marker in prompts
    pub name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Parley".to_string(),
        }
    }
}

/// LLM settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Active provider key, one of `providers`
    pub provider: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub providers: HashMap<String, ProviderSettings>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let providers = [
            ("gemini", "GEMINI_API_KEY", "GEMINI_MODEL"),
            ("claude", "ANTHROPIC_API_KEY", "CLAUDE_MODEL"),
            ("groq", "GROQ_API_KEY", "GROQ_MODEL"),
            ("cohere", "COHERE_API_KEY", "COHERE_MODEL"),
        ]
        .into_iter()
        .map(|(name, key_env, model_env)| {
            (
                name.to_string(),
                ProviderSettings {
                    base_url: None,
                    model: None,
                    model_env: Some(model_env.to_string()),
                    auth: AuthSettings::ApiKey {
                        env: key_env.to_string(),
                    },
                },
            )
        })
        .collect();

        Self {
            provider: "gemini".to_string(),
            max_tokens: 350,
            temperature: 0.9,
            timeout_seconds: 30,
            providers,
        }
    }
}

/// Per-provider settings. Unset fields fall back to the provider's built-in profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Environment variable that overrides `model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_env: Option<String>,
    #[serde(flatten)]
    pub auth: AuthSettings,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "auth_type", rename_all = "snake_case")]
pub enum AuthSettings {
    /// API key read from an environment variable
    ApiKey { env: String },
    /// No authentication
    #[default]
    None,
}

/// Web search enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub api_key_env: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub num_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "SERPER_API_KEY".to_string(),
            endpoint: "https://google.serper.dev/search".to_string(),
            timeout_seconds: 8,
            num_results: 3,
        }
    }
}

/// Short- and long-term memory settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    pub buffer_capacity: usize,
    pub recent_window: usize,
    pub recall_top_k: usize,
    /// Recalled facts at or below this many chars are dropped as noise
    pub min_recall_chars: usize,
    /// Directory for persisted facts; in-memory only when unset
    pub store_path: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 8,
            recent_window: 6,
            recall_top_k: 5,
            min_recall_chars: 8,
            store_path: crate::default_memory_dir().map(|dir| dir.to_string_lossy().into_owned()),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub json_format: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json_format: false,
            file: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{0} not set")]
    MissingCredential(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
