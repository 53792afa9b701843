//! Structured logging
//!
//! Installs the global `tracing` subscriber.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;
use crate::error::{ObservabilityError, Result};

/// Owns the global subscriber state
pub struct LogManager {
    config: LogConfig,

    /// Flushes the file writer on drop; must live as long as the process logs
    _file_guard: Option<WorkerGuard>,
}

impl std::fmt::Debug for LogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LogManager {
    /// Install the global subscriber. Fails if one is already installed.
    pub fn new(config: LogConfig) -> Result<Self> {
        let filter = build_filter(&config.level, &config)?;

        let mut file_guard = None;
        let file_layer = match &config.file_path {
            Some(path) => {
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .ok_or_else(|| ObservabilityError::config(format!("Invalid log file path: {:?}", path)))?;
                let file_name = path
                    .file_name()
                    .ok_or_else(|| ObservabilityError::config(format!("Invalid log file path: {:?}", path)))?;

                std::fs::create_dir_all(dir)
                    .map_err(|e| ObservabilityError::logging(format!("Failed to create log dir: {}", e)))?;

                let appender = tracing_appender::rolling::daily(dir, file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                file_guard = Some(guard);

                Some(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(config.include_target)
                        .with_line_number(config.include_line_number),
                )
            }
            None => None,
        };

        let registry = tracing_subscriber::registry().with(filter).with(file_layer);

        let init_result = if config.json_format {
            let layer = fmt::layer()
                .json()
                .with_target(config.include_target)
                .with_line_number(config.include_line_number)
                .with_file(true);

            registry.with(layer).try_init()
        } else {
            let layer = fmt::layer()
                .with_target(config.include_target)
                .with_line_number(config.include_line_number)
                .with_ansi(config.ansi_colors);

            registry.with(layer).try_init()
        };

        init_result.map_err(|e| ObservabilityError::logging(format!("Failed to install subscriber: {}", e)))?;

        tracing::info!(
            target: "parley_observability",
            "Logging initialized with level: {}",
            config.level
        );

        Ok(Self {
            config,
            _file_guard: file_guard,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &LogConfig {
        &self.config
    }
}

/// Build an `EnvFilter` from a base level plus module directives
fn build_filter(level: &str, config: &LogConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(level)
        .map_err(|e| ObservabilityError::logging(format!("Invalid log level: {}", e)))?;

    for (module, module_level) in &config.module_levels {
        filter = filter.add_directive(
            format!("{}={}", module, module_level)
                .parse()
                .map_err(|e| ObservabilityError::logging(format!("Invalid directive: {}", e)))?,
        );
    }

    Ok(filter)
}

/// Span covering one inbound HTTP request
pub fn create_request_span(request_id: &str) -> tracing::Span {
    tracing::info_span!(
        "request",
        request_id = %request_id,
    )
}

/// Span covering one conversational turn
pub fn create_turn_span(user_id: &str, turn_id: u64) -> tracing::Span {
    tracing::info_span!(
        "turn",
        user_id = %user_id,
        turn_id = turn_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_with_modules() {
        let config = LogConfig::default()
            .with_module_level("parley_llm", "debug")
            .with_module_level("actix_web", "warn");

        assert!(build_filter("info", &config).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let config = LogConfig::default().with_module_level("parley_llm", "loud");
        assert!(build_filter("info", &config).is_err());
    }

    #[test]
    fn test_log_manager_init_once() {
        let config = LogConfig::default()
            .with_log_level("debug")
            .with_json_format(false);

        let manager = LogManager::new(config.clone());
        assert!(manager.is_ok());
        assert_eq!(manager.unwrap().config().level, "debug");

        // a second global subscriber is refused
        assert!(LogManager::new(config).is_err());
    }

    #[test]
    fn test_create_spans() {
        let request_span = create_request_span("req-123");
        let turn_span = create_turn_span("alex", 3);

        // spans are disabled unless a subscriber is installed; metadata is still present
        if let Some(meta) = request_span.metadata() {
            assert_eq!(meta.name(), "request");
        }
        if let Some(meta) = turn_span.metadata() {
            assert_eq!(meta.name(), "turn");
        }
    }
}
