//! Parley observability
//!
//! Structured logging on top of `tracing`.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::LogConfig;
pub use error::{ObservabilityError, Result};
pub use logging::{create_request_span, create_turn_span, LogManager};
