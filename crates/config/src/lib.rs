//! Configuration management for the ROI quiz service
//!
//! Supports loading configuration from:
//! - `config/default.{toml,yaml,json}`
//! - `config/{environment}.{toml,yaml,json}`
//! - Environment variables (`ROI_QUIZ__` prefix, `__` between sections,
//!   e.g. `ROI_QUIZ__SERVER__PORT=9000`)
//!
//! The price list and calculator assumptions are compiled into
//! `roi-quiz-core`; nothing here can change a quote.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, RetryQueueBackend, RetryQueueConfig,
    RuntimeEnvironment, ServerConfig, Settings, SubmissionConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
