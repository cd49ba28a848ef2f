//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, retry, server, timeouts, LOG_LEVELS};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Where captured leads are delivered
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// Where undelivered leads wait for a retry
    #[serde(default)]
    pub retry_queue: RetryQueueConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins. Empty allows any origin outside production.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    server::HOST_DEFAULT.to_string()
}
fn default_port() -> u16 {
    server::PORT_DEFAULT
}
fn default_timeout() -> u64 {
    timeouts::HTTP_REQUEST_SECS
}
fn default_max_body_bytes() -> usize {
    server::MAX_BODY_BYTES_DEFAULT
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            max_body_bytes: default_max_body_bytes(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Lead delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Lead capture URL. `None` queues every lead without sending it.
    #[serde(default = "default_submission_endpoint")]
    pub endpoint: Option<String>,

    /// Bearer token sent with each submission
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_submission_timeout")]
    pub timeout_ms: u64,
}

fn default_submission_endpoint() -> Option<String> {
    Some(endpoints::LEAD_SUBMIT_DEFAULT.to_string())
}
fn default_submission_timeout() -> u64 {
    timeouts::LEAD_SUBMIT_MS
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_submission_endpoint(),
            auth_token: None,
            timeout_ms: default_submission_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetryQueueBackend {
    /// JSON file on local disk
    #[default]
    File,
    /// Process memory only; pending leads are lost on restart
    Memory,
}

/// Retry queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryQueueConfig {
    #[serde(default)]
    pub backend: RetryQueueBackend,

    /// Queue file, used by the file backend
    #[serde(default = "default_queue_path")]
    pub path: String,

    /// Replay pending leads once when the server starts
    #[serde(default = "default_true")]
    pub replay_on_startup: bool,
}

fn default_queue_path() -> String {
    retry::QUEUE_PATH_DEFAULT.to_string()
}

impl Default for RetryQueueConfig {
    fn default() -> Self {
        Self {
            backend: RetryQueueBackend::File,
            path: default_queue_path(),
            replay_on_startup: true,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_submission()?;
        self.validate_retry_queue()?;
        self.validate_observability()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if server.max_body_bytes < 1024 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_body_bytes".to_string(),
                message: format!("Must be at least 1024, got {}", server.max_body_bytes),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 Any origin will be allowed."
            );
        }

        Ok(())
    }

    fn validate_submission(&self) -> Result<(), ConfigError> {
        let submission = &self.submission;

        match submission.endpoint.as_deref().map(str::trim) {
            None | Some("") => {
                if self.environment.is_strict() {
                    return Err(ConfigError::MissingField(format!(
                        "submission.endpoint is required in {} mode",
                        self.environment.as_str()
                    )));
                }
                tracing::warn!("submission.endpoint not configured, leads will only be queued");
            }
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                return Err(ConfigError::InvalidValue {
                    field: "submission.endpoint".to_string(),
                    message: format!("Must be an http(s) URL, got {}", url),
                });
            }
            Some(url) => {
                if self.environment.is_production() && url.starts_with("http://") {
                    tracing::warn!(endpoint = %url, "Lead submission endpoint is not using TLS");
                }
            }
        }

        if !(timeouts::LEAD_SUBMIT_MIN_MS..=timeouts::LEAD_SUBMIT_MAX_MS)
            .contains(&submission.timeout_ms)
        {
            return Err(ConfigError::InvalidValue {
                field: "submission.timeout_ms".to_string(),
                message: format!(
                    "Must be between {} and {}, got {}",
                    timeouts::LEAD_SUBMIT_MIN_MS,
                    timeouts::LEAD_SUBMIT_MAX_MS,
                    submission.timeout_ms
                ),
            });
        }

        Ok(())
    }

    fn validate_retry_queue(&self) -> Result<(), ConfigError> {
        let queue = &self.retry_queue;

        match queue.backend {
            RetryQueueBackend::File if queue.path.trim().is_empty() => {
                Err(ConfigError::InvalidValue {
                    field: "retry_queue.path".to_string(),
                    message: "Path is required for the file backend".to_string(),
                })
            }
            RetryQueueBackend::Memory if self.environment.is_strict() => {
                Err(ConfigError::InvalidValue {
                    field: "retry_queue.backend".to_string(),
                    message: format!(
                        "Memory backend loses pending leads on restart and is not allowed in {} mode",
                        self.environment.as_str()
                    ),
                })
            }
            _ => Ok(()),
        }
    }

    fn validate_observability(&self) -> Result<(), ConfigError> {
        let level = self.observability.log_level.trim().to_lowercase();
        // Full filter directives ("info,roi_quiz_server=debug") are passed through
        if !level.contains('=') && !level.contains(',') && !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "observability.log_level".to_string(),
                message: format!("Unknown log level {}", self.observability.log_level),
            });
        }
        Ok(())
    }
}

/// Load settings from `config/` in the working directory, then the
/// environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from `{dir}/default`, `{dir}/{env}` and `ROI_QUIZ__*`
/// environment variables, in increasing precedence
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(
        File::with_name(&dir.join("default").to_string_lossy()).required(false),
    );

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&dir.join(env_name).to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("ROI_QUIZ")
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("server.cors_origins")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.environment, RuntimeEnvironment::Development);
        assert_eq!(settings.retry_queue.backend, RetryQueueBackend::File);
        assert!(settings.retry_queue.replay_on_startup);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 9000;
        settings.server.timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_submission_endpoint_validation() {
        let mut settings = Settings::default();
        settings.submission.endpoint = Some("ftp://example.com/leads".to_string());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "submission.endpoint"
        ));

        settings.submission.endpoint = None;
        assert!(settings.validate().is_ok());

        settings.environment = RuntimeEnvironment::Production;
        assert!(matches!(settings.validate(), Err(ConfigError::MissingField(_))));

        settings.submission.endpoint = Some("https://example.com/leads".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_submission_timeout_bounds() {
        let mut settings = Settings::default();
        settings.submission.timeout_ms = 50;
        assert!(settings.validate().is_err());
        settings.submission.timeout_ms = 500_000;
        assert!(settings.validate().is_err());
        settings.submission.timeout_ms = 5_000;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_memory_queue_rejected_when_strict() {
        let mut settings = Settings::default();
        settings.retry_queue.backend = RetryQueueBackend::Memory;
        assert!(settings.validate().is_ok());

        settings.environment = RuntimeEnvironment::Staging;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut settings = Settings::default();
        settings.observability.log_level = "verbose".to_string();
        assert!(settings.validate().is_err());

        settings.observability.log_level = "info,roi_quiz_server=debug".to_string();
        assert!(settings.validate().is_ok());

        settings.observability.log_level = "WARN".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_environment_strictness() {
        assert!(!RuntimeEnvironment::Development.is_strict());
        assert!(RuntimeEnvironment::Staging.is_strict());
        assert!(RuntimeEnvironment::Production.is_production());
    }
}
