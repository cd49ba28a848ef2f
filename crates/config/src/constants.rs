//! Shared defaults for the service
//!
//! Calculator defaults (wage, DNA rate, routing share and so on) live with the
//! calculator in `roi_quiz_core::defaults`. This module holds the operational
//! ones.

/// Lead capture endpoints
pub mod endpoints {
    /// Path of the lead capture route on the marketing site
    pub const LEAD_SUBMIT_PATH: &str = "/wp-json/roi-calculator/v1/submit-lead";

    /// Lead capture URL used in development
    pub const LEAD_SUBMIT_DEFAULT: &str =
        "http://127.0.0.1:8000/wp-json/roi-calculator/v1/submit-lead";
}

/// Timeouts
pub mod timeouts {
    /// Lead submission request timeout (ms)
    pub const LEAD_SUBMIT_MS: u64 = 10_000;

    /// Bounds accepted for the lead submission timeout (ms)
    pub const LEAD_SUBMIT_MIN_MS: u64 = 100;
    pub const LEAD_SUBMIT_MAX_MS: u64 = 120_000;

    /// Inbound HTTP request timeout (seconds)
    pub const HTTP_REQUEST_SECS: u64 = 30;
}

/// Retry queue
pub mod retry {
    /// File holding leads that could not be delivered
    pub const QUEUE_PATH_DEFAULT: &str = "data/pending_leads.json";
}

/// HTTP server
pub mod server {
    pub const HOST_DEFAULT: &str = "0.0.0.0";
    pub const PORT_DEFAULT: u16 = 8080;

    /// Largest accepted request body (bytes)
    pub const MAX_BODY_BYTES_DEFAULT: usize = 64 * 1024;
}

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
