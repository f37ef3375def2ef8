//! Error types for monitor-core operations.
//!
//! Source and notifier errors are transient and recovered inside the poll
//! loop. Config errors are fatal and only surface before the loop starts.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration Errors (fatal at startup)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Configuration read failed: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file malformed: {path}: {details}")]
    Malformed { path: PathBuf, details: String },

    #[error("Unsupported configuration format (expected .yaml, .yml or .toml): {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Home directory not found; pass an explicit config path")]
    NoDefaultPath,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Presence Source Errors (transient)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Presence request failed: {url}: {details}")]
    Request { url: String, details: String },

    #[error("Presence API returned status {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("Presence response could not be decoded: {url}: {details}")]
    Decode { url: String, details: String },
}

// ═══════════════════════════════════════════════════════════════════════════════
// Notifier Errors (transient)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Message request failed: {url}: {details}")]
    Request { url: String, details: String },

    #[error("Message API returned status {status}: {url}")]
    Status { url: String, status: u16 },
}

/// Convenience type alias for config loading results.
pub type Result<T> = std::result::Result<T, ConfigError>;
