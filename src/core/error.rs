// Error types shared by the config loader, the notifier and the engines.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to load either the pattern config or the email settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path:?} does not exist")]
    Missing { path: PathBuf },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path:?} must contain a JSON object")]
    NotAnObject { path: PathBuf },

    #[error("pattern for '{label}' must be a string")]
    PatternNotString { label: String },

    #[error("pattern for '{label}' does not compile: {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure to deliver an alert email. Callers log and discard these.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("email settings unavailable: {0}")]
    Settings(#[from] ConfigError),

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
