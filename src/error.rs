//! Typed errors shared by the providers, the core stages and the server.
//!
//! - [`UpstreamError`]: a dependent service failed or answered with something
//!   we could not use. Fatal for ranking and publishing.
//! - [`ExtractionFailure`]: why a single URL could not be read. Never escapes
//!   the aggregator; it is rendered inline as a failure block.
//! - [`ConfigError`]: settings or credentials are missing or invalid. Raised
//!   at startup, before any request is attempted.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UpstreamError>;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} network error: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    #[error("{service} API error (status {status}): {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned a malformed response: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
}

impl UpstreamError {
    pub fn network(service: &'static str, err: reqwest::Error) -> Self {
        UpstreamError::Network {
            service,
            message: err.to_string(),
        }
    }

    pub fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        UpstreamError::Malformed {
            service,
            detail: detail.into(),
        }
    }

    /// The upstream HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw body for status failures, the rendered message otherwise.
    pub fn detail(&self) -> String {
        match self {
            UpstreamError::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: set {env} or pass --{flag}")]
    MissingCredential {
        env: &'static str,
        flag: &'static str,
    },

    #[error("missing setting {key}: set {env} or add it to the config file")]
    MissingSetting {
        key: &'static str,
        env: &'static str,
    },

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
