use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GridError {
    #[error("invalid dataset: {0}")]
    #[diagnostic(help("known datasets are `laus` and `unemp`"))]
    InvalidDataset(String),

    #[error("invalid filter (expected facet=value): {0}")]
    InvalidFilter(String),

    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    #[error("at least one filter must be active before downloading")]
    NoActiveFilters,

    #[error("request failed: {0}")]
    NetworkFailure(String),

    #[error("server returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("terminal error: {0}")]
    Terminal(String),
}

impl GridError {
    /// Network-class failures: the request never produced a usable payload.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            GridError::NetworkFailure(_) | GridError::HttpStatus { .. }
        )
    }
}
