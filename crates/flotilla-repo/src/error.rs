//! Error types for chart repository access

use thiserror::Error;

/// Chart repository errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Resolution Errors ============
    #[error("repository [ {name} ] is not declared in the desired state")]
    UnknownRepository { name: String },

    #[error("chart [ {chart} ] was not found in repository [ {repo} ]")]
    ChartNotFound { chart: String, repo: String },

    #[error("version [ {version} ] of chart [ {chart} ] was not found in repository [ {repo} ]")]
    VersionNotFound {
        chart: String,
        version: String,
        repo: String,
    },

    #[error("local chart path [ {path} ] does not contain a Chart.yaml")]
    LocalChartNotFound { path: String },

    // ============ Index Errors ============
    #[error("index not found at {url}: HTTP {status}")]
    IndexNotFound { url: String, status: u16 },

    #[error("invalid index at {url}: {message}")]
    InvalidIndex { url: String, message: String },

    // ============ Transport Errors ============
    #[error("network error: {message}")]
    Network { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<reqwest::Error> for RepoError {
    fn from(e: reqwest::Error) -> Self {
        RepoError::Network {
            message: e.to_string(),
        }
    }
}
