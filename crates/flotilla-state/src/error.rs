//! Error types for desired-state validation
//!
//! Structural validation is fail-fast: the first violated invariant aborts
//! the pipeline with one of these errors, naming the offending stanza.

use thiserror::Error;

/// Desired-state validation errors
#[derive(Debug, Error)]
pub enum StateError {
    // ============ Stanza Errors ============
    #[error("settings validation failed -- {message}")]
    Settings { message: String },

    #[error("hooks validation failed -- {message}")]
    Hooks { message: String },

    #[error("settings validation failed -- webhook must be a valid URL: {url}")]
    InvalidWebhook { url: String },

    #[error("certificates validation failed -- {message}")]
    Certificates { message: String },

    #[error("both eyamlPrivateKeyPath and eyamlPublicKeyPath are required together")]
    EyamlKeys,

    #[error("namespaces validation failed -- at least one namespace is required")]
    NoNamespaces,

    #[error("repos validation failed -- repo [ {name} ] must have a valid URL: {reason}")]
    InvalidRepo { name: String, reason: String },

    // ============ Release Errors ============
    #[error("apps validation failed -- for app [ {label} ]: {source}")]
    Release {
        label: String,
        #[source]
        source: Box<StateError>,
    },

    #[error("{field} {message}")]
    InvalidField { field: String, message: String },

    #[error("release [ {name} ] is declared more than once in namespace [ {namespace} ]")]
    DuplicateRelease { name: String, namespace: String },

    // ============ Chart Existence ============
    #[error("chart validation failed")]
    ChartValidation,
}

/// Result type for desired-state operations
pub type Result<T> = std::result::Result<T, StateError>;
