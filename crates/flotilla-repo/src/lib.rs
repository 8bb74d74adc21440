//! Flotilla Repository Access
//!
//! This crate provides chart-repository access for Flotilla:
//!
//! - **Index model**: Helm-style `index.yaml` parsing and version lookup
//! - **Existence probing**: the production [`ChartProber`] used by the
//!   desired-state chart validation pass
//!
//! Chart references are resolved against the repositories declared in the
//! desired state document. Local chart paths are checked on the filesystem,
//! preconfigured repositories are trusted without an index.
//!
//! [`ChartProber`]: flotilla_state::ChartProber

pub mod error;
pub mod index;
pub mod probe;

pub use error::{RepoError, Result};
pub use index::{ChartEntry, RepositoryIndex};
pub use probe::HttpChartProber;
