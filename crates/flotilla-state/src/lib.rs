//! Flotilla State - Desired-state model and validation core
//!
//! This crate provides the foundational types of Flotilla:
//! - `DesiredState`: The complete declarative description of one deployment run
//! - `Settings`: Process-wide cluster and orchestrator configuration
//! - `Release`: One desired chart deployment
//! - `Namespace`: A deployment target grouping
//! - `ChartProber`: Boundary trait for chart-existence checks
//!
//! The document flows through three in-place passes, strictly in order:
//! defaults resolution, validation (with an optional concurrent
//! chart-existence pass), and target resolution. Only the chart pass runs
//! concurrently, and it never mutates the document.

pub mod certs;
pub mod chart;
pub mod env;
pub mod error;
pub mod hooks;
pub mod namespace;
pub mod release;
pub mod settings;
pub mod state;

pub use chart::{ChartProber, RESOURCE_POOL};
pub use env::{EnvSink, MemoryEnv, ProcessEnv, HELM_DRIVER_VAR};
pub use error::{Result, StateError};
pub use namespace::Namespace;
pub use release::{DupTracker, Release};
pub use settings::{HookMap, Settings};
pub use state::{DesiredState, RunFlags, ValidationOutcome};
