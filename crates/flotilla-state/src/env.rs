//! Environment propagation capability
//!
//! The defaults resolver publishes the storage backend to the surrounding
//! process so downstream Helm tooling observes the same driver. The sink is
//! an explicit capability so tests can capture writes in memory instead of
//! mutating real process state.

use std::collections::HashMap;

/// Environment variable observed by downstream Helm tooling
pub const HELM_DRIVER_VAR: &str = "HELM_DRIVER";

/// A destination for environment variables published during defaults resolution
pub trait EnvSink {
    /// Publish a variable
    fn set(&mut self, key: &str, value: &str);
}

/// Sink backed by the real process environment
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn set(&mut self, key: &str, value: &str) {
        // SAFETY: the defaults pass runs single-threaded before any worker
        // tasks are spawned
        unsafe { std::env::set_var(key, value) };
    }
}

/// In-memory sink for tests
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: HashMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read back a captured variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSink for MemoryEnv {
    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}
