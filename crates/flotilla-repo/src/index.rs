//! Helm repository index model
//!
//! A repository serves its catalog as `index.yaml`: a mapping from chart
//! name to the list of published versions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A parsed repository index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryIndex {
    /// Index schema version
    #[serde(default)]
    pub api_version: String,

    /// Published charts: name to version entries
    #[serde(default)]
    pub entries: HashMap<String, Vec<ChartEntry>>,
}

/// One published chart version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    /// Chart name
    pub name: String,

    /// Chart version
    pub version: String,

    /// Version of the packaged application
    #[serde(default)]
    pub app_version: String,

    /// Chart description
    #[serde(default)]
    pub description: String,

    /// Archive download URLs
    #[serde(default)]
    pub urls: Vec<String>,
}

impl RepositoryIndex {
    /// Parse an index from raw YAML bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(data)
    }

    /// All published versions of a chart
    pub fn versions(&self, chart: &str) -> &[ChartEntry] {
        self.entries.get(chart).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the index lists a chart at all
    pub fn has_chart(&self, chart: &str) -> bool {
        !self.versions(chart).is_empty()
    }

    /// Whether the index lists a specific chart version
    pub fn has_version(&self, chart: &str, version: &str) -> bool {
        self.versions(chart).iter().any(|e| e.version == version)
    }
}
