//! Deployment target namespaces

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A namespace releases can be deployed into
///
/// Namespaces are owned by the desired state document and looked up by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    /// Protect the namespace from deletes issued by the apply engine
    #[serde(default)]
    pub protected: bool,

    /// Resource labels applied to the namespace
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Whether the namespace takes part in the current run
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

impl Default for Namespace {
    fn default() -> Self {
        Self {
            protected: false,
            labels: BTreeMap::new(),
            enabled: true,
        }
    }
}

impl Namespace {
    /// Exclude this namespace from the current run
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_by_default() {
        let ns: Namespace = serde_yaml::from_str("protected: true").unwrap();
        assert!(ns.enabled);
        assert!(ns.protected);
    }

    #[test]
    fn test_disable() {
        let mut ns = Namespace::default();
        assert!(ns.enabled);
        ns.disable();
        assert!(!ns.enabled);
    }
}
