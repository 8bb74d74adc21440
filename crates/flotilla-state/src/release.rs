//! Release definitions and the per-release validation contract

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::hooks::validate_hooks;
use crate::settings::{HookMap, Settings};
use crate::state::DesiredState;

/// Per-run duplicate tracker: namespace -> release names already seen
pub type DupTracker = HashMap<String, HashSet<String>>;

/// Release names follow the DNS-1123 label rules Helm enforces
static RELEASE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

const RELEASE_NAME_MAX_LEN: usize = 53;

/// One desired chart deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Release name, defaults to the document key it is declared under
    #[serde(default)]
    pub name: String,

    /// Namespace the release is deployed into
    #[serde(default)]
    pub namespace: String,

    /// Group label for selector-based targeting
    #[serde(default)]
    pub group: String,

    /// Chart reference: repo-qualified ("stable/nginx") or a local path
    #[serde(default)]
    pub chart: String,

    /// Chart version
    #[serde(default)]
    pub version: String,

    /// Whether the release takes part in the current run
    #[serde(default = "enabled_default")]
    pub enabled: bool,

    /// Lifecycle hooks, absent phases inherit the global hooks
    #[serde(default)]
    pub hooks: HookMap,

    /// History retention limit, zero inherits the global limit
    #[serde(default)]
    pub max_history: u32,

    /// Ownership/context labels applied by the orchestrator, not persisted
    #[serde(skip)]
    pub labels: BTreeMap<String, String>,
}

fn enabled_default() -> bool {
    true
}

impl Default for Release {
    fn default() -> Self {
        Self {
            name: String::new(),
            namespace: String::new(),
            group: String::new(),
            chart: String::new(),
            version: String::new(),
            enabled: true,
            hooks: HookMap::new(),
            max_history: 0,
            labels: BTreeMap::new(),
        }
    }
}

impl Release {
    /// Whether this release is subject to chart validation, labeling and
    /// eventual reconciliation
    pub fn is_considered_to_run(&self) -> bool {
        self.enabled
    }

    /// Exclude this release from the current run
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Replace the target namespace
    pub fn override_namespace(&mut self, new_ns: &str) {
        self.namespace = new_ns.to_string();
    }

    /// Inherit each global hook the release does not define itself
    ///
    /// A hook the release declares always wins over the global one.
    pub fn inherit_hooks(&mut self, settings: &Settings) {
        for (phase, manifest) in &settings.global_hooks {
            if !self.hooks.contains_key(phase) {
                self.hooks.insert(phase.clone(), manifest.clone());
            }
        }
    }

    /// Inherit the global history limit unless one is set on the release
    pub fn inherit_max_history(&mut self, settings: &Settings) {
        if self.max_history == 0 {
            self.max_history = settings.global_max_history;
        }
    }

    /// Reapply the orchestrator's ownership and context labels
    pub fn label(&mut self, context: &str, storage_backend: &str) {
        self.labels
            .insert("MANAGED-BY".to_string(), "flotilla".to_string());
        self.labels.insert("CONTEXT".to_string(), context.to_string());
        self.labels
            .insert("STORAGE-BACKEND".to_string(), storage_backend.to_string());
    }

    /// Validate this release against the desired state
    ///
    /// `label` is the document key the release was declared under. The
    /// tracker records (namespace, name) pairs across the whole document so
    /// duplicates declared under different keys are caught; duplicate scope
    /// is per-namespace, the same name may exist in two namespaces.
    pub fn validate(
        &self,
        label: &str,
        tracker: &mut DupTracker,
        state: &DesiredState,
        ns_override: Option<&str>,
    ) -> Result<()> {
        let name = if self.name.is_empty() { label } else { &self.name };
        if name.len() > RELEASE_NAME_MAX_LEN || !RELEASE_NAME.is_match(name) {
            return Err(StateError::InvalidField {
                field: "name".to_string(),
                message: format!(
                    "[ {name} ] must be a lowercase DNS-1123 label of at most \
                     {RELEASE_NAME_MAX_LEN} characters"
                ),
            });
        }

        if ns_override.is_none() {
            if self.namespace.is_empty() {
                return Err(StateError::InvalidField {
                    field: "namespace".to_string(),
                    message: "must be provided".to_string(),
                });
            }
            if !state.is_namespace_defined(&self.namespace) {
                return Err(StateError::InvalidField {
                    field: "namespace".to_string(),
                    message: format!(
                        "[ {} ] is not defined in the namespaces stanza",
                        self.namespace
                    ),
                });
            }
        }

        if self.chart.is_empty() || !self.chart.contains('/') {
            return Err(StateError::InvalidField {
                field: "chart".to_string(),
                message: "must be formatted repo/chartname or be a local chart path".to_string(),
            });
        }

        if self.version.is_empty() {
            return Err(StateError::InvalidField {
                field: "version".to_string(),
                message: "must be provided".to_string(),
            });
        }

        if !self.hooks.is_empty() {
            if let Err(message) = validate_hooks(&self.hooks) {
                return Err(StateError::InvalidField {
                    field: "hooks".to_string(),
                    message,
                });
            }
        }

        let seen = tracker.entry(self.namespace.clone()).or_default();
        if !seen.insert(name.to_string()) {
            return Err(StateError::DuplicateRelease {
                name: name.to_string(),
                namespace: self.namespace.clone(),
            });
        }

        Ok(())
    }

    /// Print the release definition
    pub fn print(&self) {
        println!("\t[ {} ]", self.name);
        println!("\t  namespace   : {}", self.namespace);
        if !self.group.is_empty() {
            println!("\t  group       : {}", self.group);
        }
        println!("\t  chart       : {} v{}", self.chart, self.version);
        println!("\t  enabled     : {}", self.enabled);
        if self.max_history != 0 {
            println!("\t  maxHistory  : {}", self.max_history);
        }
        for (phase, manifest) in &self.hooks {
            println!("\t  hook        : {phase} -> {:?}", manifest);
        }
    }
}
