//! The desired state document and its pipeline passes
//!
//! A document is constructed once by deserialization, then mutated in place
//! by three strictly sequential passes: defaults resolution, validation and
//! target resolution. It is never mutated concurrently; the only parallel
//! region is the read-only chart-existence pass.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::certs;
use crate::chart::{self, ChartProber};
use crate::env::{EnvSink, HELM_DRIVER_VAR};
use crate::error::{Result, StateError};
use crate::hooks::validate_hooks;
use crate::namespace::Namespace;
use crate::release::{DupTracker, Release};
use crate::settings::Settings;

/// Context name assumed when the document does not set one
pub const DEFAULT_CONTEXT_NAME: &str = "default";

/// Storage backend assumed when the document does not set one
pub const DEFAULT_STORAGE_BACKEND: &str = "secret";

/// Externally supplied run-mode flags
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    /// A usable cluster context exists outside the document (an
    /// already-active local configuration)
    pub ambient_context: bool,

    /// Force all releases onto one namespace and skip the namespace checks
    pub ns_override: Option<String>,
}

/// Outcome of a successful validation pass
///
/// An empty document is not an error: the run has nothing to do and the
/// caller decides the exit behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// No releases are declared, the run terminates cleanly
    NothingToDo,
    /// The document is admissible
    Valid,
}

/// The complete declarative description of one deployment run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    /// Free-form document metadata (maintainer, description, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Certificate locations by logical role
    #[serde(default)]
    pub certificates: BTreeMap<String, String>,

    /// Orchestrator settings
    #[serde(default)]
    pub settings: Settings,

    /// Context name scoping the releases tracked by this document
    #[serde(default)]
    pub context: String,

    /// Deployment target namespaces by name
    #[serde(default)]
    pub namespaces: BTreeMap<String, Namespace>,

    /// Chart repositories: name to index URL
    #[serde(default)]
    pub helm_repos: BTreeMap<String, String>,

    /// Repositories configured outside the document (no URL known)
    #[serde(default)]
    pub preconfigured_helm_repos: Vec<String>,

    /// Desired releases by document key
    #[serde(default)]
    pub apps: BTreeMap<String, Release>,

    /// Selection set for the current run, derived, never persisted
    #[serde(skip)]
    pub target_map: HashSet<String>,
}

impl DesiredState {
    /// Fill unset fields and propagate global settings down to releases
    ///
    /// Idempotent: re-running on an already-resolved document is a no-op.
    /// A user-set storage backend is published to `env` so downstream Helm
    /// tooling observes the same driver.
    pub fn set_defaults(&mut self, env: &mut dyn EnvSink) {
        if self.settings.storage_backend.is_empty() {
            self.settings.storage_backend = DEFAULT_STORAGE_BACKEND.to_string();
        } else {
            env.set(HELM_DRIVER_VAR, &self.settings.storage_backend);
        }

        if self.context.is_empty() {
            self.context = DEFAULT_CONTEXT_NAME.to_string();
        }

        let Self { settings, apps, .. } = self;
        for (name, release) in apps.iter_mut() {
            if release.name.is_empty() {
                release.name = name.clone();
            }
            release.inherit_hooks(settings);
            release.inherit_max_history(settings);
        }
    }

    /// Validate that the document is internally and externally consistent
    ///
    /// Stages run in a fixed order and fail fast: settings, global hooks,
    /// webhook, certificates, eyaml keys, namespaces, repositories,
    /// releases. Certificate locations are normalized in place.
    pub fn validate(&mut self, flags: &RunFlags) -> Result<ValidationOutcome> {
        // apps
        if self.apps.is_empty() {
            tracing::info!("no apps specified, nothing to be executed");
            return Ok(ValidationOutcome::NothingToDo);
        }

        // settings
        self.settings.validate(flags.ambient_context)?;

        // global lifecycle hooks
        if !self.settings.global_hooks.is_empty() {
            validate_hooks(&self.settings.global_hooks)
                .map_err(|message| StateError::Hooks { message })?;
        }

        // webhook
        if !self.settings.webhook.is_empty() && url::Url::parse(&self.settings.webhook).is_err() {
            return Err(StateError::InvalidWebhook {
                url: self.settings.webhook.clone(),
            });
        }

        // certificates
        certs::validate(&mut self.certificates, &self.settings)?;

        // eyaml keys come in pairs
        if self.settings.eyaml_private_key_path.is_empty()
            != self.settings.eyaml_public_key_path.is_empty()
        {
            return Err(StateError::EyamlKeys);
        }

        // namespaces
        match &flags.ns_override {
            None if self.namespaces.is_empty() => return Err(StateError::NoNamespaces),
            None => {}
            Some(ns) => tracing::info!(
                "ns-override is used to override all namespaces with [ {ns} ], skipping defined \
                 namespaces validation"
            ),
        }

        // repos
        for (name, uri) in &self.helm_repos {
            if let Err(err) = url::Url::parse(uri) {
                return Err(StateError::InvalidRepo {
                    name: name.clone(),
                    reason: err.to_string(),
                });
            }
        }

        // releases, threading the shared duplicate tracker so duplicate
        // (namespace, name) pairs across document keys are caught
        let mut tracker = DupTracker::new();
        for (label, release) in &self.apps {
            release
                .validate(label, &mut tracker, self, flags.ns_override.as_deref())
                .map_err(|source| StateError::Release {
                    label: label.clone(),
                    source: Box::new(source),
                })?;
        }

        Ok(ValidationOutcome::Valid)
    }

    /// Probe chart existence for every release considered to run
    ///
    /// Fail-slow: all distinct (chart, version) pairs are probed to
    /// completion and every failure is logged before the aggregate verdict.
    pub async fn validate_charts(&self, prober: Arc<dyn ChartProber>) -> Result<()> {
        chart::validate_charts(self, prober).await
    }

    /// Whether a namespace is declared in the namespaces stanza
    pub fn is_namespace_defined(&self, ns: &str) -> bool {
        self.namespaces.contains_key(ns)
    }

    /// Replace every release's namespace with one specific namespace
    pub fn override_apps_namespace(&mut self, new_ns: &str) {
        tracing::info!("overriding apps namespaces with [ {new_ns} ]");
        for release in self.apps.values_mut() {
            release.override_namespace(new_ns);
        }
    }

    /// Build the selection set from group and name selectors
    ///
    /// Union semantics: a release is selected when its group matches any
    /// requested group or its document key is requested directly. Both
    /// selector lists empty means everything is selected (empty map).
    pub fn make_target_map(&mut self, groups: &[String], targets: &[String]) {
        let groups: HashSet<&str> = groups.iter().map(String::as_str).collect();
        for (app_name, release) in &self.apps {
            if !release.group.is_empty() && groups.contains(release.group.as_str()) {
                self.target_map.insert(app_name.clone());
            }
        }
        for target in targets {
            self.target_map.insert(target.clone());
        }
    }

    /// Disable every release outside the target map, then every namespace
    /// left without an active release
    ///
    /// An empty target map disables nothing: absence of any selector means
    /// everything stays in scope. Namespace disablement is computed after
    /// all release decisions since it depends on the surviving releases.
    pub fn disable_untargeted_apps(&mut self) {
        if self.target_map.is_empty() {
            return;
        }

        let mut live_namespaces: HashSet<String> = HashSet::new();
        for (app_name, release) in self.apps.iter_mut() {
            if self.target_map.contains(app_name) {
                if release.is_considered_to_run() {
                    live_namespaces.insert(release.namespace.clone());
                }
            } else {
                release.disable();
            }
        }

        for (ns_name, namespace) in self.namespaces.iter_mut() {
            if !live_namespaces.contains(ns_name) {
                namespace.disable();
            }
        }
    }

    /// Reapply ownership and context labels on every release considered to
    /// run; excluded releases are skipped with a diagnostic
    pub fn update_context_labels(&mut self) {
        let Self {
            settings,
            context,
            apps,
            ..
        } = self;
        for release in apps.values_mut() {
            if release.is_considered_to_run() {
                tracing::info!(
                    "updating context and reapplying labels for release [ {} ]",
                    release.name
                );
                release.label(context, &settings.storage_backend);
            } else {
                tracing::warn!(
                    "release [ {} ] is not in the target group, context and labels are left \
                     unchanged",
                    release.name
                );
            }
        }
    }

    /// Print the desired state
    pub fn print(&self) {
        println!("\nMetadata:");
        println!("---------");
        for (key, value) in &self.metadata {
            println!("\t{key}: {value}");
        }
        println!("\nContext:");
        println!("---------");
        println!("\t{}", self.context);
        println!("\nCertificates:");
        println!("-------------");
        for (key, value) in &self.certificates {
            println!("\t{key}: {value}");
        }
        println!("\nSettings:");
        println!("---------");
        println!("\t{:?}", self.settings);
        println!("\nNamespaces:");
        println!("-----------");
        for (name, ns) in &self.namespaces {
            println!("\t{name}: enabled={}", ns.enabled);
        }
        println!("\nRepositories:");
        println!("-------------");
        for (name, uri) in &self.helm_repos {
            println!("\t{name}: {uri}");
        }
        for name in &self.preconfigured_helm_repos {
            println!("\t{name}: (preconfigured)");
        }
        println!("\nApplications:");
        println!("-------------");
        for release in self.apps.values() {
            release.print();
        }
        println!("\nTargets:");
        println!("--------");
        for target in &self.target_map {
            println!("\t{target}");
        }
    }
}
