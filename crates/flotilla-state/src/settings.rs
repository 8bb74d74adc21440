//! Orchestrator settings
//!
//! The `settings` stanza of the desired state file: cluster context,
//! credentials, storage backend, global lifecycle hooks and history limits.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};

/// Lifecycle hook configuration, keyed by hook phase
pub type HookMap = BTreeMap<String, serde_yaml::Value>;

/// Process-wide settings for one deployment run
///
/// Either no cluster URI is set (a local or ambient context is assumed), or
/// the URI, a context name and an auth method are jointly present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Kubernetes context to operate in
    #[serde(default)]
    pub kube_context: String,

    /// Basic-auth username for the cluster
    #[serde(default)]
    pub username: String,

    /// Basic-auth password for the cluster
    #[serde(default)]
    pub password: String,

    /// API server URI of the target cluster
    #[serde(default, rename = "clusterURI")]
    pub cluster_uri: String,

    /// Service account to impersonate
    #[serde(default)]
    pub service_account: String,

    /// Helm storage driver (defaults to "secret")
    #[serde(default)]
    pub storage_backend: String,

    /// Notification webhook invoked by the apply engine
    #[serde(default)]
    pub webhook: String,

    /// Use bearer-token auth instead of basic auth
    #[serde(default)]
    pub bearer_token: bool,

    /// Path to the bearer token file, relative to the state file
    #[serde(default)]
    pub bearer_token_path: String,

    /// Decrypt values files with eyaml
    #[serde(default)]
    pub eyaml_enabled: bool,

    /// eyaml private key location
    #[serde(default)]
    pub eyaml_private_key_path: String,

    /// eyaml public key location
    #[serde(default)]
    pub eyaml_public_key_path: String,

    /// Hooks inherited by releases that define none of their own
    #[serde(default)]
    pub global_hooks: HookMap,

    /// History retention limit inherited by releases that define none
    #[serde(default)]
    pub global_max_history: u32,
}

impl Settings {
    /// True when the stanza was omitted or left entirely at defaults
    pub fn is_empty(&self) -> bool {
        *self == Settings::default()
    }

    /// Validate the settings stanza
    ///
    /// A usable cluster context must be determined: either this stanza names
    /// a kubeContext, or an ambient context (an already-active local
    /// configuration) exists. A cluster URI, when given, must be absolute and
    /// come with a context name plus a complete auth method.
    pub fn validate(&self, ambient_context: bool) -> Result<()> {
        if (self.is_empty() || self.kube_context.is_empty()) && !ambient_context {
            return Err(StateError::Settings {
                message: "you have not defined a kubeContext to use. Either define it in the \
                          desired state file or pass a kubeconfig with --kubeconfig to use an \
                          existing context"
                    .to_string(),
            });
        }

        if !self.cluster_uri.is_empty() {
            if url::Url::parse(&self.cluster_uri).is_err() {
                return Err(StateError::Settings {
                    message: "clusterURI must be a valid absolute URL. Either the env var is \
                              missing/empty or the URL is invalid"
                        .to_string(),
                });
            }
            if self.kube_context.is_empty() {
                return Err(StateError::Settings {
                    message: "kubeContext needs to be provided in the settings stanza".to_string(),
                });
            }
            if !self.bearer_token && self.username.is_empty() {
                return Err(StateError::Settings {
                    message: "username needs to be provided in the settings stanza".to_string(),
                });
            }
            if !self.bearer_token && self.password.is_empty() {
                return Err(StateError::Settings {
                    message: "password needs to be provided (directly or from env var) in the \
                              settings stanza"
                        .to_string(),
                });
            }
            if self.bearer_token
                && !self.bearer_token_path.is_empty()
                && !Path::new(&self.bearer_token_path).exists()
            {
                return Err(StateError::Settings {
                    message: format!(
                        "bearer token path {} is not found. The path has to be relative to the \
                         desired state file",
                        self.bearer_token_path
                    ),
                });
            }
        } else if self.bearer_token {
            return Err(StateError::Settings {
                message: "bearer token is enabled but no cluster URI provided".to_string(),
            });
        }

        Ok(())
    }
}
