//! Certificate location validation
//!
//! Certificates are declared as a mapping from logical role ("caCrt",
//! "caKey", "clientCrt", ...) to a location: a local path, an absolute URI,
//! or a cloud object-storage reference.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, StateError};
use crate::settings::Settings;

/// Recognized remote-bucket URI schemes
pub const BUCKET_SCHEMES: [&str; 3] = ["s3://", "gs://", "az://"];

/// Validate and normalize a certificate location
///
/// A location is valid if it parses as an absolute URI, names an existing
/// local filesystem path, or starts with one of the recognized bucket
/// schemes. Bucket refs are accepted without any filesystem or network
/// check. Returns the normalized value, `None` if the location is invalid.
pub fn is_valid_cert(value: &str) -> Option<String> {
    if BUCKET_SCHEMES.iter().any(|scheme| value.starts_with(scheme)) {
        return Some(value.to_string());
    }
    if Path::new(value).exists() {
        return Some(value.to_string());
    }
    if url::Url::parse(value).is_ok() {
        return Some(value.to_string());
    }
    None
}

/// Validate the certificates stanza against the settings
///
/// Each entry is normalized in place. With a cluster URI configured, "caCrt"
/// is mandatory; with basic (non-bearer) auth, "caKey" is mandatory too.
pub fn validate(certificates: &mut BTreeMap<String, String>, settings: &Settings) -> Result<()> {
    if certificates.is_empty() {
        if !settings.cluster_uri.is_empty() {
            return Err(StateError::Certificates {
                message: "kube context setup is required but no certificates stanza provided"
                    .to_string(),
            });
        }
        return Ok(());
    }

    for (key, value) in certificates.iter_mut() {
        match is_valid_cert(value) {
            Some(normalized) => *value = normalized,
            None => {
                return Err(StateError::Certificates {
                    message: format!(
                        "[ {key} ] must be a valid S3, GCS, AZ bucket/container URL or a valid \
                         file path"
                    ),
                });
            }
        }
    }

    let ca_crt = certificates.contains_key("caCrt");
    let ca_key = certificates.contains_key("caKey");

    if !settings.cluster_uri.is_empty() && !settings.bearer_token {
        if !ca_crt || !ca_key {
            return Err(StateError::Certificates {
                message: "connection to the cluster is required but no cert/key was given. \
                          Please add [caCrt] and [caKey] under certificates. You might also \
                          need to provide [clientCrt]"
                    .to_string(),
            });
        }
    } else if !settings.cluster_uri.is_empty() && settings.bearer_token && !ca_crt {
        return Err(StateError::Certificates {
            message: "cluster connection with bearer token is enabled but [caCrt] is missing. \
                      Please provide [caCrt] in the certificates stanza"
                .to_string(),
        });
    }

    Ok(())
}
