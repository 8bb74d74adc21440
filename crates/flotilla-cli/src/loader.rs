//! Desired state file loading
//!
//! The state file format is keyed by extension: YAML (`.yaml`/`.yml`) or
//! TOML (`.toml`). Anything else is a structured error, not a guess.

use std::path::Path;

use miette::{miette, IntoDiagnostic, Result, WrapErr};

use flotilla_state::DesiredState;

/// Load a desired state document from a file
pub fn from_file(path: &Path) -> Result<DesiredState> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read state file {}", path.display()))?;

    match extension {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid YAML state file {}", path.display())),
        "toml" => toml::from_str(&content)
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid TOML state file {}", path.display())),
        _ => Err(miette!(
            "state file {} does not have a toml/yaml extension",
            path.display()
        )),
    }
}
