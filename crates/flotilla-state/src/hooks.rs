//! Lifecycle-hook schema validation
//!
//! Hooks are declared as a mapping from hook phase to the manifest that
//! should be applied at that phase, plus a couple of execution options.
//! Hooks run around install, upgrade and delete operations; execution
//! itself is the apply engine's job, only the schema is checked here.

use crate::settings::HookMap;

/// Hook phases a manifest can be attached to
pub const HOOK_PHASES: [&str; 6] = [
    "preInstall",
    "postInstall",
    "preUpgrade",
    "postUpgrade",
    "preDelete",
    "postDelete",
];

/// Hook options that are not phases
const HOOK_OPTIONS: [&str; 2] = ["deleteOnSuccess", "successTimeout"];

/// Validate a hook configuration against the hook schema
///
/// Phase entries must name a YAML/JSON manifest file or an absolute URL.
/// `deleteOnSuccess` must be a boolean, `successTimeout` a duration string
/// (e.g. "120s") or a number of seconds. The failure message is propagated
/// verbatim by the validation pipeline.
pub fn validate_hooks(hooks: &HookMap) -> Result<(), String> {
    for (key, value) in hooks {
        if HOOK_PHASES.contains(&key.as_str()) {
            let Some(manifest) = value.as_str() else {
                return Err(format!("hook [ {key} ] must be a manifest file path or URL"));
            };
            if !is_hook_manifest(manifest) {
                return Err(format!(
                    "hook [ {key} ] must point to a valid YAML/JSON file or a valid URL, got \
                     [ {manifest} ]"
                ));
            }
        } else if key == "deleteOnSuccess" {
            if !value.is_bool() {
                return Err(format!("hook option [ {key} ] must be a boolean"));
            }
        } else if key == "successTimeout" {
            let valid = value.is_u64() || value.as_str().is_some_and(is_duration);
            if !valid {
                return Err(format!(
                    "hook option [ {key} ] must be a duration like \"120s\" or a number of seconds"
                ));
            }
        } else {
            return Err(format!(
                "[ {key} ] is not a valid hook. Valid hooks are: {}, {}",
                HOOK_PHASES.join(", "),
                HOOK_OPTIONS.join(", ")
            ));
        }
    }
    Ok(())
}

fn is_hook_manifest(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    if lowered.ends_with(".yaml") || lowered.ends_with(".yml") || lowered.ends_with(".json") {
        return true;
    }
    url::Url::parse(value).is_ok()
}

fn is_duration(value: &str) -> bool {
    let digits = value
        .strip_suffix('s')
        .or_else(|| value.strip_suffix('m'))
        .unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
