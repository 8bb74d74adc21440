//! Integration tests for CLI commands

use std::io::Write;
use std::process::Command;

/// Helper to run flotilla command
fn flotilla(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_flotilla"))
        .args(args)
        .output()
        .expect("Failed to execute flotilla")
}

/// Write a state file with the given suffix and contents
fn state_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp state file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write state file");
    file
}

const VALID_STATE: &str = r#"
context: test
settings:
  kubeContext: minikube
namespaces:
  staging: {}
helmRepos:
  stable: https://charts.example.com
apps:
  web:
    namespace: staging
    group: frontend
    chart: stable/nginx
    version: 1.2.3
  api:
    namespace: staging
    group: backend
    chart: stable/api
    version: 0.4.0
"#;

mod validate_command {
    use super::*;

    #[test]
    fn test_validate_valid_state() {
        let file = state_file(".yaml", VALID_STATE);
        let output = flotilla(&["validate", "-f", file.path().to_str().unwrap()]);

        assert!(output.status.success(), "Expected success for valid state");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Validation passed"));
        assert!(stdout.contains("2 release(s) in scope"));
    }

    #[test]
    fn test_validate_empty_state_is_clean_noop() {
        let file = state_file(".yaml", "context: test\n");
        let output = flotilla(&["validate", "-f", file.path().to_str().unwrap()]);

        assert!(output.status.success(), "Expected a clean no-op run");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Nothing to be executed"));
    }

    #[test]
    fn test_validate_reports_duplicate_releases() {
        let state = r#"
context: test
settings:
  kubeContext: minikube
namespaces:
  staging: {}
apps:
  app1:
    name: web
    namespace: staging
    chart: stable/nginx
    version: 1.2.3
  app2:
    name: web
    namespace: staging
    chart: stable/nginx
    version: 1.2.4
"#;
        let file = state_file(".yaml", state);
        let output = flotilla(&["validate", "-f", file.path().to_str().unwrap()]);

        assert!(!output.status.success(), "Expected duplicate failure");
    }

    #[test]
    fn test_validate_target_selection() {
        let file = state_file(".yaml", VALID_STATE);
        let output = flotilla(&[
            "validate",
            "-f",
            file.path().to_str().unwrap(),
            "--group",
            "frontend",
        ]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("1 release(s) in scope, 1 skipped"));
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let file = state_file(".json", "{}");
        let output = flotilla(&["validate", "-f", file.path().to_str().unwrap()]);

        assert!(!output.status.success());
    }

    #[test]
    fn test_validate_toml_state() {
        let state = r#"
context = "test"

[settings]
kubeContext = "minikube"

[namespaces.staging]

[apps.web]
namespace = "staging"
chart = "stable/nginx"
version = "1.2.3"
"#;
        let file = state_file(".toml", state);
        let output = flotilla(&["validate", "-f", file.path().to_str().unwrap()]);

        assert!(output.status.success(), "Expected success for TOML state");
    }
}

mod show_command {
    use super::*;

    #[test]
    fn test_show_prints_sections() {
        let file = state_file(".yaml", VALID_STATE);
        let output = flotilla(&["show", "-f", file.path().to_str().unwrap()]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Namespaces:"));
        assert!(stdout.contains("Applications:"));
        assert!(stdout.contains("stable/nginx"));
    }
}
