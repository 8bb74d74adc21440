//! Validate command - run the validation and target-resolution pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use miette::{IntoDiagnostic, Result};

use flotilla_repo::HttpChartProber;
use flotilla_state::{ProcessEnv, RunFlags, ValidationOutcome};

use crate::exit_codes;
use crate::loader;

pub async fn run(
    file: &Path,
    groups: &[String],
    targets: &[String],
    ns_override: Option<String>,
    kubeconfig: Option<PathBuf>,
    check_charts: bool,
) -> Result<()> {
    println!(
        "{} Validating desired state at {}",
        style("→").blue(),
        file.display()
    );

    let mut state = loader::from_file(file)?;

    state.set_defaults(&mut ProcessEnv);

    let flags = RunFlags {
        ambient_context: ambient_context_available(kubeconfig.as_deref()),
        ns_override,
    };

    match state.validate(&flags).into_diagnostic()? {
        ValidationOutcome::NothingToDo => {
            println!(
                "{} No apps specified. Nothing to be executed.",
                style("⚠").yellow()
            );
            return Ok(());
        }
        ValidationOutcome::Valid => {
            println!("  {} desired state is consistent", style("✓").green());
        }
    }

    if let Some(ns) = &flags.ns_override {
        state.override_apps_namespace(ns);
    }

    if check_charts {
        let prober = HttpChartProber::for_state(&state).into_diagnostic()?;
        match state.validate_charts(Arc::new(prober)).await {
            Ok(()) => {
                println!(
                    "  {} all referenced charts are resolvable",
                    style("✓").green()
                );
            }
            Err(err) => {
                println!("  {} {}", style("✗").red(), err);
                std::process::exit(exit_codes::CHART_ERROR);
            }
        }
    }

    state.make_target_map(groups, targets);
    state.disable_untargeted_apps();
    state.update_context_labels();

    let active = state
        .apps
        .values()
        .filter(|r| r.is_considered_to_run())
        .count();
    let skipped = state.apps.len() - active;

    println!();
    println!(
        "{} Validation passed: {} release(s) in scope, {} skipped",
        style("✓").green().bold(),
        active,
        skipped
    );

    Ok(())
}

/// Whether a usable cluster context exists outside the document
fn ambient_context_available(kubeconfig: Option<&Path>) -> bool {
    if let Some(path) = kubeconfig {
        return path.exists();
    }
    std::env::var_os("HOME")
        .map(|home| Path::new(&home).join(".kube").join("config").exists())
        .unwrap_or(false)
}
