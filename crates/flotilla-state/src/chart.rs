//! Concurrent chart-existence validation
//!
//! Structural validation answers "is the desired state internally
//! consistent"; this pass answers "does the chart catalog actually contain
//! what we reference". It is fail-slow: every distinct (chart, version)
//! pair is probed to completion and every failure is logged before the
//! single aggregate verdict is returned.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{Result, StateError};
use crate::state::DesiredState;

/// Upper bound on concurrently running chart probes
pub const RESOURCE_POOL: usize = 10;

/// Boundary contract for chart-existence checks
///
/// Implementations own their network handling and timeouts; no retries are
/// performed here and a probe failure is terminal for its (chart, version)
/// pair.
#[async_trait]
pub trait ChartProber: Send + Sync {
    /// Check that `chart` at `version` is resolvable from the configured
    /// repositories
    ///
    /// `apps` carries the comma-concatenated names of all releases sharing
    /// the pair, for diagnostic messages. Returns a diagnostic string on
    /// failure.
    async fn probe(
        &self,
        apps: &str,
        chart: &str,
        version: &str,
    ) -> std::result::Result<(), String>;
}

/// Probe every distinct (chart, version) pair referenced by releases that
/// are considered to run
pub(crate) async fn validate_charts(
    state: &DesiredState,
    prober: Arc<dyn ChartProber>,
) -> Result<()> {
    let mut charts: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for (app, release) in &state.apps {
        if !release.is_considered_to_run() {
            continue;
        }
        charts
            .entry((release.chart.clone(), release.version.clone()))
            .or_default()
            .push(app.clone());
    }

    let semaphore = Arc::new(Semaphore::new(RESOURCE_POOL));
    let mut probes = JoinSet::new();
    for ((chart, version), apps) in charts {
        let prober = Arc::clone(&prober);
        let semaphore = Arc::clone(&semaphore);
        let apps = apps.join(", ");
        probes.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return Some(format!(
                        "chart [ {chart} ] version [ {version} ] was not probed: worker pool \
                         closed"
                    ));
                }
            };
            prober.probe(&apps, &chart, &version).await.err()
        });
    }

    // Each task owns its result slot; nothing is read until the join
    // barrier has seen every task finish.
    let mut failed = false;
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok(Some(diagnostic)) => {
                failed = true;
                tracing::error!("{diagnostic}");
            }
            Ok(None) => {}
            Err(err) => {
                failed = true;
                tracing::error!("chart probe panicked: {err}");
            }
        }
    }

    if failed {
        return Err(StateError::ChartValidation);
    }
    Ok(())
}
