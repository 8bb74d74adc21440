//! Tests for the concurrent chart-existence validator

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use flotilla_state::{ChartProber, DesiredState, RESOURCE_POOL, Release};

fn release(chart: &str, version: &str, enabled: bool) -> Release {
    Release {
        namespace: "default".to_string(),
        chart: chart.to_string(),
        version: version.to_string(),
        enabled,
        ..Default::default()
    }
}

fn state_with(apps: Vec<(&str, Release)>) -> DesiredState {
    DesiredState {
        apps: apps
            .into_iter()
            .map(|(name, release)| (name.to_string(), release))
            .collect::<BTreeMap<_, _>>(),
        ..Default::default()
    }
}

/// Prober scripted to fail for specific (chart, version) pairs, recording
/// every probe it receives
struct ScriptedProber {
    failing: HashSet<(String, String)>,
    probed: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedProber {
    fn failing_on(pairs: &[(&str, &str)]) -> Self {
        Self {
            failing: pairs
                .iter()
                .map(|(c, v)| (c.to_string(), v.to_string()))
                .collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    fn probed(&self) -> Vec<(String, String, String)> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartProber for ScriptedProber {
    async fn probe(&self, apps: &str, chart: &str, version: &str) -> Result<(), String> {
        self.probed
            .lock()
            .unwrap()
            .push((apps.to_string(), chart.to_string(), version.to_string()));
        if self.failing.contains(&(chart.to_string(), version.to_string())) {
            Err(format!("chart [ {chart} ] version [ {version} ] not found"))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_fail_slow_probes_every_pair() {
    let state = state_with(vec![
        ("app1", release("stable/one", "1.0.0", true)),
        ("app2", release("stable/two", "2.0.0", true)),
        ("app3", release("stable/three", "3.0.0", true)),
    ]);

    let prober = Arc::new(ScriptedProber::failing_on(&[
        ("stable/one", "1.0.0"),
        ("stable/three", "3.0.0"),
    ]));

    let result = state.validate_charts(prober.clone()).await;
    assert!(result.is_err());

    // pair 2 succeeded, yet all three pairs ran to completion
    assert_eq!(prober.probed().len(), 3);
}

#[tokio::test]
async fn test_shared_pairs_are_probed_once_with_concatenated_apps() {
    let state = state_with(vec![
        ("api", release("stable/nginx", "1.2.3", true)),
        ("web", release("stable/nginx", "1.2.3", true)),
    ]);

    let prober = Arc::new(ScriptedProber::failing_on(&[]));
    state.validate_charts(prober.clone()).await.unwrap();

    let probed = prober.probed();
    assert_eq!(probed.len(), 1);
    let (apps, chart, version) = &probed[0];
    assert!(apps.contains("api") && apps.contains("web"));
    assert_eq!(chart, "stable/nginx");
    assert_eq!(version, "1.2.3");
}

#[tokio::test]
async fn test_disabled_releases_are_not_probed() {
    let state = state_with(vec![
        ("live", release("stable/nginx", "1.2.3", true)),
        ("parked", release("stable/redis", "18.0.1", false)),
    ]);

    let prober = Arc::new(ScriptedProber::failing_on(&[]));
    state.validate_charts(prober.clone()).await.unwrap();

    let probed = prober.probed();
    assert_eq!(probed.len(), 1);
    assert_eq!(probed[0].1, "stable/nginx");
}

/// Prober that tracks how many probes run at the same time
struct GaugeProber {
    running: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl ChartProber for GaugeProber {
    async fn probe(&self, _apps: &str, _chart: &str, _version: &str) -> Result<(), String> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_concurrency_is_bounded_by_the_pool() {
    let apps = (0..3 * RESOURCE_POOL)
        .map(|i| {
            (
                format!("app{i}"),
                release(&format!("stable/chart{i}"), "1.0.0", true),
            )
        })
        .collect::<BTreeMap<_, _>>();
    let state = DesiredState {
        apps,
        ..Default::default()
    };

    let prober = Arc::new(GaugeProber {
        running: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    state.validate_charts(prober.clone()).await.unwrap();

    assert!(prober.peak.load(Ordering::SeqCst) <= RESOURCE_POOL);
}
