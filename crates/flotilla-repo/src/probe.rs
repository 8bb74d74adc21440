//! Chart-existence probing
//!
//! The production [`ChartProber`]: resolves repo-qualified chart references
//! against the repositories declared in the desired state, fetches each
//! repository's `index.yaml` at most once per run, and checks local chart
//! paths on the filesystem.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use flotilla_state::{ChartProber, DesiredState};

use crate::error::{RepoError, Result};
use crate::index::RepositoryIndex;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Chart-existence prober backed by HTTP repository indexes
pub struct HttpChartProber {
    /// Declared repositories: name to base URL
    repos: BTreeMap<String, String>,

    /// Repositories configured outside the document, trusted without an index
    preconfigured: HashSet<String>,

    /// HTTP client, owns the network timeout
    client: reqwest::Client,

    /// One fetched index per repository per run
    indexes: Mutex<HashMap<String, RepositoryIndex>>,
}

impl HttpChartProber {
    /// Create a prober over an explicit repository map
    pub fn new(repos: BTreeMap<String, String>, preconfigured: HashSet<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            repos,
            preconfigured,
            client,
            indexes: Mutex::new(HashMap::new()),
        })
    }

    /// Create a prober over the repositories a desired state declares
    pub fn for_state(state: &DesiredState) -> Result<Self> {
        Self::new(
            state.helm_repos.clone(),
            state.preconfigured_helm_repos.iter().cloned().collect(),
        )
    }

    /// Check that a chart reference resolves to an existing chart version
    pub async fn check(&self, chart: &str, version: &str) -> Result<()> {
        if is_local_chart(chart) {
            if Path::new(chart).join("Chart.yaml").is_file() {
                return Ok(());
            }
            return Err(RepoError::LocalChartNotFound {
                path: chart.to_string(),
            });
        }

        let Some((repo_name, chart_name)) = chart.split_once('/') else {
            return Err(RepoError::UnknownRepository {
                name: chart.to_string(),
            });
        };

        if self.preconfigured.contains(repo_name) {
            tracing::debug!(
                "repository [ {repo_name} ] is preconfigured, trusting chart [ {chart_name} ] \
                 without an index"
            );
            return Ok(());
        }

        self.check_remote(repo_name, chart_name, version).await
    }

    async fn check_remote(&self, repo_name: &str, chart_name: &str, version: &str) -> Result<()> {
        let base_url = self
            .repos
            .get(repo_name)
            .ok_or_else(|| RepoError::UnknownRepository {
                name: repo_name.to_string(),
            })?;

        {
            let indexes = self.indexes.lock().await;
            if let Some(index) = indexes.get(repo_name) {
                return lookup(index, repo_name, chart_name, version);
            }
        }

        // Fetch outside the lock; a concurrent duplicate fetch of the same
        // index is harmless.
        let index = self.fetch_index(base_url).await?;
        let mut indexes = self.indexes.lock().await;
        let index = indexes.entry(repo_name.to_string()).or_insert(index);
        lookup(index, repo_name, chart_name, version)
    }

    async fn fetch_index(&self, base_url: &str) -> Result<RepositoryIndex> {
        let index_url = format!("{}/index.yaml", base_url.trim_end_matches('/'));
        let response = self.client.get(&index_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::IndexNotFound {
                url: index_url,
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await?;
        RepositoryIndex::from_bytes(&data).map_err(|e| RepoError::InvalidIndex {
            url: index_url,
            message: e.to_string(),
        })
    }
}

fn lookup(index: &RepositoryIndex, repo: &str, chart: &str, version: &str) -> Result<()> {
    if !index.has_chart(chart) {
        return Err(RepoError::ChartNotFound {
            chart: chart.to_string(),
            repo: repo.to_string(),
        });
    }
    if !index.has_version(chart, version) {
        return Err(RepoError::VersionNotFound {
            chart: chart.to_string(),
            version: version.to_string(),
            repo: repo.to_string(),
        });
    }
    Ok(())
}

fn is_local_chart(chart: &str) -> bool {
    chart.starts_with("./") || chart.starts_with("../") || chart.starts_with('/')
}

#[async_trait]
impl ChartProber for HttpChartProber {
    async fn probe(
        &self,
        apps: &str,
        chart: &str,
        version: &str,
    ) -> std::result::Result<(), String> {
        match self.check(chart, version).await {
            Ok(()) => Ok(()),
            Err(err) => Err(format!(
                "chart [ {chart} ] version [ {version} ] is specified for apps [ {apps} ] but \
                 is not resolvable: {err}"
            )),
        }
    }
}
