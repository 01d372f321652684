//! Remote Reference Lookup
//!
//! RFC and draft metadata plus the downref registry, behind the
//! [`MetadataSource`] trait so rule modules are testable offline. The HTTP
//! implementation memoizes every lookup per key within a run (moka), caching
//! failures too: one failed lookup stays "unknown" for the whole run, with no
//! retries. A failed or timed-out lookup never aborts the enclosing rule; it
//! degrades to an absent result.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{NitsError, Result};

/// Remote status of a published RFC.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RfcInfo {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub obsoleted_by: Vec<String>,
    #[serde(default)]
    pub updated_by: Vec<String>,
}

/// Remote lifecycle state of an Internet-Draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftInfo {
    #[serde(default)]
    pub state: Option<String>,
}

/// Source of RFC/draft metadata and the downref registry. Lookups return
/// `None` (or an empty subset) when the answer is unavailable for any reason.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn rfc_info(&self, number: &str) -> Option<RfcInfo>;
    async fn draft_info(&self, name: &str) -> Option<DraftInfo>;
    /// Subset of `labels` present in the downref registry.
    async fn downrefs(&self, labels: &[String]) -> Vec<String>;
}

/// Configuration for the HTTP metadata source.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Upper bound on each lookup request.
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://datatracker.ietf.org/api/nits".to_string(),
            timeout_seconds: 10,
            user_agent: format!("rfcnits/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP-backed metadata source with per-run memoization.
pub struct HttpMetadataSource {
    client: Client,
    config: RemoteConfig,
    rfc_cache: Cache<String, Option<RfcInfo>>,
    draft_cache: Cache<String, Option<DraftInfo>>,
    registry_cache: Cache<String, Arc<HashSet<String>>>,
}

impl HttpMetadataSource {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(NitsError::from)?;

        Ok(Self {
            client,
            config,
            rfc_cache: Cache::new(1024),
            draft_cache: Cache::new(1024),
            registry_cache: Cache::new(1),
        })
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<T>().await.ok()
    }

    async fn registry(&self) -> Arc<HashSet<String>> {
        self.registry_cache
            .get_with("registry".to_string(), async {
                let url = format!("{}/downrefs.json", self.config.base_url);
                let entries: Option<Vec<String>> = self.fetch_json(&url).await;
                Arc::new(entries.unwrap_or_default().into_iter().collect())
            })
            .await
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn rfc_info(&self, number: &str) -> Option<RfcInfo> {
        let url = format!("{}/rfc/{}.json", self.config.base_url, number);
        self.rfc_cache
            .get_with(number.to_string(), async { self.fetch_json(&url).await })
            .await
    }

    async fn draft_info(&self, name: &str) -> Option<DraftInfo> {
        let url = format!("{}/draft/{}.json", self.config.base_url, name);
        self.draft_cache
            .get_with(name.to_string(), async { self.fetch_json(&url).await })
            .await
    }

    async fn downrefs(&self, labels: &[String]) -> Vec<String> {
        let registry = self.registry().await;
        labels
            .iter()
            .filter(|label| registry.contains(*label))
            .cloned()
            .collect()
    }
}

/// Always-absent source used by `--offline` runs. Every lookup degrades to
/// the "undefined status/state" path.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineMetadataSource;

#[async_trait]
impl MetadataSource for OfflineMetadataSource {
    async fn rfc_info(&self, _number: &str) -> Option<RfcInfo> {
        None
    }

    async fn draft_info(&self, _name: &str) -> Option<DraftInfo> {
        None
    }

    async fn downrefs(&self, _labels: &[String]) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory source with fixed answers, for tests and offline fixture runs.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    pub rfcs: std::collections::HashMap<String, RfcInfo>,
    pub drafts: std::collections::HashMap<String, DraftInfo>,
    pub downref_registry: HashSet<String>,
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    async fn rfc_info(&self, number: &str) -> Option<RfcInfo> {
        self.rfcs.get(number).cloned()
    }

    async fn draft_info(&self, name: &str) -> Option<DraftInfo> {
        self.drafts.get(name).cloned()
    }

    async fn downrefs(&self, labels: &[String]) -> Vec<String> {
        labels
            .iter()
            .filter(|label| self.downref_registry.contains(*label))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_source_is_always_absent() {
        let source = OfflineMetadataSource;
        assert_eq!(source.rfc_info("2119").await, None);
        assert_eq!(source.draft_info("draft-doe-test").await, None);
        assert!(source.downrefs(&["draft-doe-test".to_string()]).await.is_empty());
    }

    #[tokio::test]
    async fn test_static_source_answers() {
        let mut source = StaticMetadataSource::default();
        source.rfcs.insert(
            "793".to_string(),
            RfcInfo {
                status: Some("Internet Standard".to_string()),
                obsoleted_by: vec!["9293".to_string()],
                updated_by: Vec::new(),
            },
        );
        source.downref_registry.insert("draft-doe-test".to_string());

        let info = source.rfc_info("793").await.unwrap();
        assert_eq!(info.obsoleted_by, vec!["9293"]);
        assert_eq!(source.rfc_info("9999").await, None);

        let listed = source
            .downrefs(&["draft-doe-test".to_string(), "draft-other".to_string()])
            .await;
        assert_eq!(listed, vec!["draft-doe-test"]);
    }

    #[tokio::test]
    async fn test_http_source_builds_and_is_trait_object_safe() {
        let source = HttpMetadataSource::new(RemoteConfig::default()).unwrap();
        let _boxed: Arc<dyn MetadataSource> = Arc::new(source);
    }

    #[test]
    fn test_rfc_info_deserializes_with_defaults() {
        let info: RfcInfo = serde_json::from_str(r#"{"status":"Proposed Standard"}"#).unwrap();
        assert_eq!(info.status.as_deref(), Some("Proposed Standard"));
        assert!(info.obsoleted_by.is_empty());
    }
}
