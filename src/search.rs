//! Search backends and the priority-ordered provider chain.
//!
//! Every failure mode of a backend (network error, non-success status,
//! malformed payload) degrades to an empty result list. The orchestrator
//! never retries the same query against the same backend; escalation
//! happens by moving to the next query tier instead.

use crate::cache::TtlCache;
use crate::config::CONFIG;
use crate::locale::LocaleProfile;
use crate::models::RawSearchResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// A single external search backend.
#[async_trait]
pub(crate) trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs one search. Returns an empty list on any failure.
    async fn query(&self, text: &str, region: &str, limit: usize) -> Vec<RawSearchResult>;
}

/// Paid structured search API, first in the priority order.
pub(crate) struct SerperBackend {
    client: Arc<Client>,
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize, Debug, Default)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperItem>,
}

#[derive(Deserialize, Debug)]
struct SerperItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperBackend {
    pub(crate) fn new(client: Arc<Client>, api_key: String) -> Self {
        Self {
            client,
            api_key,
            endpoint: SERPER_ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn at_endpoint(client: Arc<Client>, api_key: String, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }
}

#[async_trait]
impl SearchBackend for SerperBackend {
    fn name(&self) -> &'static str {
        "serper"
    }

    async fn query(&self, text: &str, region: &str, limit: usize) -> Vec<RawSearchResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&serde_json::json!({
                "q": text,
                "gl": region,
                "hl": CONFIG.search_language,
                "num": limit,
            }))
            .timeout(CONFIG.request_timeout)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(target: "search", "Serper returned status {}", r.status());
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(target: "search", "Serper request failed: {}", e);
                return Vec::new();
            }
        };

        let payload: SerperResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(target: "search", "Serper payload malformed: {}", e);
                return Vec::new();
            }
        };

        payload
            .organic
            .into_iter()
            .take(limit)
            .map(|item| RawSearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
                source: "serper".to_string(),
            })
            .collect()
    }
}

/// Free fallback backend, second in the priority order.
pub(crate) struct DuckDuckGoBackend {
    client: Arc<Client>,
    endpoint: String,
}

#[derive(Deserialize, Debug, Default)]
struct DuckDuckGoResponse {
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<DuckDuckGoTopic>,
}

#[derive(Deserialize, Debug)]
struct DuckDuckGoTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
}

impl DuckDuckGoBackend {
    pub(crate) fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            endpoint: DUCKDUCKGO_ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn at_endpoint(client: Arc<Client>, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn query(&self, text: &str, _region: &str, limit: usize) -> Vec<RawSearchResult> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", text),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .timeout(CONFIG.request_timeout)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(target: "search", "DuckDuckGo returned status {}", r.status());
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(target: "search", "DuckDuckGo request failed: {}", e);
                return Vec::new();
            }
        };

        let payload: DuckDuckGoResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(target: "search", "DuckDuckGo payload malformed: {}", e);
                return Vec::new();
            }
        };

        payload
            .related_topics
            .into_iter()
            .filter_map(|topic| {
                let text = topic.text?;
                Some(RawSearchResult {
                    title: text.chars().take(100).collect(),
                    link: topic.first_url,
                    snippet: text,
                    source: "duckduckgo".to_string(),
                })
            })
            .take(limit)
            .collect()
    }
}

/// Backends in fixed priority order plus the injected response cache.
pub(crate) struct SearchProvider {
    backends: Vec<Box<dyn SearchBackend>>,
    cache: TtlCache<Vec<RawSearchResult>>,
}

impl SearchProvider {
    pub(crate) fn new(backends: Vec<Box<dyn SearchBackend>>, cache: TtlCache<Vec<RawSearchResult>>) -> Self {
        Self { backends, cache }
    }

    /// Assembles the production chain: Serper first when an API key is
    /// configured, DuckDuckGo as the free fallback.
    pub(crate) fn from_config(client: Arc<Client>) -> Self {
        let mut backends: Vec<Box<dyn SearchBackend>> = Vec::new();
        if let Some(key) = &CONFIG.serper_api_key {
            backends.push(Box::new(SerperBackend::new(client.clone(), key.clone())));
        } else {
            tracing::info!(target: "search", "No Serper API key configured, using free fallback only");
        }
        backends.push(Box::new(DuckDuckGoBackend::new(client)));

        let cache = TtlCache::new(CONFIG.cache_ttl, CONFIG.cache_max_entries);
        Self::new(backends, cache)
    }

    /// Issues one query against the chain, first backend with results wins.
    /// Always returns, possibly empty.
    pub(crate) async fn search(
        &self,
        query: &str,
        locale: &LocaleProfile,
        limit: usize,
    ) -> Vec<RawSearchResult> {
        if let Some(cached) = self.cache.get(query) {
            tracing::debug!(target: "search", "Cache hit for query: {}", query);
            return cached;
        }

        for backend in &self.backends {
            let results = backend.query(query, locale.gl, limit).await;
            if !results.is_empty() {
                tracing::info!(
                    target: "search",
                    "Backend '{}' returned {} results",
                    backend.name(),
                    results.len()
                );
                self.cache.put(query.to_string(), results.clone());
                return results;
            }
            tracing::debug!(
                target: "search",
                "Backend '{}' returned nothing for query, trying next",
                backend.name()
            );
        }

        Vec::new()
    }
}
