use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;

use crate::config::ProviderConfig;

/// Source of creator search results.
///
/// Implementations return the raw JSON payload; shape checking happens in
/// [`crate::search::normalize`] so a non-conforming provider never fails a search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_creators(&self, query: &str) -> Result<serde_json::Value>;
    fn provider_id(&self) -> String;
}

pub struct HttpSearchProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl HttpSearchProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search_creators(&self, query: &str) -> Result<serde_json::Value> {
        let limit = self.config.limit.to_string();
        let mut req = self
            .client
            .get(&self.config.endpoint)
            .query(&[("q", query), ("limit", limit.as_str())]);

        if let Some(ref key) = self.config.api_key {
            if !key.is_empty() {
                req = req.bearer_auth(key);
            }
        }
        if let Some(secs) = self.config.timeout_secs {
            req = req.timeout(Duration::from_secs(secs));
        }

        let response = req
            .send()
            .await
            .map_err(|e| anyhow!("Creator search request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Creator search returned {}: {}", status, body));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse creator search response: {}", e))?;

        debug!("Creator search for \"{}\" answered by {}", query, self.provider_id());
        Ok(payload)
    }

    fn provider_id(&self) -> String {
        format!("http:{}", self.config.endpoint)
    }
}
