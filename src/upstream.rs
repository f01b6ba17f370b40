//! # Upstream Gateway
//! Outbound HTTP to the fixed market-data endpoints.
//!
//! Every call is a single GET with the headers configured for that endpoint.
//! There is no retry here; callers decide what to fall back to.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::UpstreamError;

/// URL plus the fixed headers sent with it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamRequest {
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl UpstreamRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

/// Gateway to third-party endpoints. Implemented over HTTP in production and
/// by in-memory stubs in tests.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// GET and decode the body as JSON.
    async fn fetch_json(&self, req: &UpstreamRequest) -> Result<Value, UpstreamError>;
    /// GET and return the body as text.
    async fn fetch_text(&self, req: &UpstreamRequest) -> Result<String, UpstreamError>;
}

#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpUpstream {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get(&self, req: &UpstreamRequest) -> Result<reqwest::Response, UpstreamError> {
        let mut builder = self.client.get(&req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }

        let t0 = Instant::now();
        let resp = builder.send().await;
        histogram!("upstream_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let resp = resp.map_err(|source| {
            tracing::warn!(error = %source, url = %req.url, "upstream transport error");
            UpstreamError::Transport {
                url: req.url.clone(),
                source,
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %req.url, "upstream non-2xx");
            return Err(UpstreamError::Status {
                url: req.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

impl Default for HttpUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch_json(&self, req: &UpstreamRequest) -> Result<Value, UpstreamError> {
        let resp = self.get(req).await?;
        let bytes = resp.bytes().await.map_err(|e| UpstreamError::Decode {
            url: req.url.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode {
            url: req.url.clone(),
            reason: e.to_string(),
        })
    }

    async fn fetch_text(&self, req: &UpstreamRequest) -> Result<String, UpstreamError> {
        let resp = self.get(req).await?;
        resp.text().await.map_err(|e| UpstreamError::Decode {
            url: req.url.clone(),
            reason: e.to_string(),
        })
    }
}
