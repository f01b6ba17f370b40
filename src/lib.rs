// src/lib.rs
// Public library surface for the binary and for integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod quote;
pub mod relay;
pub mod scrape;
pub mod transform;
pub mod upstream;

use std::sync::Arc;

use axum::Router;

pub use crate::api::{router, AppState};
pub use crate::cache::QuoteCache;
pub use crate::config::RelayConfig;
pub use crate::error::{RelayError, UpstreamError};
pub use crate::relay::{EndpointKind, Relay};
pub use crate::upstream::{HttpUpstream, Upstream, UpstreamRequest};

/// Build the production router: HTTP upstream, wall-clock cache, line-scan scraper.
pub fn build_app(cfg: &RelayConfig) -> Router {
    let upstream = HttpUpstream::new().with_timeout(cfg.upstream.request_timeout());
    let cache = Arc::new(QuoteCache::with_system_clock());
    let relay = Relay::new(cfg, Arc::new(upstream), cache);
    router(AppState::new(relay), &cfg.server.static_dir)
}
