//! # Relay Endpoint Set
//! One operation per upstream data kind, all driven by [`EndpointKind`].
//!
//! Pass-through kinds hand the upstream JSON back untouched. The computed kinds
//! wrap their output as `{ "data": ... }`. International metals go through the
//! scraper and the freshness cache and never fail outward: they degrade to the
//! cached snapshot or to zero placeholders.

use std::sync::Arc;

use metrics::counter;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::cache::QuoteCache;
use crate::config::{EndpointTable, IntlMetalsConfig, RelayConfig};
use crate::error::RelayError;
use crate::quote::CommodityQuote;
use crate::scrape::{split_markup, LineScanScraper, QuoteScraper};
use crate::transform;
use crate::upstream::Upstream;

/// Kinds of data the dashboard asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    MarketStats,
    AllIndices,
    Metals,
    IntlMetals,
    FiiDiiReact,
    FiiDiiNse,
    VolumeGainers,
}

/// How a kind's upstream payload is turned into a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    PassThrough,
    IndianMetals,
    IntlMetals,
    VolumeGainers,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 7] = [
        EndpointKind::MarketStats,
        EndpointKind::AllIndices,
        EndpointKind::Metals,
        EndpointKind::IntlMetals,
        EndpointKind::FiiDiiReact,
        EndpointKind::FiiDiiNse,
        EndpointKind::VolumeGainers,
    ];

    /// Route served to the dashboard.
    pub fn path(self) -> &'static str {
        match self {
            EndpointKind::MarketStats => "/api/market-stats",
            EndpointKind::AllIndices => "/api/all-indices",
            EndpointKind::Metals => "/api/metals",
            EndpointKind::IntlMetals => "/api/intl-metals",
            EndpointKind::FiiDiiReact => "/api/fii-dii-react",
            EndpointKind::FiiDiiNse => "/api/fii-dii-nse",
            EndpointKind::VolumeGainers => "/api/volume-gainers",
        }
    }

    /// Key under `[endpoints]` in the config file; also the metrics label.
    pub fn config_key(self) -> &'static str {
        match self {
            EndpointKind::MarketStats => "market_stats",
            EndpointKind::AllIndices => "all_indices",
            EndpointKind::Metals => "metals",
            EndpointKind::IntlMetals => "intl_metals",
            EndpointKind::FiiDiiReact => "fii_dii_react",
            EndpointKind::FiiDiiNse => "fii_dii_nse",
            EndpointKind::VolumeGainers => "volume_gainers",
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            EndpointKind::MarketStats
            | EndpointKind::AllIndices
            | EndpointKind::FiiDiiReact
            | EndpointKind::FiiDiiNse => Shape::PassThrough,
            EndpointKind::Metals => Shape::IndianMetals,
            EndpointKind::IntlMetals => Shape::IntlMetals,
            EndpointKind::VolumeGainers => Shape::VolumeGainers,
        }
    }
}

pub struct Relay {
    upstream: Arc<dyn Upstream>,
    endpoints: EndpointTable,
    intl: IntlMetalsConfig,
    cache: Arc<QuoteCache>,
    scraper: Arc<dyn QuoteScraper>,
}

impl Relay {
    pub fn new(cfg: &RelayConfig, upstream: Arc<dyn Upstream>, cache: Arc<QuoteCache>) -> Self {
        Self {
            upstream,
            endpoints: cfg.endpoints.clone(),
            intl: cfg.intl_metals.clone(),
            cache,
            scraper: Arc::new(LineScanScraper),
        }
    }

    /// Replace the markup scraper (e.g. with a selector-based one).
    pub fn with_scraper(mut self, scraper: Arc<dyn QuoteScraper>) -> Self {
        self.scraper = scraper;
        self
    }

    /// Produce the response body for `kind`.
    pub async fn handle(&self, kind: EndpointKind) -> Result<Value, RelayError> {
        counter!("relay_requests_total", "endpoint" => kind.config_key()).increment(1);

        let result = match kind.shape() {
            Shape::PassThrough => self.pass_through(kind).await,
            Shape::IndianMetals => self.indian_metals().await,
            Shape::IntlMetals => Ok(json!({ "data": self.intl_metals().await })),
            Shape::VolumeGainers => self.volume_gainers().await,
        };

        if let Err(e) = &result {
            counter!("relay_upstream_errors_total", "endpoint" => kind.config_key()).increment(1);
            warn!(endpoint = kind.config_key(), error = %e, "relay request failed");
        }
        result
    }

    async fn pass_through(&self, kind: EndpointKind) -> Result<Value, RelayError> {
        let body = self.upstream.fetch_json(self.endpoints.get(kind)).await?;
        Ok(body)
    }

    async fn indian_metals(&self) -> Result<Value, RelayError> {
        let payload = self
            .upstream
            .fetch_json(self.endpoints.get(EndpointKind::Metals))
            .await?;
        Ok(json!({ "data": transform::indian_metals(&payload) }))
    }

    async fn volume_gainers(&self) -> Result<Value, RelayError> {
        let payload = self
            .upstream
            .fetch_json(self.endpoints.get(EndpointKind::VolumeGainers))
            .await?;
        let rows = transform::volume_gainers(&payload)?;
        Ok(json!({ "data": rows }))
    }

    /// International metal quotes, one per configured target, in target order.
    ///
    /// Served from cache while fresh. Otherwise scraped; any failure falls back
    /// to the cached snapshot, then to zero placeholders.
    pub async fn intl_metals(&self) -> Vec<CommodityQuote> {
        if self.cache.is_fresh_now(self.intl.fresh_window()) {
            if let Some(snap) = self.cache.get() {
                counter!("intl_metals_cache_served_total", "reason" => "fresh").increment(1);
                return snap.quotes;
            }
        }

        match self.scrape_intl_metals().await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(error = %e, "intl metals degraded");
                self.cached_or_placeholders()
            }
        }
    }

    async fn scrape_intl_metals(&self) -> Result<Vec<CommodityQuote>, RelayError> {
        let markup = self
            .upstream
            .fetch_text(self.endpoints.get(EndpointKind::IntlMetals))
            .await?;
        let mut lines = split_markup(&markup);

        if lines.len() < self.intl.min_markup_lines {
            counter!("intl_metals_rate_limited_total").increment(1);
            if self.cache.get().is_some() {
                return Err(RelayError::RateLimited { lines: lines.len() });
            }
            warn!(
                lines = lines.len(),
                "intl metals markup looks blocked and nothing is cached"
            );
            lines.clear();
        }

        let report = self.scraper.scrape(&lines, &self.intl.targets);
        if !report.misses.is_empty() {
            counter!("intl_metals_scrape_misses_total").increment(report.misses.len() as u64);
        }

        let stored = self.cache.put(report.quotes.clone());
        info!(
            lines = lines.len(),
            misses = report.misses.len(),
            cached = stored,
            "intl metals scraped"
        );
        Ok(report.quotes)
    }

    fn cached_or_placeholders(&self) -> Vec<CommodityQuote> {
        if let Some(snap) = self.cache.get() {
            counter!("intl_metals_cache_served_total", "reason" => "fallback").increment(1);
            return snap.quotes;
        }
        self.placeholders()
    }

    /// All-zero quotes for every configured target.
    pub fn placeholders(&self) -> Vec<CommodityQuote> {
        self.intl
            .targets
            .iter()
            .map(|t| CommodityQuote::placeholder(t.name))
            .collect()
    }
}
