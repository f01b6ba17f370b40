// tests/common/mod.rs
//
// Shared helpers: an in-memory Upstream stub and a config pointing at it.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use market_relay::cache::{Clock, QuoteCache};
use market_relay::scrape::QuoteScraper;
use market_relay::{router, AppState, Relay, RelayConfig, Upstream, UpstreamError, UpstreamRequest};

pub const BODY_LIMIT: usize = 1024 * 1024;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += chrono::Duration::from_std(by).expect("test step fits");
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

/// Canned answer for one upstream URL.
#[derive(Clone, Debug)]
pub enum Canned {
    Json(Value),
    Text(String),
    Status(u16),
}

/// Upstream stub keyed by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct StubUpstream {
    answers: Mutex<HashMap<String, Canned>>,
    calls: Mutex<Vec<String>>,
}

impl StubUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, key: &str, canned: Canned) {
        self.answers.lock().insert(stub_url(key), canned);
    }

    /// How many requests hit the URL configured for `key`.
    pub fn calls_to(&self, key: &str) -> usize {
        let url = stub_url(key);
        self.calls.lock().iter().filter(|u| **u == url).count()
    }

    fn lookup(&self, req: &UpstreamRequest) -> Canned {
        self.calls.lock().push(req.url.clone());
        self.answers
            .lock()
            .get(&req.url)
            .cloned()
            .unwrap_or(Canned::Status(404))
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn fetch_json(&self, req: &UpstreamRequest) -> Result<Value, UpstreamError> {
        match self.lookup(req) {
            Canned::Json(v) => Ok(v),
            Canned::Text(t) => serde_json::from_str(&t).map_err(|e| UpstreamError::Decode {
                url: req.url.clone(),
                reason: e.to_string(),
            }),
            Canned::Status(status) => Err(UpstreamError::Status {
                url: req.url.clone(),
                status,
            }),
        }
    }

    async fn fetch_text(&self, req: &UpstreamRequest) -> Result<String, UpstreamError> {
        match self.lookup(req) {
            Canned::Json(v) => Ok(v.to_string()),
            Canned::Text(t) => Ok(t),
            Canned::Status(status) => Err(UpstreamError::Status {
                url: req.url.clone(),
                status,
            }),
        }
    }
}

pub fn stub_url(key: &str) -> String {
    format!("http://upstream.test/{key}")
}

pub fn test_config() -> RelayConfig {
    let mut toml = String::from("[intl_metals]\nfresh_window_ms = 60000\nmin_markup_lines = 100\n\n[endpoints]\n");
    for key in [
        "market_stats",
        "all_indices",
        "metals",
        "intl_metals",
        "fii_dii_react",
        "fii_dii_nse",
        "volume_gainers",
    ] {
        toml.push_str(&format!(
            "{key} = {{ url = \"{}\", headers = {{ Accept = \"application/json\" }} }}\n",
            stub_url(key)
        ));
    }
    RelayConfig::from_toml_str(&toml).expect("test config parses")
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|e| panic!("missing tests/fixtures/{name}: {e}"))
}

/// Everything a router test needs to poke at.
pub struct Harness {
    pub upstream: Arc<StubUpstream>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<QuoteCache>,
    pub relay: Arc<Relay>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Harness whose relay scrapes with `scraper` instead of the line scanner.
    pub fn with_scraper(scraper: Arc<dyn QuoteScraper>) -> Self {
        Self::build(Some(scraper))
    }

    fn build(scraper: Option<Arc<dyn QuoteScraper>>) -> Self {
        let cfg = test_config();
        let upstream = Arc::new(StubUpstream::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 15, 0).unwrap(),
        ));
        let cache = Arc::new(QuoteCache::new(clock.clone()));
        let mut relay = Relay::new(&cfg, upstream.clone(), cache.clone());
        if let Some(scraper) = scraper {
            relay = relay.with_scraper(scraper);
        }
        let relay = Arc::new(relay);
        Self {
            upstream,
            clock,
            cache,
            relay,
        }
    }

    pub fn router(&self, static_dir: &std::path::Path) -> Router {
        router(
            AppState {
                relay: self.relay.clone(),
            },
            static_dir,
        )
    }
}
