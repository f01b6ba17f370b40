//! Quote types shared by the scraper, the cache and the relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commodities tracked on the international-metals board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Commodity {
    Gold,
    Silver,
    Copper,
    Aluminium,
}

impl Commodity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commodity::Gold => "GOLD",
            Commodity::Silver => "SILVER",
            Commodity::Copper => "COPPER",
            Commodity::Aluminium => "ALUMINIUM",
        }
    }
}

/// One scraped price line. `rate` is never negative; `change` is a signed percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommodityQuote {
    pub name: Commodity,
    pub rate: f64,
    pub change: f64,
}

impl CommodityQuote {
    /// Zero-valued stand-in used when nothing better is known.
    pub fn placeholder(name: Commodity) -> Self {
        Self {
            name,
            rate: 0.0,
            change: 0.0,
        }
    }

    pub fn has_price(&self) -> bool {
        self.rate > 0.0
    }
}

/// Indian (MCX) metal quote. The name is the upstream symbol, upper-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalQuote {
    pub name: String,
    pub rate: f64,
    pub change: f64,
}

/// Last good scrape plus the time it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub quotes: Vec<CommodityQuote>,
    pub captured_at: DateTime<Utc>,
}
