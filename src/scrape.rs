//! # Commodity Scraper
//! Pulls price and percent-change values for a handful of commodities out of
//! the raw HTML of a commodities listing page.
//!
//! There is no structured feed behind that page, so the scraper works on raw
//! lines: it finds the bolded commodity label, then looks a fixed number of
//! lines further for the price cell (`id="p"`) and the change cell
//! (`id="pch"`). Each target is handled on its own; a missing marker turns
//! into a zero placeholder for that target only.
//!
//! Known limitation: the scan windows below match one snapshot of the page
//! template. If the upstream markup is reformatted the affected values quietly
//! degrade to zeros. The heuristic lives behind [`QuoteScraper`] so it can be
//! swapped for a real HTML parser without touching callers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::quote::{Commodity, CommodityQuote};

/// Lines after the label (label line included) searched for the price cell.
pub const PRICE_WINDOW: usize = 12;
/// Lines after the label (label line included) searched for the change cell.
pub const CHANGE_WINDOW: usize = 20;
/// Lines after the price cell searched for the bare price value.
const PRICE_VALUE_LOOKAHEAD: usize = 2;

const PRICE_MARKER: &str = r#"id="p""#;
const CHANGE_MARKER: &str = r#"id="pch""#;

static RE_PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9.]+$").expect("price regex"));
static RE_DATA_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-value="([+-]?[0-9]+(?:\.[0-9]+)?)""#).expect("data-value regex")
});

/// What to look for on the page and what to call it in the output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommodityTarget {
    /// Text inside `<b>...</b>` on the page, e.g. `Aluminum`.
    pub label: String,
    pub name: Commodity,
}

impl CommodityTarget {
    pub fn new(label: &str, name: Commodity) -> Self {
        Self {
            label: label.to_string(),
            name,
        }
    }
}

/// Gold, Silver, Copper, Aluminum in that order.
pub fn default_targets() -> Vec<CommodityTarget> {
    vec![
        CommodityTarget::new("Gold", Commodity::Gold),
        CommodityTarget::new("Silver", Commodity::Silver),
        CommodityTarget::new("Copper", Commodity::Copper),
        CommodityTarget::new("Aluminum", Commodity::Aluminium),
    ]
}

/// A target whose label never showed up in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeMiss {
    pub name: Commodity,
    pub label: String,
}

/// Result of one pass: one quote per target, in target order, plus the misses.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub quotes: Vec<CommodityQuote>,
    pub misses: Vec<ScrapeMiss>,
}

/// Turns page markup into commodity quotes.
pub trait QuoteScraper: Send + Sync {
    fn scrape(&self, lines: &[&str], targets: &[CommodityTarget]) -> ScrapeReport;
}

/// Line-window heuristic scraper.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineScanScraper;

impl QuoteScraper for LineScanScraper {
    fn scrape(&self, lines: &[&str], targets: &[CommodityTarget]) -> ScrapeReport {
        scrape_lines(lines, targets)
    }
}

/// Run the heuristic over `lines` for every target.
pub fn scrape_lines(lines: &[&str], targets: &[CommodityTarget]) -> ScrapeReport {
    let mut report = ScrapeReport {
        quotes: Vec::with_capacity(targets.len()),
        misses: Vec::new(),
    };

    for target in targets {
        let bold = format!("<b>{}</b>", target.label);
        let Some(idx) = lines.iter().position(|l| l.contains(&bold)) else {
            tracing::debug!(commodity = target.name.as_str(), label = %target.label, "label not found");
            report.misses.push(ScrapeMiss {
                name: target.name,
                label: target.label.clone(),
            });
            report.quotes.push(CommodityQuote::placeholder(target.name));
            continue;
        };

        report.quotes.push(CommodityQuote {
            name: target.name,
            rate: find_price(lines, idx),
            change: find_change(lines, idx),
        });
    }

    report
}

/// Split a fetched page into lines the way the scraper expects.
pub fn split_markup(markup: &str) -> Vec<&str> {
    markup.split('\n').collect()
}

fn find_price(lines: &[&str], label_idx: usize) -> f64 {
    let end = (label_idx + PRICE_WINDOW).min(lines.len());
    let Some(cell) = (label_idx..end).find(|&j| lines[j].contains(PRICE_MARKER)) else {
        return 0.0;
    };

    let value_end = (cell + 1 + PRICE_VALUE_LOOKAHEAD).min(lines.len());
    lines[cell + 1..value_end]
        .iter()
        .map(|l| l.trim())
        .find(|v| RE_PRICE.is_match(v))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

fn find_change(lines: &[&str], label_idx: usize) -> f64 {
    let end = (label_idx + CHANGE_WINDOW).min(lines.len());
    let Some(cell) = (label_idx..end).find(|&j| lines[j].contains(CHANGE_MARKER)) else {
        return 0.0;
    };

    RE_DATA_VALUE
        .captures(lines[cell])
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(round2)
        .unwrap_or(0.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
