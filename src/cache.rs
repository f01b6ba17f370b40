//! # Freshness Cache
//! Holds the last commodity snapshot that actually carried prices.
//!
//! One instance lives for the whole process and is shared through the router
//! state. Reads never block on the network; the read/check/write sequence in
//! the relay is not atomic, and a racing second scrape simply overwrites the
//! first (last write wins).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::quote::{CommodityQuote, Snapshot};

/// Default freshness window for scraped quotes.
pub const DEFAULT_FRESH_WINDOW: Duration = Duration::from_millis(60_000);

/// Source of "now". Injected so freshness can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct QuoteCache {
    slot: RwLock<Option<Snapshot>>,
    clock: Arc<dyn Clock>,
}

impl QuoteCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            clock,
        }
    }

    /// Cache backed by the wall clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current snapshot, if any.
    pub fn get(&self) -> Option<Snapshot> {
        self.slot.read().clone()
    }

    /// Store `quotes` stamped with the current time, but only if at least one
    /// of them has a price. Returns whether the snapshot was replaced.
    pub fn put(&self, quotes: Vec<CommodityQuote>) -> bool {
        if !quotes.iter().any(CommodityQuote::has_price) {
            return false;
        }
        let snapshot = Snapshot {
            quotes,
            captured_at: self.clock.now(),
        };
        *self.slot.write() = Some(snapshot);
        true
    }

    /// True iff a snapshot exists and `now - captured_at < window`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let guard = self.slot.read();
        let Some(snap) = guard.as_ref() else {
            return false;
        };
        let Ok(window) = chrono::Duration::from_std(window) else {
            return true;
        };
        now.signed_duration_since(snap.captured_at) < window
    }

    /// [`Self::is_fresh`] against the injected clock.
    pub fn is_fresh_now(&self, window: Duration) -> bool {
        self.is_fresh(self.clock.now(), window)
    }
}

impl std::fmt::Debug for QuoteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteCache")
            .field("slot", &*self.slot.read())
            .finish_non_exhaustive()
    }
}
