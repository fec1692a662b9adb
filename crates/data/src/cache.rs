// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The aggregation cache (L3): a TTL+LRU cache of [`AggregatedBook`] results
//! keyed by `(symbol, depth, rounding, source)`, plus cache warming over the
//! common depth/rounding combinations used by most subscribers.

use std::time::Duration;

use mdfanout_common::cache::{CacheStats, TtlLruCache};
use mdfanout_model::{AggregatedBook, BookSource};

/// Depths warmed eagerly whenever a new book is created.
pub const WARM_DEPTHS: &[usize] = &[5, 10, 20, 50];
/// Roundings warmed eagerly whenever a new book is created.
pub const WARM_ROUNDINGS: &[f64] = &[0.01, 0.1, 1.0];

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AggregationKey {
    pub symbol: String,
    pub depth: usize,
    rounding_bits: u64,
    pub source: BookSource,
}

impl AggregationKey {
    #[must_use]
    pub fn new(symbol: impl Into<String>, depth: usize, rounding: f64, source: BookSource) -> Self {
        Self { symbol: symbol.into(), depth, rounding_bits: rounding.to_bits(), source }
    }
}

/// The aggregation cache. Does not itself know how to compute a miss: callers
/// pass a closure to [`AggregationCache::get_or_compute`], mirroring the
/// "on miss: compute, insert" behavior.
pub struct AggregationCache {
    inner: TtlLruCache<AggregationKey, AggregatedBook>,
}

impl AggregationCache {
    #[must_use]
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self { inner: TtlLruCache::new(max_size, ttl) }
    }

    /// On hit, refreshes the cached record's `timestamp`/`time_formatted`
    /// from `current_book_timestamp` before returning it (the cached book's
    /// price levels stay as computed, but its age marker tracks the book).
    pub fn get_or_compute(
        &self,
        key: &AggregationKey,
        current_book_timestamp_ms: u64,
        compute: impl FnOnce() -> AggregatedBook,
    ) -> AggregatedBook {
        if let Some(mut hit) = self.inner.get(key) {
            hit.timestamp = current_book_timestamp_ms;
            hit.time_formatted = mdfanout_core::UnixMillis::new(current_book_timestamp_ms)
                .to_hhmmss()
                .into();
            return hit;
        }
        let computed = compute();
        self.inner.insert(key.clone(), computed.clone());
        computed
    }

    pub fn invalidate_symbol(&self, symbol: &str) -> usize {
        self.inner.invalidate_where(|key| key.symbol == symbol)
    }

    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    /// Schedules (fire-and-forget) the computation of every `(depth,
    /// rounding)` combination in the warm set for `symbol`. Failures are
    /// swallowed — warming is a latency optimization, not a correctness
    /// requirement.
    pub fn warm(&self, symbol: &str, source: BookSource, compute: impl Fn(usize, f64) -> AggregatedBook) {
        for &depth in WARM_DEPTHS {
            for &rounding in WARM_ROUNDINGS {
                let key = AggregationKey::new(symbol, depth, rounding, source);
                if self.inner.get(&key).is_some() {
                    continue;
                }
                let computed = compute(depth, rounding);
                self.inner.insert(key, computed);
            }
        }
    }
}

/// A second, lower-resolution cache in front of [`AggregationCache`] that
/// collapses repeated sub-second queries for the same `(symbol, depth,
/// rounding, second)`. Size-capped at 100 entries; overflow drops the single
/// oldest entry.
pub struct SecondResolutionCache {
    inner: mdfanout_common::cache::SecondBucketCache<(String, usize, u64, u64), AggregatedBook>,
}

impl SecondResolutionCache {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: mdfanout_common::cache::SecondBucketCache::new(100) }
    }

    #[must_use]
    pub fn get(&self, symbol: &str, depth: usize, rounding: f64, timestamp_ms: u64) -> Option<AggregatedBook> {
        let key = (symbol.to_string(), depth, rounding.to_bits(), timestamp_ms / 1_000);
        self.inner.get(&key)
    }

    pub fn insert(&self, symbol: &str, depth: usize, rounding: f64, timestamp_ms: u64, book: AggregatedBook) {
        let key = (symbol.to_string(), depth, rounding.to_bits(), timestamp_ms / 1_000);
        self.inner.insert(key, book);
    }
}

impl Default for SecondResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use mdfanout_model::MarketDepthInfo;

    use super::*;

    fn sample(symbol: &str, timestamp: u64) -> AggregatedBook {
        AggregatedBook {
            symbol: symbol.to_string(),
            bids: vec![],
            asks: vec![],
            timestamp,
            time_formatted: None,
            rounding: 1.0,
            depth: 5,
            source: BookSource::Mock,
            aggregated: true,
            market_depth_info: MarketDepthInfo { requested: 5, actual: 0, raw_bids: 0, raw_asks: 0, sufficient: false },
        }
    }

    #[test]
    fn hit_refreshes_timestamp_from_current_book() {
        let cache = AggregationCache::new(10, Duration::from_secs(60));
        let key = AggregationKey::new("BTCUSDT", 5, 1.0, BookSource::Mock);
        cache.get_or_compute(&key, 1_000, || sample("BTCUSDT", 1_000));
        let hit = cache.get_or_compute(&key, 2_000, || panic!("should not recompute on hit"));
        assert_eq!(hit.timestamp, 2_000);
    }

    #[test]
    fn invalidate_symbol_removes_matching_entries_only() {
        let cache = AggregationCache::new(10, Duration::from_secs(60));
        let btc = AggregationKey::new("BTCUSDT", 5, 1.0, BookSource::Mock);
        let eth = AggregationKey::new("ETHUSDT", 5, 1.0, BookSource::Mock);
        cache.get_or_compute(&btc, 1_000, || sample("BTCUSDT", 1_000));
        cache.get_or_compute(&eth, 1_000, || sample("ETHUSDT", 1_000));
        let removed = cache.invalidate_symbol("BTCUSDT");
        assert_eq!(removed, 1);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn warm_populates_every_depth_rounding_combination() {
        let cache = AggregationCache::new(100, Duration::from_secs(60));
        cache.warm("BTCUSDT", BookSource::Mock, |depth, _rounding| sample("BTCUSDT", depth as u64));
        assert_eq!(cache.stats().size, WARM_DEPTHS.len() * WARM_ROUNDINGS.len());
    }

    #[test]
    fn second_resolution_cache_collapses_same_second() {
        let cache = SecondResolutionCache::new();
        cache.insert("BTCUSDT", 5, 1.0, 1_000, sample("BTCUSDT", 1_000));
        assert!(cache.get("BTCUSDT", 5, 1.0, 1_999).is_some());
        assert!(cache.get("BTCUSDT", 5, 1.0, 5_000).is_none());
    }
}
