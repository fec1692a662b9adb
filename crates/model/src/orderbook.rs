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

//! The authoritative, per-symbol order book (L1).
//!
//! Bids are kept in a `BTreeMap` and read in descending order; asks in a
//! `BTreeMap` read in ascending order. Both sides share a single
//! `snapshot_epoch` counter, bumped on every successful mutation, which is
//! the cache-invalidation coordinate the aggregation cache keys off.

use std::collections::BTreeMap;

use mdfanout_core::time::UnixMillis;

use crate::price::PriceKey;

/// A single `(price, amount)` row as received from an upstream feed.
///
/// `amount == 0.0` means "remove this price level" when applied via
/// [`OrderBook::apply_delta`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderBookUpdate {
    pub price: f64,
    pub amount: f64,
}

impl OrderBookUpdate {
    #[must_use]
    pub const fn new(price: f64, amount: f64) -> Self {
        Self { price, amount }
    }
}

/// A full-replace snapshot for one symbol, as received from an upstream feed.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub bids: Vec<OrderBookUpdate>,
    pub asks: Vec<OrderBookUpdate>,
    pub timestamp: UnixMillis,
}

/// The authoritative order book for a single symbol.
#[derive(Clone, Debug)]
pub struct OrderBook {
    pub symbol: String,
    bids: BTreeMap<PriceKey, f64>,
    asks: BTreeMap<PriceKey, f64>,
    pub last_update_time: UnixMillis,
    pub snapshot_epoch: u64,
    pub created_at: UnixMillis,
}

impl OrderBook {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        let now = UnixMillis::now();
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            last_update_time: now,
            snapshot_epoch: 0,
            created_at: now,
        }
    }

    /// Replaces both sides atomically. Rejects a snapshot for a different symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if `snapshot.symbol` does not match this book's symbol.
    pub fn apply_snapshot(&mut self, snapshot: &OrderBookSnapshot) -> Result<(), String> {
        if snapshot.symbol != self.symbol {
            return Err(format!(
                "snapshot symbol '{}' does not match book symbol '{}'",
                snapshot.symbol, self.symbol
            ));
        }

        self.bids.clear();
        self.asks.clear();
        for row in &snapshot.bids {
            if row.amount > 0.0 {
                self.bids.insert(PriceKey(row.price), row.amount);
            }
        }
        for row in &snapshot.asks {
            if row.amount > 0.0 {
                self.asks.insert(PriceKey(row.price), row.amount);
            }
        }
        self.last_update_time = snapshot.timestamp;
        self.snapshot_epoch += 1;
        Ok(())
    }

    /// Applies an incremental delta to one or both sides. A row with
    /// `amount == 0.0` removes that price level if present.
    pub fn apply_delta(&mut self, bids: &[OrderBookUpdate], asks: &[OrderBookUpdate], ts: UnixMillis) {
        for row in bids {
            apply_row(&mut self.bids, row);
        }
        for row in asks {
            apply_row(&mut self.asks, row);
        }
        self.last_update_time = ts;
        self.snapshot_epoch += 1;
    }

    /// Materializes ordered `(price, amount)` pairs for one side, truncated
    /// to `limit` rows if given. Bids come back high-to-low, asks low-to-high.
    #[must_use]
    pub fn snapshot(&self, limit: Option<usize>) -> (Vec<OrderBookUpdate>, Vec<OrderBookUpdate>) {
        let bids = self
            .bids
            .iter()
            .rev()
            .map(|(k, &amount)| OrderBookUpdate::new(k.value(), amount));
        let asks = self
            .asks
            .iter()
            .map(|(k, &amount)| OrderBookUpdate::new(k.value(), amount));

        match limit {
            Some(n) => (bids.take(n).collect(), asks.take(n).collect()),
            None => (bids.collect(), asks.collect()),
        }
    }

    /// O(1) peek at the best bid/ask, if present.
    #[must_use]
    pub fn best_bid_ask(&self) -> (Option<OrderBookUpdate>, Option<OrderBookUpdate>) {
        let best_bid = self
            .bids
            .iter()
            .next_back()
            .map(|(k, &a)| OrderBookUpdate::new(k.value(), a));
        let best_ask = self
            .asks
            .iter()
            .next()
            .map(|(k, &a)| OrderBookUpdate::new(k.value(), a));
        (best_bid, best_ask)
    }

    /// Returns `(bid_levels, ask_levels)` counts.
    #[must_use]
    pub fn level_counts(&self) -> (usize, usize) {
        (self.bids.len(), self.asks.len())
    }

    /// Total number of price levels across both sides; used for memory estimates.
    #[must_use]
    pub fn total_levels(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    #[must_use]
    pub fn age_secs(&self, now: UnixMillis) -> f64 {
        self.created_at.elapsed_secs(now)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Checks the logged-but-not-enforced crossed-book invariant; returns
    /// `true` if the book is crossed (`best_bid >= best_ask`).
    #[must_use]
    pub fn is_crossed(&self) -> bool {
        let (bid, ask) = self.best_bid_ask();
        match (bid, ask) {
            (Some(b), Some(a)) => b.price >= a.price,
            _ => false,
        }
    }
}

fn apply_row(side: &mut BTreeMap<PriceKey, f64>, row: &OrderBookUpdate) {
    let key = PriceKey(row.price);
    if row.amount <= 0.0 {
        side.remove(&key);
    } else {
        side.insert(key, row.amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(symbol: &str) -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: symbol.to_string(),
            bids: vec![OrderBookUpdate::new(100.0, 1.0), OrderBookUpdate::new(99.0, 2.0)],
            asks: vec![OrderBookUpdate::new(101.0, 1.5), OrderBookUpdate::new(102.0, 0.5)],
            timestamp: UnixMillis::new(1_000),
        }
    }

    #[test]
    fn apply_snapshot_orders_each_side() {
        let mut book = OrderBook::new("BTCUSDT");
        book.apply_snapshot(&snap("BTCUSDT")).unwrap();
        let (bids, asks) = book.snapshot(None);
        assert_eq!(bids.iter().map(|r| r.price).collect::<Vec<_>>(), vec![100.0, 99.0]);
        assert_eq!(asks.iter().map(|r| r.price).collect::<Vec<_>>(), vec![101.0, 102.0]);
        assert_eq!(book.snapshot_epoch, 1);
    }

    #[test]
    fn apply_snapshot_rejects_mismatched_symbol() {
        let mut book = OrderBook::new("BTCUSDT");
        assert!(book.apply_snapshot(&snap("ETHUSDT")).is_err());
    }

    #[test]
    fn apply_snapshot_drops_zero_rows() {
        let mut book = OrderBook::new("BTCUSDT");
        let mut s = snap("BTCUSDT");
        s.bids.push(OrderBookUpdate::new(98.0, 0.0));
        book.apply_snapshot(&s).unwrap();
        assert_eq!(book.level_counts().0, 2);
    }

    #[test]
    fn apply_delta_adds_updates_and_removes() {
        let mut book = OrderBook::new("BTCUSDT");
        book.apply_snapshot(&snap("BTCUSDT")).unwrap();

        book.apply_delta(
            &[OrderBookUpdate::new(100.0, 0.0), OrderBookUpdate::new(98.0, 3.0)],
            &[],
            UnixMillis::new(2_000),
        );

        let (bids, _) = book.snapshot(None);
        assert_eq!(bids.iter().map(|r| r.price).collect::<Vec<_>>(), vec![99.0, 98.0]);
        assert_eq!(book.snapshot_epoch, 2);
    }

    #[test]
    fn empty_delta_leaves_book_unchanged() {
        let mut book = OrderBook::new("BTCUSDT");
        book.apply_snapshot(&snap("BTCUSDT")).unwrap();
        let before = book.snapshot(None);
        book.apply_delta(&[], &[], UnixMillis::new(5_000));
        let after = book.snapshot(None);
        assert_eq!(before, after);
    }

    #[test]
    fn best_bid_ask_peeks_o1() {
        let mut book = OrderBook::new("BTCUSDT");
        book.apply_snapshot(&snap("BTCUSDT")).unwrap();
        let (bid, ask) = book.best_bid_ask();
        assert_eq!(bid.unwrap().price, 100.0);
        assert_eq!(ask.unwrap().price, 101.0);
    }

    #[test]
    fn snapshot_truncates_to_limit() {
        let mut book = OrderBook::new("BTCUSDT");
        book.apply_snapshot(&snap("BTCUSDT")).unwrap();
        let (bids, asks) = book.snapshot(Some(1));
        assert_eq!(bids.len(), 1);
        assert_eq!(asks.len(), 1);
    }

    #[test]
    fn empty_book_is_empty_and_not_crossed() {
        let book = OrderBook::new("BTCUSDT");
        assert!(book.is_empty());
        assert!(!book.is_crossed());
    }

    #[test]
    fn crossed_book_is_detected_but_not_rejected() {
        let mut book = OrderBook::new("BTCUSDT");
        book.apply_snapshot(&OrderBookSnapshot {
            symbol: "BTCUSDT".into(),
            bids: vec![OrderBookUpdate::new(105.0, 1.0)],
            asks: vec![OrderBookUpdate::new(100.0, 1.0)],
            timestamp: UnixMillis::new(1),
        })
        .unwrap();
        assert!(book.is_crossed());
    }
}
