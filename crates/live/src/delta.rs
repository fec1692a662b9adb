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

//! The delta engine (L6): per-subscriber previous-state tracking, emitting
//! full snapshots or incremental add/update/remove diffs against each
//! subscriber's last-sent book.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use mdfanout_core::UnixMillis;
use mdfanout_model::{AggregatedBook, BookLevel, DeltaLevel, DeltaMessage, DeltaOp};

const LEVEL_EPSILON: f64 = 1e-8;

/// Default interval after which a subscriber gets a full resync even with no
/// detected gap, matching the sequence-id resync guarantee.
pub const DEFAULT_FULL_SNAPSHOT_INTERVAL: Duration = Duration::from_secs(300);

/// Sessions untouched for longer than this are considered abandoned by the
/// periodic GC sweep.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

struct SubscriberState {
    last_sent_bids: HashMap<price_key::PriceBits, f64>,
    last_sent_asks: HashMap<price_key::PriceBits, f64>,
    last_full_snapshot_at: Option<UnixMillis>,
    updated_at: UnixMillis,
}

impl SubscriberState {
    fn new() -> Self {
        Self {
            last_sent_bids: HashMap::new(),
            last_sent_asks: HashMap::new(),
            last_full_snapshot_at: None,
            updated_at: UnixMillis::now(),
        }
    }
}

mod price_key {
    /// Price levels are already rounded to a fixed grid by the aggregator,
    /// so bit-pattern equality is safe and avoids `f64: !Eq`.
    pub type PriceBits = u64;

    #[must_use]
    pub fn of(price: f64) -> PriceBits {
        price.to_bits()
    }
}

/// Tracks per-subscriber previous-state and emits the minimal diff (or a
/// full snapshot) for each new aggregated book.
pub struct DeltaEngine {
    subscribers: Mutex<HashMap<String, SubscriberState>>,
    sequence_id: AtomicU64,
    full_snapshot_interval: Duration,
    max_age: Duration,
}

impl DeltaEngine {
    #[must_use]
    pub fn new(full_snapshot_interval: Duration, max_age: Duration) -> Self {
        Self { subscribers: Mutex::new(HashMap::new()), sequence_id: AtomicU64::new(0), full_snapshot_interval, max_age }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FULL_SNAPSHOT_INTERVAL, DEFAULT_MAX_AGE)
    }

    pub fn unregister(&self, connection_id: &str) {
        self.subscribers.lock().unwrap().remove(connection_id);
    }

    /// Computes the delta (or full snapshot) `connection_id` should receive
    /// for `book`, updating its tracked state. Returns `None` when there is
    /// nothing new to send.
    pub fn diff(&self, connection_id: &str, book: &AggregatedBook) -> Option<DeltaMessage> {
        let mut subscribers = self.subscribers.lock().unwrap();
        let state = subscribers.entry(connection_id.to_string()).or_insert_with(SubscriberState::new);
        state.updated_at = UnixMillis::now();

        let now = UnixMillis::now();
        let needs_full = state.last_sent_bids.is_empty()
            && state.last_sent_asks.is_empty()
            || state
                .last_full_snapshot_at
                .is_none_or(|last| now.as_u64().saturating_sub(last.as_u64()) > self.full_snapshot_interval.as_millis() as u64);

        let (bids_diff, asks_diff) = if needs_full {
            (full_snapshot_levels(&book.bids), full_snapshot_levels(&book.asks))
        } else {
            (diff_side(&state.last_sent_bids, &book.bids), diff_side(&state.last_sent_asks, &book.asks))
        };

        if !needs_full && bids_diff.is_empty() && asks_diff.is_empty() {
            return None;
        }

        apply_side(&mut state.last_sent_bids, &bids_diff);
        apply_side(&mut state.last_sent_asks, &asks_diff);
        if needs_full {
            state.last_full_snapshot_at = Some(now);
        }

        let sequence_id = self.sequence_id.fetch_add(1, Ordering::SeqCst) + 1;

        Some(DeltaMessage {
            symbol: book.symbol.clone(),
            rounding: book.rounding,
            timestamp: book.timestamp,
            sequence_id,
            full_snapshot: needs_full,
            bids: bids_diff,
            asks: asks_diff,
        })
    }

    /// Removes subscriber state untouched for longer than `max_age`.
    pub fn sweep_stale(&self) -> usize {
        let now = UnixMillis::now();
        let max_age_ms = self.max_age.as_millis() as u64;
        let mut subscribers = self.subscribers.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|_, state| now.as_u64().saturating_sub(state.updated_at.as_u64()) <= max_age_ms);
        before - subscribers.len()
    }

    #[must_use]
    pub fn tracked_subscribers(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

fn full_snapshot_levels(levels: &[BookLevel]) -> Vec<DeltaLevel> {
    levels.iter().map(|level| DeltaLevel::new(level.price, level.amount, DeltaOp::Add)).collect()
}

fn diff_side(previous: &HashMap<price_key::PriceBits, f64>, current: &[BookLevel]) -> Vec<DeltaLevel> {
    let mut diff = Vec::new();
    let mut seen = std::collections::HashSet::with_capacity(current.len());

    for level in current {
        let key = price_key::of(level.price);
        seen.insert(key);
        match previous.get(&key) {
            None => diff.push(DeltaLevel::new(level.price, level.amount, DeltaOp::Add)),
            Some(prev_amount) if (prev_amount - level.amount).abs() > LEVEL_EPSILON => {
                diff.push(DeltaLevel::new(level.price, level.amount, DeltaOp::Update));
            }
            Some(_) => {}
        }
    }

    for (&key, _) in previous {
        if !seen.contains(&key) {
            diff.push(DeltaLevel::new(f64::from_bits(key), 0.0, DeltaOp::Remove));
        }
    }

    diff
}

fn apply_side(table: &mut HashMap<price_key::PriceBits, f64>, diff: &[DeltaLevel]) {
    for level in diff {
        let key = price_key::of(level.price);
        match level.op {
            DeltaOp::Add | DeltaOp::Update => {
                table.insert(key, level.amount);
            }
            DeltaOp::Remove => {
                table.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mdfanout_model::{BookSource, MarketDepthInfo};

    use super::*;

    fn book(bids: Vec<(f64, f64)>, timestamp: u64) -> AggregatedBook {
        let mut cumulative = 0.0;
        let levels: Vec<BookLevel> = bids
            .into_iter()
            .map(|(price, amount)| {
                cumulative += amount;
                BookLevel::new(price, amount, cumulative)
            })
            .collect();
        let count = levels.len();
        AggregatedBook {
            symbol: "BTCUSDT".into(),
            bids: levels,
            asks: Vec::new(),
            timestamp,
            time_formatted: None,
            rounding: 1.0,
            depth: 10,
            source: BookSource::Mock,
            aggregated: true,
            market_depth_info: MarketDepthInfo { requested: 10, actual: count, raw_bids: count, raw_asks: 0, sufficient: true },
        }
    }

    #[test]
    fn first_diff_is_always_a_full_snapshot() {
        let engine = DeltaEngine::with_defaults();
        let delta = engine.diff("conn-1", &book(vec![(100.0, 1.0), (99.0, 2.0)], 1_000)).unwrap();
        assert!(delta.full_snapshot);
        assert_eq!(delta.bids.len(), 2);
        assert!(delta.bids.iter().all(|l| l.op == DeltaOp::Add));
    }

    #[test]
    fn second_diff_with_no_change_returns_none() {
        let engine = DeltaEngine::with_defaults();
        engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_000));
        assert!(engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_001)).is_none());
    }

    #[test]
    fn changed_amount_emits_update_op() {
        let engine = DeltaEngine::with_defaults();
        engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_000));
        let delta = engine.diff("conn-1", &book(vec![(100.0, 2.0)], 1_001)).unwrap();
        assert!(!delta.full_snapshot);
        assert_eq!(delta.bids, vec![DeltaLevel::new(100.0, 2.0, DeltaOp::Update)]);
    }

    #[test]
    fn removed_price_emits_remove_op() {
        let engine = DeltaEngine::with_defaults();
        engine.diff("conn-1", &book(vec![(100.0, 1.0), (99.0, 2.0)], 1_000));
        let delta = engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_001)).unwrap();
        assert_eq!(delta.bids.len(), 1);
        assert_eq!(delta.bids[0].op, DeltaOp::Remove);
        assert_eq!(delta.bids[0].price, 99.0);
    }

    #[test]
    fn sequence_id_is_strictly_increasing() {
        let engine = DeltaEngine::with_defaults();
        let a = engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_000)).unwrap();
        let b = engine.diff("conn-1", &book(vec![(100.0, 2.0)], 1_001)).unwrap();
        assert!(b.sequence_id > a.sequence_id);
    }

    #[test]
    fn forced_full_snapshot_interval_elapsed_resends_everything() {
        let engine = DeltaEngine::new(Duration::from_millis(0), DEFAULT_MAX_AGE);
        engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_000));
        let delta = engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_001)).unwrap();
        assert!(delta.full_snapshot);
    }

    #[test]
    fn sweep_stale_removes_untouched_subscribers() {
        let engine = DeltaEngine::new(DEFAULT_FULL_SNAPSHOT_INTERVAL, Duration::from_millis(0));
        engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_000));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(engine.sweep_stale(), 1);
        assert_eq!(engine.tracked_subscribers(), 0);
    }

    #[test]
    fn unregister_drops_subscriber_state() {
        let engine = DeltaEngine::with_defaults();
        engine.diff("conn-1", &book(vec![(100.0, 1.0)], 1_000));
        engine.unregister("conn-1");
        assert_eq!(engine.tracked_subscribers(), 0);
    }
}
