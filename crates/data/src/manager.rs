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

//! The order-book manager (L5): the single owner of every per-symbol book
//! and session-parameter record, mediating registration/unregistration and
//! aggregated lookups under one exclusive lock.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use mdfanout_common::cache::CacheStats;
use mdfanout_core::UnixMillis;
use mdfanout_model::{AggregatedBook, BookSource, OrderBook, OrderBookSnapshot, OrderBookUpdate, SessionParams, SymbolInfo};

use crate::{aggregator, cache::AggregationCache, formatter::FormatterCache};

pub type ConnectionId = String;

const BYTES_PER_LEVEL_ESTIMATE: usize = 32;

struct SessionRecord {
    symbol: String,
    params: SessionParams,
    connected_at: UnixMillis,
    updated_at: UnixMillis,
}

struct ManagerState {
    books: HashMap<String, OrderBook>,
    sessions: HashMap<ConnectionId, SessionRecord>,
    symbol_subscribers: HashMap<String, HashSet<ConnectionId>>,
    symbol_meta: HashMap<String, SymbolInfo>,
    persistent_mode: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManagerStats {
    pub book_count: usize,
    pub session_count: usize,
    pub estimated_memory_bytes: usize,
    pub cache_stats: CacheStats,
}

/// Singleton owner of every order book and session-parameter record.
///
/// All public methods acquire the single internal lock; the spec calls this
/// "exclusive lock per operation" rather than a reader/writer split, since
/// registrations/unregistrations mutate the same symbol index reads go
/// through.
pub struct OrderBookManager {
    state: Mutex<ManagerState>,
    cache: AggregationCache,
    formatter: FormatterCache,
    max_books: usize,
    cleanup_threshold: f64,
}

impl OrderBookManager {
    #[must_use]
    pub fn new(max_books: usize, cleanup_threshold: f64, cache_max_size: usize, cache_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(ManagerState {
                books: HashMap::new(),
                sessions: HashMap::new(),
                symbol_subscribers: HashMap::new(),
                symbol_meta: HashMap::new(),
                persistent_mode: false,
            }),
            cache: AggregationCache::new(cache_max_size, cache_ttl),
            formatter: FormatterCache::new(true, cache_max_size, cache_ttl),
            max_books,
            cleanup_threshold,
        }
    }

    /// Supplies/refreshes the symbol metadata the formatter uses for a
    /// symbol; independent of registration so it can arrive before the
    /// first subscriber.
    pub fn update_symbol_data(&self, symbol: &str, meta: SymbolInfo) {
        self.state.lock().unwrap().symbol_meta.insert(symbol.to_string(), meta);
    }

    /// Registers `connection_id` against `symbol`, creating the book if this
    /// is the first subscriber. Runs cleanup if the book count now exceeds
    /// `cleanup_threshold * max_books`.
    pub fn register(&self, connection_id: ConnectionId, symbol: &str, depth: usize, rounding: f64) {
        let now = UnixMillis::now();
        let params = SessionParams::clamped(depth, rounding);

        let mut state = self.state.lock().unwrap();
        let is_new_book = !state.books.contains_key(symbol);
        state.books.entry(symbol.to_string()).or_insert_with(|| OrderBook::new(symbol.to_string()));
        state
            .symbol_subscribers
            .entry(symbol.to_string())
            .or_default()
            .insert(connection_id.clone());
        state.sessions.insert(
            connection_id,
            SessionRecord { symbol: symbol.to_string(), params, connected_at: now, updated_at: now },
        );

        let book_count = state.books.len();
        if (book_count as f64) > self.cleanup_threshold * (self.max_books as f64) {
            self.cleanup_locked(&mut state);
        }

        let warm_inputs = is_new_book.then(|| {
            (state.books.get(symbol).expect("just inserted").clone(), state.symbol_meta.get(symbol).cloned())
        });
        drop(state);

        if let Some((book, meta)) = warm_inputs {
            tracing::debug!(symbol, "order book created, warming aggregation cache");
            self.cache.warm(symbol, BookSource::Push, |depth, rounding| {
                aggregator::aggregate(&book, depth, rounding, BookSource::Push, meta.as_ref(), Some(&self.formatter))
            });
        }
    }

    /// Removes the cleanest-case zero-subscriber books. Never touches a book
    /// with a non-empty subscriber set, and is a no-op entirely while
    /// persistent mode is enabled.
    fn cleanup_locked(&self, state: &mut ManagerState) {
        if state.persistent_mode {
            return;
        }
        let empty_symbols: Vec<String> = state
            .symbol_subscribers
            .iter()
            .filter(|(_, subs)| subs.is_empty())
            .map(|(symbol, _)| symbol.clone())
            .collect();
        for symbol in empty_symbols {
            state.books.remove(&symbol);
            state.symbol_subscribers.remove(&symbol);
            self.cache.invalidate_symbol(&symbol);
        }
    }

    /// Removes `connection_id`'s session record; destroys its book if the
    /// symbol now has zero subscribers and persistent mode is off.
    pub fn unregister(&self, connection_id: &str) {
        let mut state = self.state.lock().unwrap();
        let Some(session) = state.sessions.remove(connection_id) else { return };

        let mut now_empty = false;
        if let Some(subs) = state.symbol_subscribers.get_mut(&session.symbol) {
            subs.remove(connection_id);
            now_empty = subs.is_empty();
        }

        if now_empty && !state.persistent_mode {
            state.books.remove(&session.symbol);
            state.symbol_subscribers.remove(&session.symbol);
            self.cache.invalidate_symbol(&session.symbol);
        }
    }

    /// Partially updates `depth`/`rounding` for an existing session.
    pub fn update_params(&self, connection_id: &str, depth: Option<usize>, rounding: Option<f64>) {
        let mut state = self.state.lock().unwrap();
        if let Some(session) = state.sessions.get_mut(connection_id) {
            let new_depth = depth.unwrap_or(session.params.depth);
            let new_rounding = rounding.unwrap_or(session.params.rounding);
            session.params = SessionParams::clamped(new_depth, new_rounding);
            session.updated_at = UnixMillis::now();
        }
    }

    pub fn set_persistent_mode(&self, persistent: bool) {
        self.state.lock().unwrap().persistent_mode = persistent;
    }

    /// Applies a full-replace snapshot to `symbol`'s book. No-op if the book
    /// doesn't exist (no subscriber has registered yet).
    pub fn apply_snapshot(&self, snapshot: &OrderBookSnapshot) {
        let mut state = self.state.lock().unwrap();
        if let Some(book) = state.books.get_mut(&snapshot.symbol) {
            if let Err(err) = book.apply_snapshot(snapshot) {
                tracing::warn!(error = %err, symbol = %snapshot.symbol, "rejected order book snapshot");
            }
        }
        let symbol = snapshot.symbol.clone();
        drop(state);
        self.cache.invalidate_symbol(&symbol);
    }

    /// Applies an incremental delta to `symbol`'s book.
    pub fn apply_delta(&self, symbol: &str, bids: &[OrderBookUpdate], asks: &[OrderBookUpdate], ts: UnixMillis) {
        let mut state = self.state.lock().unwrap();
        if let Some(book) = state.books.get_mut(symbol) {
            book.apply_delta(bids, asks, ts);
        }
        drop(state);
        self.cache.invalidate_symbol(symbol);
    }

    /// Looks up `connection_id`'s session, then runs the Aggregator with
    /// that session's parameters over its symbol's book, going through the
    /// aggregation cache.
    #[must_use]
    pub fn get_aggregated(&self, connection_id: &str, source: BookSource) -> Option<AggregatedBook> {
        let state = self.state.lock().unwrap();
        let session = state.sessions.get(connection_id)?;
        let symbol = session.symbol.clone();
        let params = session.params;
        let book = state.books.get(&symbol)?.clone();
        let meta = state.symbol_meta.get(&symbol).cloned();
        drop(state);

        let key = crate::cache::AggregationKey::new(&symbol, params.depth, params.rounding, source);
        let current_ts = book.last_update_time.as_u64();
        Some(self.cache.get_or_compute(&key, current_ts, || {
            aggregator::aggregate(&book, params.depth, params.rounding, source, meta.as_ref(), Some(&self.formatter))
        }))
    }

    #[must_use]
    pub fn formatter_stats(&self) -> Option<mdfanout_common::cache::CacheStats> {
        self.formatter.stats()
    }

    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let state = self.state.lock().unwrap();
        let total_levels: usize = state.books.values().map(OrderBook::total_levels).sum();
        ManagerStats {
            book_count: state.books.len(),
            session_count: state.sessions.len(),
            estimated_memory_bytes: total_levels * BYTES_PER_LEVEL_ESTIMATE,
            cache_stats: self.cache.stats(),
        }
    }
}
