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

//! The abstract interface the Upstream Stream Manager and Liquidation
//! Aggregator drive against. A concrete exchange adapter (or the synthetic
//! mock generator) implements this once; everything above it is exchange-
//! agnostic.

use async_trait::async_trait;
use mdfanout_core::ServiceError;
use mdfanout_model::{CandleUpdate, LiquidationEvent, OrderBookSnapshot, OrderBookUpdate, TickerUpdate, Timeframe};
use tokio::sync::mpsc;

/// One inbound order-book event from an upstream feed: either a full
/// replace or an incremental delta.
#[derive(Clone, Debug)]
pub enum OrderBookEvent {
    Snapshot(OrderBookSnapshot),
    Delta { bids: Vec<OrderBookUpdate>, asks: Vec<OrderBookUpdate>, timestamp_ms: u64 },
}

/// Channel capacity for every watch subscription; a slow consumer applies
/// backpressure to the driver rather than growing memory without bound.
pub const WATCH_CHANNEL_CAPACITY: usize = 1_024;

/// Abstracts a single upstream cryptocurrency exchange: everything the
/// Upstream Stream Manager and Liquidation Aggregator need, without either
/// of them knowing which concrete exchange (or the synthetic mock) is behind
/// it.
#[async_trait]
pub trait ExchangeDriver: Send + Sync {
    /// Whether this exchange exposes a maintained depth-cache source (full
    /// book via delta stream + periodic resync) for `symbol`, used to choose
    /// between source (a) and (b) in the stream-manager source order.
    async fn supports_depth_cache(&self, symbol: &str) -> bool;

    /// Starts a depth-cache order-book stream: an initial snapshot followed
    /// by incremental deltas, periodically resynced.
    async fn watch_depth_cache(&self, symbol: &str) -> Result<mpsc::Receiver<OrderBookEvent>, ServiceError>;

    /// Starts a push order-book subscription ("watch order book").
    async fn watch_order_book(&self, symbol: &str) -> Result<mpsc::Receiver<OrderBookEvent>, ServiceError>;

    /// Starts a ticker subscription, normalized to the canonical shape.
    async fn watch_ticker(&self, symbol: &str) -> Result<mpsc::Receiver<TickerUpdate>, ServiceError>;

    /// Starts an OHLCV subscription for `symbol`/`timeframe`.
    async fn watch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<mpsc::Receiver<CandleUpdate>, ServiceError>;

    /// Starts a forced-liquidation order stream for `symbol`.
    async fn forced_order_stream(&self, symbol: &str) -> Result<mpsc::Receiver<LiquidationEvent>, ServiceError>;

    /// Queries historical forced-liquidation events for backfill.
    async fn fetch_liquidation_history(
        &self,
        symbol: &str,
        start_ms: u64,
        end_ms: u64,
        limit: usize,
    ) -> Result<Vec<LiquidationEvent>, ServiceError>;

    /// A cheap reachability probe used to decide whether to fall back to the
    /// synthetic mock generator for `symbol`.
    async fn probe(&self, symbol: &str) -> bool;
}
