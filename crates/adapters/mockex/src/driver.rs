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

//! The synthetic exchange driver implementation.

use std::{
    hash::{Hash, Hasher},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use mdfanout_core::ServiceError;
use mdfanout_live::{ExchangeDriver, OrderBookEvent};
use mdfanout_model::{
    CandleUpdate, LiquidationEvent, LiquidationSide, OrderBookSnapshot, OrderBookUpdate, TickerUpdate, Timeframe,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::sync::mpsc;

const TICK_INTERVAL: Duration = Duration::from_millis(250);
const WATCH_CHANNEL_CAPACITY: usize = mdfanout_live::exchange::WATCH_CHANNEL_CAPACITY;

/// Derives a stable base price in `[1, 50000)` from a symbol so repeated
/// calls for the same symbol start from a consistent neighborhood.
fn base_price(symbol: &str) -> f64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    symbol.hash(&mut hasher);
    let bucket = (hasher.finish() % 50_000).max(1);
    bucket as f64
}

fn seed_rng(symbol: &str, salt: &str) -> StdRng {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    symbol.hash(&mut hasher);
    salt.hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn synthetic_levels(mid: f64, side_is_ask: bool, rng: &mut StdRng) -> Vec<OrderBookUpdate> {
    (0..50)
        .map(|i| {
            let step = (i as f64 + 1.0) * (mid * 0.0005).max(0.01);
            let price = if side_is_ask { mid + step } else { mid - step };
            let amount = rng.gen::<f64>() * 5.0 + 0.01;
            OrderBookUpdate::new(price.max(0.000_01), amount)
        })
        .collect()
}

/// A local random-walk exchange: no real network activity, used as the
/// development default and as the depth-cache/push fallback of last resort.
pub struct MockExchange;

impl MockExchange {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeDriver for MockExchange {
    async fn supports_depth_cache(&self, _symbol: &str) -> bool {
        false
    }

    async fn watch_depth_cache(&self, symbol: &str) -> Result<mpsc::Receiver<OrderBookEvent>, ServiceError> {
        Err(ServiceError::Internal(format!("mock exchange has no depth-cache source for {symbol}")))
    }

    async fn watch_order_book(&self, symbol: &str) -> Result<mpsc::Receiver<OrderBookEvent>, ServiceError> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let symbol = symbol.to_string();
        let mut rng = seed_rng(&symbol, "orderbook");
        let mid = base_price(&symbol);

        tokio::spawn(async move {
            let snapshot = OrderBookSnapshot {
                symbol: symbol.clone(),
                bids: synthetic_levels(mid, false, &mut rng),
                asks: synthetic_levels(mid, true, &mut rng),
                timestamp: mdfanout_core::UnixMillis::new(now_ms()),
            };
            if tx.send(OrderBookEvent::Snapshot(snapshot)).await.is_err() {
                return;
            }

            let mut ticker = tokio::time::interval(TICK_INTERVAL);
            loop {
                ticker.tick().await;
                let drift = (rng.gen::<f64>() - 0.5) * mid * 0.0002;
                let price = mid + drift;
                let side_is_ask = rng.gen::<bool>();
                let row = OrderBookUpdate::new(price.max(0.000_01), rng.gen::<f64>() * 3.0 + 0.01);
                let event = if side_is_ask {
                    OrderBookEvent::Delta { bids: Vec::new(), asks: vec![row], timestamp_ms: now_ms() }
                } else {
                    OrderBookEvent::Delta { bids: vec![row], asks: Vec::new(), timestamp_ms: now_ms() }
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(rx)
    }

    async fn watch_ticker(&self, symbol: &str) -> Result<mpsc::Receiver<TickerUpdate>, ServiceError> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let symbol = symbol.to_string();
        let mut rng = seed_rng(&symbol, "ticker");
        let mid = base_price(&symbol);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK_INTERVAL);
            let open = mid;
            loop {
                ticker.tick().await;
                let last = mid + (rng.gen::<f64>() - 0.5) * mid * 0.01;
                let update = TickerUpdate {
                    last,
                    bid: last * 0.9995,
                    ask: last * 1.0005,
                    high: mid * 1.02,
                    low: mid * 0.98,
                    open,
                    close: last,
                    change: last - open,
                    percentage: (last - open) / open * 100.0,
                    volume: rng.gen::<f64>() * 1000.0,
                    quote_volume: rng.gen::<f64>() * 1_000_000.0,
                    timestamp: now_ms(),
                };
                if tx.send(update).await.is_err() {
                    return;
                }
            }
        });

        Ok(rx)
    }

    async fn watch_ohlcv(&self, symbol: &str, timeframe: Timeframe) -> Result<mpsc::Receiver<CandleUpdate>, ServiceError> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let symbol = symbol.to_string();
        let mut rng = seed_rng(&symbol, "candle");
        let mid = base_price(&symbol);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK_INTERVAL);
            let mut close = mid;
            loop {
                ticker.tick().await;
                let open = close;
                close = open + (rng.gen::<f64>() - 0.5) * open * 0.005;
                let high = open.max(close) + rng.gen::<f64>() * open * 0.001;
                let low = open.min(close) - rng.gen::<f64>() * open * 0.001;
                let candle = CandleUpdate {
                    symbol: symbol.clone(),
                    timeframe,
                    timestamp: now_ms(),
                    open,
                    high,
                    low: low.max(0.000_01),
                    close,
                    volume: rng.gen::<f64>() * 100.0,
                };
                if tx.send(candle).await.is_err() {
                    return;
                }
            }
        });

        Ok(rx)
    }

    async fn forced_order_stream(&self, symbol: &str) -> Result<mpsc::Receiver<LiquidationEvent>, ServiceError> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let symbol = symbol.to_string();
        let mut rng = seed_rng(&symbol, "liquidation");
        let mid = base_price(&symbol);
        let base_asset = symbol.trim_end_matches("USDT").to_string();

        tokio::spawn(async move {
            loop {
                let delay_ms = rng.gen_range(500..4_000);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                let side = if rng.gen::<bool>() { LiquidationSide::Buy } else { LiquidationSide::Sell };
                let quantity = rng.gen::<f64>() * 2.0 + 0.001;
                let avg_price = mid + (rng.gen::<f64>() - 0.5) * mid * 0.01;
                let event = LiquidationEvent {
                    symbol: symbol.clone(),
                    side,
                    quantity,
                    avg_price,
                    value: quantity * avg_price,
                    event_time_ms: now_ms(),
                    display_time_hhmmss: format_hhmmss(now_ms()),
                    base_asset: base_asset.clone(),
                    quantity_formatted: None,
                    avg_price_formatted: None,
                    value_formatted: None,
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(rx)
    }

    async fn fetch_liquidation_history(
        &self,
        symbol: &str,
        start_ms: u64,
        end_ms: u64,
        limit: usize,
    ) -> Result<Vec<LiquidationEvent>, ServiceError> {
        if end_ms < start_ms {
            return Err(ServiceError::ParamInvalid(format!("end_ms {end_ms} precedes start_ms {start_ms}")));
        }

        let mut rng = seed_rng(symbol, "history");
        let mid = base_price(symbol);
        let base_asset = symbol.trim_end_matches("USDT").to_string();
        let span = end_ms - start_ms;
        let count = limit.min(500);

        let events = (0..count)
            .map(|_| {
                let event_time_ms = if span == 0 { start_ms } else { start_ms + rng.gen_range(0..=span) };
                let side = if rng.gen::<bool>() { LiquidationSide::Buy } else { LiquidationSide::Sell };
                let quantity = rng.gen::<f64>() * 2.0 + 0.001;
                let avg_price = mid + (rng.gen::<f64>() - 0.5) * mid * 0.01;
                LiquidationEvent {
                    symbol: symbol.to_string(),
                    side,
                    quantity,
                    avg_price,
                    value: quantity * avg_price,
                    event_time_ms,
                    display_time_hhmmss: format_hhmmss(event_time_ms),
                    base_asset: base_asset.clone(),
                    quantity_formatted: None,
                    avg_price_formatted: None,
                    value_formatted: None,
                }
            })
            .collect();

        Ok(events)
    }

    async fn probe(&self, _symbol: &str) -> bool {
        true
    }
}

fn format_hhmmss(ts_ms: u64) -> String {
    let total_secs = ts_ms / 1000;
    let hh = (total_secs / 3600) % 24;
    let mm = (total_secs / 60) % 60;
    let ss = total_secs % 60;
    format!("{hh:02}:{mm:02}:{ss:02}")
}
