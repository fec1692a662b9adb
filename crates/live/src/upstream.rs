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

//! The upstream stream manager (L9): multiplexes one upstream feed per
//! `(symbol, stream_type)` key to however many subscriber sessions are
//! attached, with reference-counted start/stop, source fallback for order
//! books, and exponential-backoff reconnect.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use mdfanout_core::UnixMillis;
use mdfanout_data::OrderBookManager;
use mdfanout_model::{BookSource, CandleUpdate, SessionParams, StreamType, TickerUpdate, Timeframe};
use tokio::sync::{Mutex, mpsc};

use crate::exchange::{ExchangeDriver, OrderBookEvent, WATCH_CHANNEL_CAPACITY};

/// Reconnect backoff sequence in seconds; the manager gives up retrying only
/// when the subscriber count has reached zero, at which point the task is
/// stopped rather than backed off.
pub const BACKOFF_SEQUENCE_SECS: &[u64] = &[1, 2, 5, 10, 30];

/// One event delivered to a subscriber socket for its stream.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    /// The manager-owned order book for this symbol changed; the receiver
    /// pulls a fresh aggregate/delta through the order-book manager rather
    /// than carrying the payload here.
    OrderBookTick,
    Ticker(TickerUpdate),
    Candle(CandleUpdate),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StreamState {
    Idle,
    Starting,
    Running,
    Backoff,
    Restarting,
    Stopping,
}

pub type SubscriberId = u64;

struct Subscriber {
    id: SubscriberId,
    sender: mpsc::UnboundedSender<StreamEvent>,
}

struct StreamHandle {
    stream_type: StreamType,
    subscribers: Mutex<Vec<Subscriber>>,
    state: Mutex<StreamState>,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
    stop: Arc<AtomicBool>,
    active_config: Mutex<Option<SessionParams>>,
    /// The `BookSource` the running orderbook task actually resolved to
    /// (depth cache, direct push, or the mock fallback). `None` until the
    /// first connection attempt completes, and only ever set for
    /// `StreamType::Orderbook` handles.
    active_source: Mutex<Option<BookSource>>,
}

impl StreamHandle {
    fn new(stream_type: StreamType) -> Self {
        Self {
            stream_type,
            subscribers: Mutex::new(Vec::new()),
            state: Mutex::new(StreamState::Idle),
            task: Mutex::new(None),
            stop: Arc::new(AtomicBool::new(false)),
            active_config: Mutex::new(None),
            active_source: Mutex::new(None),
        }
    }
}

/// Splits `"BTCUSDT:1m"` into its base symbol, dropping a trailing
/// `:timeframe` or `:ticker` suffix.
fn base_symbol(stream_key: &str) -> &str {
    stream_key.split(':').next().unwrap_or(stream_key)
}

pub struct UpstreamStreamManager {
    exchange: Arc<dyn ExchangeDriver>,
    order_books: Arc<OrderBookManager>,
    streams: Mutex<HashMap<String, Arc<StreamHandle>>>,
    next_subscriber_id: AtomicU64,
}

impl UpstreamStreamManager {
    #[must_use]
    pub fn new(exchange: Arc<dyn ExchangeDriver>, order_books: Arc<OrderBookManager>) -> Self {
        Self { exchange, order_books, streams: Mutex::new(HashMap::new()), next_subscriber_id: AtomicU64::new(1) }
    }

    /// Attaches a subscriber to `stream_key`, starting the upstream task on
    /// the 0->1 subscriber transition. `config` is only meaningful for
    /// `orderbook` streams and is used to detect parameter drift that should
    /// trigger a restart.
    pub async fn connect(
        &self,
        stream_key: &str,
        stream_type: StreamType,
        config: SessionParams,
    ) -> (SubscriberId, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);

        let handle = {
            let mut streams = self.streams.lock().await;
            Arc::clone(streams.entry(stream_key.to_string()).or_insert_with(|| Arc::new(StreamHandle::new(stream_type))))
        };

        let was_empty = {
            let mut subs = handle.subscribers.lock().await;
            let was_empty = subs.is_empty();
            subs.push(Subscriber { id, sender: tx });
            was_empty
        };

        if was_empty {
            *handle.active_config.lock().await = Some(config);
            self.start_task(stream_key.to_string(), Arc::clone(&handle)).await;
        } else if stream_type == StreamType::Orderbook {
            let differs = handle.active_config.lock().await.map(|active| active != config).unwrap_or(true);
            if differs {
                self.restart_task(stream_key.to_string(), Arc::clone(&handle), config).await;
            }
        }

        (id, rx)
    }

    /// Detaches `subscriber_id` from `stream_key`; on the transition to zero
    /// subscribers, stops the upstream task and removes the entry.
    pub async fn disconnect(&self, stream_key: &str, subscriber_id: SubscriberId) {
        let handle = {
            let streams = self.streams.lock().await;
            streams.get(stream_key).cloned()
        };
        let Some(handle) = handle else { return };

        let now_empty = {
            let mut subs = handle.subscribers.lock().await;
            subs.retain(|s| s.id != subscriber_id);
            subs.is_empty()
        };

        if !now_empty {
            return;
        }

        *handle.state.lock().await = StreamState::Stopping;
        handle.stop.store(true, Ordering::SeqCst);
        if let Some(task) = handle.task.lock().await.take() {
            task.abort();
        }
        *handle.state.lock().await = StreamState::Idle;

        let mut streams = self.streams.lock().await;
        streams.remove(stream_key);

        let symbol = base_symbol(stream_key).to_string();
        let any_remaining = streams.keys().any(|key| base_symbol(key) == symbol);
        if !any_remaining {
            tracing::debug!(symbol, "last stream for symbol torn down");
        }
    }

    async fn restart_task(&self, stream_key: String, handle: Arc<StreamHandle>, new_config: SessionParams) {
        *handle.state.lock().await = StreamState::Restarting;
        handle.stop.store(true, Ordering::SeqCst);
        if let Some(task) = handle.task.lock().await.take() {
            let _ = task.await;
        }
        handle.stop.store(false, Ordering::SeqCst);
        *handle.active_config.lock().await = Some(new_config);
        self.start_task(stream_key, handle).await;
    }

    async fn start_task(&self, stream_key: String, handle: Arc<StreamHandle>) {
        let exchange = Arc::clone(&self.exchange);
        let order_books = Arc::clone(&self.order_books);
        let stop = Arc::clone(&handle.stop);
        let task_handle = Arc::clone(&handle);

        let join_handle = tokio::spawn(async move {
            *task_handle.state.lock().await = StreamState::Starting;
            run_stream(&stream_key, &task_handle, &exchange, &order_books, &stop).await;
        });

        *handle.task.lock().await = Some(join_handle);
    }

    #[must_use]
    pub async fn stream_state(&self, stream_key: &str) -> Option<StreamState> {
        let streams = self.streams.lock().await;
        match streams.get(stream_key) {
            Some(handle) => Some(*handle.state.lock().await),
            None => None,
        }
    }

    #[must_use]
    pub async fn subscriber_count(&self, stream_key: &str) -> usize {
        let streams = self.streams.lock().await;
        match streams.get(stream_key) {
            Some(handle) => handle.subscribers.lock().await.len(),
            None => 0,
        }
    }

    /// The `BookSource` the orderbook task for `stream_key` actually
    /// resolved to, defaulting to `BookSource::Push` when the stream hasn't
    /// started yet or isn't an orderbook stream.
    #[must_use]
    pub async fn book_source(&self, stream_key: &str) -> BookSource {
        let handle = {
            let streams = self.streams.lock().await;
            streams.get(stream_key).cloned()
        };
        match handle {
            Some(handle) => handle.active_source.lock().await.unwrap_or(BookSource::Push),
            None => BookSource::Push,
        }
    }
}

async fn broadcast(handle: &StreamHandle, event: StreamEvent) {
    let mut subs = handle.subscribers.lock().await;
    subs.retain(|sub| sub.sender.send(event.clone()).is_ok());
}

fn backoff_delay(attempt: usize) -> Duration {
    let idx = attempt.min(BACKOFF_SEQUENCE_SECS.len() - 1);
    Duration::from_secs(BACKOFF_SEQUENCE_SECS[idx])
}

async fn run_stream(
    stream_key: &str,
    handle: &StreamHandle,
    exchange: &Arc<dyn ExchangeDriver>,
    order_books: &Arc<OrderBookManager>,
    stop: &Arc<AtomicBool>,
) {
    let symbol = base_symbol(stream_key).to_string();
    let mut attempt = 0usize;

    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }

        let result = match handle.stream_type {
            StreamType::Orderbook => run_orderbook_stream(&symbol, handle, exchange, order_books, stop).await,
            StreamType::Ticker => run_ticker_stream(&symbol, handle, exchange, stop).await,
            StreamType::Candles => run_candle_stream(stream_key, &symbol, handle, exchange, stop).await,
            StreamType::Liquidation | StreamType::LiquidationVolume => {
                // Owned by the liquidation aggregator, not this manager.
                return;
            }
        };

        if stop.load(Ordering::SeqCst) {
            return;
        }

        match result {
            Ok(()) => {
                attempt = 0;
            }
            Err(err) => {
                *handle.state.lock().await = StreamState::Backoff;
                broadcast(handle, StreamEvent::Error(err.to_string())).await;

                if handle.subscribers.lock().await.is_empty() {
                    return;
                }

                tokio::time::sleep(backoff_delay(attempt)).await;
                attempt += 1;
                *handle.state.lock().await = StreamState::Starting;
            }
        }
    }
}

async fn run_orderbook_stream(
    symbol: &str,
    handle: &StreamHandle,
    exchange: &Arc<dyn ExchangeDriver>,
    order_books: &Arc<OrderBookManager>,
    stop: &Arc<AtomicBool>,
) -> Result<(), mdfanout_core::ServiceError> {
    let use_depth_cache = handle.active_config.lock().await.map(|c| c.use_depth_cache).unwrap_or(true);

    let (mut rx, source) = if use_depth_cache && exchange.supports_depth_cache(symbol).await {
        (exchange.watch_depth_cache(symbol).await?, BookSource::DepthCache)
    } else if exchange.probe(symbol).await {
        (exchange.watch_order_book(symbol).await?, BookSource::Push)
    } else {
        (exchange.watch_order_book(symbol).await?, BookSource::Mock)
    };
    *handle.active_source.lock().await = Some(source);

    *handle.state.lock().await = StreamState::Running;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(50)), if stop.load(Ordering::SeqCst) => {
                return Ok(());
            }
            event = rx.recv() => {
                match event {
                    Some(OrderBookEvent::Snapshot(snapshot)) => {
                        order_books.apply_snapshot(&snapshot);
                        broadcast(handle, StreamEvent::OrderBookTick).await;
                    }
                    Some(OrderBookEvent::Delta { bids, asks, timestamp_ms }) => {
                        order_books.apply_delta(symbol, &bids, &asks, UnixMillis::new(timestamp_ms));
                        broadcast(handle, StreamEvent::OrderBookTick).await;
                    }
                    None => return Err(mdfanout_core::ServiceError::UpstreamTransient(format!("{symbol} order book stream ended"))),
                }
            }
        }
    }
}

async fn run_ticker_stream(
    symbol: &str,
    handle: &StreamHandle,
    exchange: &Arc<dyn ExchangeDriver>,
    stop: &Arc<AtomicBool>,
) -> Result<(), mdfanout_core::ServiceError> {
    let mut rx = exchange.watch_ticker(symbol).await?;
    *handle.state.lock().await = StreamState::Running;

    while !stop.load(Ordering::SeqCst) {
        match rx.recv().await {
            Some(ticker) => broadcast(handle, StreamEvent::Ticker(ticker)).await,
            None => return Err(mdfanout_core::ServiceError::UpstreamTransient(format!("{symbol} ticker stream ended"))),
        }
    }
    Ok(())
}

fn parse_stream_key(stream_key: &str) -> (String, Option<Timeframe>) {
    match stream_key.split_once(':') {
        Some((symbol, raw_timeframe)) => (symbol.to_string(), Timeframe::parse(raw_timeframe)),
        None => (stream_key.to_string(), None),
    }
}

async fn run_candle_stream(
    stream_key: &str,
    symbol: &str,
    handle: &StreamHandle,
    exchange: &Arc<dyn ExchangeDriver>,
    stop: &Arc<AtomicBool>,
) -> Result<(), mdfanout_core::ServiceError> {
    let (_, timeframe) = parse_stream_key(stream_key);
    let timeframe = timeframe.ok_or_else(|| mdfanout_core::ServiceError::ParamInvalid(format!("invalid timeframe in {stream_key}")))?;

    let mut rx = exchange.watch_ohlcv(symbol, timeframe).await?;
    *handle.state.lock().await = StreamState::Running;

    // Only the most recent candle per update burst is forwarded: drain
    // anything already queued before broadcasting.
    while !stop.load(Ordering::SeqCst) {
        let Some(mut latest) = rx.recv().await else {
            return Err(mdfanout_core::ServiceError::UpstreamTransient(format!("{symbol} candle stream ended")));
        };
        while let Ok(next) = rx.try_recv() {
            latest = next;
        }
        broadcast(handle, StreamEvent::Candle(latest)).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_sequence_caps_at_last_entry() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(4), Duration::from_secs(30));
        assert_eq!(backoff_delay(100), Duration::from_secs(30));
    }

    #[test]
    fn base_symbol_strips_timeframe_suffix() {
        assert_eq!(base_symbol("BTCUSDT:1m"), "BTCUSDT");
        assert_eq!(base_symbol("BTCUSDT:ticker"), "BTCUSDT");
        assert_eq!(base_symbol("BTCUSDT"), "BTCUSDT");
    }

    #[test]
    fn parse_stream_key_splits_symbol_and_timeframe() {
        let (symbol, timeframe) = parse_stream_key("BTCUSDT:5m");
        assert_eq!(symbol, "BTCUSDT");
        assert_eq!(timeframe, Some(Timeframe::M5));
    }
}
