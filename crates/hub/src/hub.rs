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

//! The Connection Hub (L11): owns subscriber session lifecycle, dispatches
//! per-stream-type registration against the components below it, and pumps
//! the inbound/outbound wire protocol for each accepted socket.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex as StdMutex,
        atomic::{AtomicU64, Ordering},
    },
};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use mdfanout_core::UnixMillis;
use mdfanout_data::OrderBookManager;
use mdfanout_live::{Batcher, BatcherConfig, Compress, DeltaEngine, LiquidationAggregator, StreamEvent, UpstreamStreamManager, WireFormat};
use mdfanout_model::{AggregatedBook, BookLevel, MarketDepthInfo, SessionParams, StreamType, Timeframe};

use crate::{
    symbol_service::SymbolService,
    wire::{InboundMessage, OutboundMessage},
};

/// Number of representative levels used to benchmark the wire format at
/// startup; matches a typical subscriber's requested depth.
const BENCHMARK_DEPTH: usize = 20;
const BENCHMARK_ITERATIONS: usize = 200;

fn representative_sample() -> AggregatedBook {
    let level = |i: usize, side_sign: f64| BookLevel {
        price: 100.0 + side_sign * i as f64,
        amount: 1.5,
        cumulative: 1.5 * (i + 1) as f64,
        price_formatted: None,
        amount_formatted: None,
        cumulative_formatted: None,
    };
    AggregatedBook {
        symbol: "BTCUSDT".into(),
        bids: (0..BENCHMARK_DEPTH).map(|i| level(i, -1.0)).collect(),
        asks: (0..BENCHMARK_DEPTH).map(|i| level(i, 1.0)).collect(),
        timestamp: 0,
        time_formatted: None,
        rounding: 1.0,
        depth: BENCHMARK_DEPTH,
        source: mdfanout_model::BookSource::Push,
        aggregated: true,
        market_depth_info: MarketDepthInfo { requested: BENCHMARK_DEPTH, actual: BENCHMARK_DEPTH, raw_bids: BENCHMARK_DEPTH, raw_asks: BENCHMARK_DEPTH, sufficient: true },
    }
}

/// Encodes `message` with the hub's selected wire format/compression,
/// producing either a text or a binary WebSocket frame.
fn encode_frame(message: &OutboundMessage, selection: (WireFormat, Compress)) -> Option<Message> {
    let (format, compression) = selection;
    match message.encode(format, compression) {
        Ok(bytes) => Some(if format == WireFormat::Text && compression == Compress::None {
            Message::Text(String::from_utf8(bytes).unwrap_or_default().into())
        } else {
            Message::Binary(bytes.into())
        }),
        Err(err) => {
            tracing::warn!(%err, "failed to encode outbound message, dropping frame");
            None
        }
    }
}

/// Everything the Connection Hub needs to serve subscriber sessions, minus
/// the process-wide wiring (config loading, signal handling) that lives in
/// the binary crate.
pub struct ConnectionHub {
    order_books: Arc<OrderBookManager>,
    upstream: Arc<UpstreamStreamManager>,
    liquidation: Arc<LiquidationAggregator>,
    delta: Arc<DeltaEngine>,
    batcher: Arc<Batcher<OutboundMessage>>,
    symbols: Arc<dyn SymbolService>,
    writers: Arc<StdMutex<HashMap<String, tokio::sync::mpsc::UnboundedSender<Message>>>>,
    next_connection_id: AtomicU64,
    selection: (WireFormat, Compress),
}

impl ConnectionHub {
    #[must_use]
    pub fn new(
        order_books: Arc<OrderBookManager>,
        upstream: Arc<UpstreamStreamManager>,
        liquidation: Arc<LiquidationAggregator>,
        delta: Arc<DeltaEngine>,
        batcher_config: BatcherConfig,
        symbols: Arc<dyn SymbolService>,
    ) -> Arc<Self> {
        let selection = match mdfanout_live::benchmark(&representative_sample(), BENCHMARK_ITERATIONS) {
            Ok((best, _all)) => {
                tracing::info!(format = ?best.format, compression = ?best.compression, score = best.score, "selected wire format from startup benchmark");
                (best.format, best.compression)
            }
            Err(err) => {
                tracing::warn!(%err, "wire format benchmark failed, defaulting to text/none");
                (WireFormat::Text, Compress::None)
            }
        };

        let writers: Arc<StdMutex<HashMap<String, tokio::sync::mpsc::UnboundedSender<Message>>>> =
            Arc::new(StdMutex::new(HashMap::new()));
        let writers_for_send = Arc::clone(&writers);
        let send: Arc<dyn Fn(String, Vec<OutboundMessage>) + Send + Sync> = Arc::new(move |connection_id, messages| {
            let writers = writers_for_send.lock().unwrap();
            if let Some(tx) = writers.get(&connection_id) {
                for message in &messages {
                    let Some(frame) = encode_frame(message, selection) else { continue };
                    if tx.send(frame).is_err() {
                        break;
                    }
                }
            }
        });

        Arc::new(Self {
            order_books,
            upstream,
            liquidation,
            delta,
            batcher: Batcher::new(batcher_config, send),
            symbols,
            writers,
            next_connection_id: AtomicU64::new(1),
            selection,
        })
    }

    /// Encodes and sends `message` directly to `socket`'s sender half,
    /// bypassing the batcher for one-shot messages sent before a session is
    /// registered (rejections, invalid-parameter closes).
    async fn send_direct(&self, sender: &mut futures_util::stream::SplitSink<WebSocket, Message>, message: &OutboundMessage) {
        if let Some(frame) = encode_frame(message, self.selection) {
            let _ = sender.send(frame).await;
        }
    }

    fn allocate_connection_id(&self, prefix: &str) -> String {
        let n = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{n}")
    }

    fn register_writer(&self, connection_id: &str, tx: tokio::sync::mpsc::UnboundedSender<Message>) {
        self.writers.lock().unwrap().insert(connection_id.to_string(), tx);
    }

    fn unregister_writer(&self, connection_id: &str) {
        self.writers.lock().unwrap().remove(connection_id);
    }

    async fn rounding_options(&self, symbol: &str) -> Vec<f64> {
        self.symbols.info(symbol).await.map(|info| info.rounding_options).unwrap_or_default()
    }

    /// Sends a single `error` frame then closes the socket without ever
    /// registering session state, for a symbol that failed to resolve.
    async fn reject_unknown_symbol(&self, socket: WebSocket, symbol_id: &str) {
        let suggestions = self.symbols.suggestions(symbol_id, 3).await;
        let message = if suggestions.is_empty() {
            format!("unknown symbol '{symbol_id}'")
        } else {
            format!("unknown symbol '{symbol_id}'; did you mean: {}", suggestions.join(", "))
        };
        let (mut sender, _receiver) = socket.split();
        self.send_direct(&mut sender, &OutboundMessage::Error { message }).await;
        let _ = sender.close().await;
    }

    async fn push_full_orderbook(&self, connection_id: &str, symbol: &str, rounding_options: &[f64]) {
        let source = self.upstream.book_source(symbol).await;
        if let Some(book) = self.order_books.get_aggregated(connection_id, source) {
            self.batcher.push(connection_id, OutboundMessage::orderbook_update(&book, rounding_options.to_vec())).await;
        }
    }

    async fn push_orderbook_diff(&self, connection_id: &str, symbol: &str) {
        let source = self.upstream.book_source(symbol).await;
        if let Some(book) = self.order_books.get_aggregated(connection_id, source) {
            if let Some(diff) = self.delta.diff(connection_id, &book) {
                self.batcher.push(connection_id, OutboundMessage::orderbook_diff(diff)).await;
            }
        }
    }

    /// Serves a `orderbook` stream session end to end.
    pub async fn serve_orderbook(self: Arc<Self>, socket: WebSocket, symbol_id: String, depth: usize, rounding: f64) {
        let Some(symbol) = self.symbols.resolve(&symbol_id).await else {
            self.reject_unknown_symbol(socket, &symbol_id).await;
            return;
        };

        let connection_id = self.allocate_connection_id("orderbook");
        let rounding_options = self.rounding_options(&symbol).await;
        self.order_books.register(connection_id.clone(), &symbol, depth, rounding);
        let (subscriber_id, mut stream_rx) =
            self.upstream.connect(&symbol, StreamType::Orderbook, SessionParams::clamped(depth, rounding)).await;

        let (mut ws_sender, mut ws_receiver) = socket.split();
        let (writer_tx, mut writer_rx) = tokio::sync::mpsc::unbounded_channel();
        self.register_writer(&connection_id, writer_tx);

        let writer_task = tokio::spawn(async move {
            while let Some(msg) = writer_rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        self.push_full_orderbook(&connection_id, &symbol, &rounding_options).await;

        let hub = Arc::clone(&self);
        let forward_conn = connection_id.clone();
        let forward_symbol = symbol.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(event) = stream_rx.recv().await {
                match event {
                    StreamEvent::OrderBookTick => hub.push_orderbook_diff(&forward_conn, &forward_symbol).await,
                    StreamEvent::Error(message) => {
                        hub.batcher.push(&forward_conn, OutboundMessage::Error { message }).await;
                    }
                    StreamEvent::Ticker(_) | StreamEvent::Candle(_) => {}
                }
            }
        });

        while let Some(incoming) = ws_receiver.next().await {
            match incoming {
                Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(InboundMessage::Ping) => {
                        self.batcher.push(&connection_id, OutboundMessage::Pong).await;
                    }
                    Ok(InboundMessage::UpdateParams { depth, rounding }) => {
                        self.order_books.update_params(&connection_id, depth, rounding);
                        let source = self.upstream.book_source(&symbol).await;
                        if let Some(book) = self.order_books.get_aggregated(&connection_id, source) {
                            let ack = OutboundMessage::ParamsUpdated { depth: book.depth, rounding: book.rounding, success: true };
                            self.batcher.push(&connection_id, ack).await;
                            self.batcher
                                .push(&connection_id, OutboundMessage::orderbook_update(&book, rounding_options.clone()))
                                .await;
                        }
                    }
                    Err(err) => tracing::debug!(connection_id, %err, "ignoring malformed inbound message"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(connection_id, %err, "websocket receive error");
                    break;
                }
            }
        }

        forward_task.abort();
        self.order_books.unregister(&connection_id);
        self.upstream.disconnect(&symbol, subscriber_id).await;
        self.delta.unregister(&connection_id);
        self.batcher.unregister(&connection_id).await;
        self.unregister_writer(&connection_id);
        writer_task.abort();
    }

    /// Serves a `ticker` stream session end to end.
    pub async fn serve_ticker(self: Arc<Self>, socket: WebSocket, symbol_id: String) {
        let Some(symbol) = self.symbols.resolve(&symbol_id).await else {
            self.reject_unknown_symbol(socket, &symbol_id).await;
            return;
        };

        let connection_id = self.allocate_connection_id("ticker");
        let stream_key = format!("{symbol}:ticker");
        let (subscriber_id, mut stream_rx) =
            self.upstream.connect(&stream_key, StreamType::Ticker, SessionParams::default()).await;

        let (mut ws_sender, mut ws_receiver) = socket.split();
        let (writer_tx, mut writer_rx) = tokio::sync::mpsc::unbounded_channel();
        self.register_writer(&connection_id, writer_tx);

        let writer_task = tokio::spawn(async move {
            while let Some(msg) = writer_rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        let hub = Arc::clone(&self);
        let forward_conn = connection_id.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(event) = stream_rx.recv().await {
                match event {
                    StreamEvent::Ticker(update) => {
                        hub.batcher.push(&forward_conn, OutboundMessage::TickerUpdate(update)).await;
                    }
                    StreamEvent::Error(message) => {
                        hub.batcher.push(&forward_conn, OutboundMessage::Error { message }).await;
                    }
                    StreamEvent::OrderBookTick | StreamEvent::Candle(_) => {}
                }
            }
        });

        while let Some(incoming) = ws_receiver.next().await {
            match incoming {
                Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(InboundMessage::Ping) => {
                        self.batcher.push(&connection_id, OutboundMessage::Pong).await;
                    }
                    Ok(InboundMessage::UpdateParams { .. }) => {
                        let message = "update_params is not supported for ticker streams".to_string();
                        self.batcher.push(&connection_id, OutboundMessage::Error { message }).await;
                    }
                    Err(err) => tracing::debug!(connection_id, %err, "ignoring malformed inbound message"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(connection_id, %err, "websocket receive error");
                    break;
                }
            }
        }

        forward_task.abort();
        self.upstream.disconnect(&stream_key, subscriber_id).await;
        self.batcher.unregister(&connection_id).await;
        self.unregister_writer(&connection_id);
        writer_task.abort();
    }

    /// Serves a `candles` stream session end to end.
    pub async fn serve_candles(self: Arc<Self>, socket: WebSocket, symbol_id: String, timeframe_raw: String) {
        let Some(symbol) = self.symbols.resolve(&symbol_id).await else {
            self.reject_unknown_symbol(socket, &symbol_id).await;
            return;
        };
        let Some(timeframe) = Timeframe::parse(&timeframe_raw) else {
            let message = format!("invalid timeframe '{timeframe_raw}'");
            let (mut sender, _receiver) = socket.split();
            self.send_direct(&mut sender, &OutboundMessage::Error { message }).await;
            let _ = sender.close().await;
            return;
        };

        let connection_id = self.allocate_connection_id("candles");
        let stream_key = format!("{symbol}:{timeframe}");
        let (subscriber_id, mut stream_rx) =
            self.upstream.connect(&stream_key, StreamType::Candles, SessionParams::default()).await;

        let (mut ws_sender, mut ws_receiver) = socket.split();
        let (writer_tx, mut writer_rx) = tokio::sync::mpsc::unbounded_channel();
        self.register_writer(&connection_id, writer_tx);

        let writer_task = tokio::spawn(async move {
            while let Some(msg) = writer_rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        let hub = Arc::clone(&self);
        let forward_conn = connection_id.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(event) = stream_rx.recv().await {
                match event {
                    StreamEvent::Candle(update) => {
                        hub.batcher.push(&forward_conn, OutboundMessage::CandleUpdate(update)).await;
                    }
                    StreamEvent::Error(message) => {
                        hub.batcher.push(&forward_conn, OutboundMessage::Error { message }).await;
                    }
                    StreamEvent::OrderBookTick | StreamEvent::Ticker(_) => {}
                }
            }
        });

        while let Some(incoming) = ws_receiver.next().await {
            match incoming {
                Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(InboundMessage::Ping) => {
                        self.batcher.push(&connection_id, OutboundMessage::Pong).await;
                    }
                    Ok(InboundMessage::UpdateParams { .. }) => {
                        let message = "update_params is not supported for candle streams".to_string();
                        self.batcher.push(&connection_id, OutboundMessage::Error { message }).await;
                    }
                    Err(err) => tracing::debug!(connection_id, %err, "ignoring malformed inbound message"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(connection_id, %err, "websocket receive error");
                    break;
                }
            }
        }

        forward_task.abort();
        self.upstream.disconnect(&stream_key, subscriber_id).await;
        self.batcher.unregister(&connection_id).await;
        self.unregister_writer(&connection_id);
        writer_task.abort();
    }

    /// Serves a raw `liquidations` event stream session end to end.
    pub async fn serve_liquidation_events(self: Arc<Self>, socket: WebSocket, symbol_id: String) {
        let Some(symbol) = self.symbols.resolve(&symbol_id).await else {
            self.reject_unknown_symbol(socket, &symbol_id).await;
            return;
        };

        let connection_id = self.allocate_connection_id("liquidation");
        let (subscriber_id, mut stream_rx) = self.liquidation.subscribe_events(&symbol).await;

        let (mut ws_sender, mut ws_receiver) = socket.split();
        let (writer_tx, mut writer_rx) = tokio::sync::mpsc::unbounded_channel();
        self.register_writer(&connection_id, writer_tx);

        let writer_task = tokio::spawn(async move {
            while let Some(msg) = writer_rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        let hub = Arc::clone(&self);
        let forward_conn = connection_id.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(event) = stream_rx.recv().await {
                hub.batcher.push(&forward_conn, OutboundMessage::LiquidationEvent(event)).await;
            }
        });

        while let Some(incoming) = ws_receiver.next().await {
            match incoming {
                Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(InboundMessage::Ping) => {
                        self.batcher.push(&connection_id, OutboundMessage::Pong).await;
                    }
                    Ok(InboundMessage::UpdateParams { .. }) => {
                        let message = "update_params is not supported for liquidation streams".to_string();
                        self.batcher.push(&connection_id, OutboundMessage::Error { message }).await;
                    }
                    Err(err) => tracing::debug!(connection_id, %err, "ignoring malformed inbound message"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(connection_id, %err, "websocket receive error");
                    break;
                }
            }
        }

        forward_task.abort();
        self.liquidation.unsubscribe_events(&symbol, subscriber_id).await;
        self.batcher.unregister(&connection_id).await;
        self.unregister_writer(&connection_id);
        writer_task.abort();
    }

    /// Serves a `liquidation_volume` rollup stream session end to end.
    /// `since_ms`, when given, is used to prime the session with a single
    /// backfilled batch before live updates start arriving.
    pub async fn serve_liquidation_volume(
        self: Arc<Self>,
        socket: WebSocket,
        symbol_id: String,
        timeframe_raw: String,
        since_ms: Option<u64>,
        backfill_limit: usize,
    ) {
        let Some(symbol) = self.symbols.resolve(&symbol_id).await else {
            self.reject_unknown_symbol(socket, &symbol_id).await;
            return;
        };
        let Some(timeframe) = Timeframe::parse(&timeframe_raw) else {
            let message = format!("invalid timeframe '{timeframe_raw}'");
            let (mut sender, _receiver) = socket.split();
            self.send_direct(&mut sender, &OutboundMessage::Error { message }).await;
            let _ = sender.close().await;
            return;
        };

        let subscription = match self.liquidation.subscribe_volume(&symbol, timeframe).await {
            Ok(subscription) => subscription,
            Err(err) => {
                let (mut sender, _receiver) = socket.split();
                self.send_direct(&mut sender, &OutboundMessage::Error { message: err.to_string() }).await;
                let _ = sender.close().await;
                return;
            }
        };
        let (subscriber_id, mut stream_rx) = subscription;

        let connection_id = self.allocate_connection_id("liquidation-volume");
        let (mut ws_sender, mut ws_receiver) = socket.split();
        let (writer_tx, mut writer_rx) = tokio::sync::mpsc::unbounded_channel();
        self.register_writer(&connection_id, writer_tx);

        let writer_task = tokio::spawn(async move {
            while let Some(msg) = writer_rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        if let Some(since_ms) = since_ms {
            let now_ms = UnixMillis::now().as_u64();
            if let Ok(data) = self.liquidation.backfill(&symbol, timeframe, since_ms, now_ms, backfill_limit).await {
                let message = OutboundMessage::LiquidationVolume { symbol: symbol.clone(), timeframe, data, timestamp: now_ms, is_update: false };
                self.batcher.push(&connection_id, message).await;
            }
        }

        let hub = Arc::clone(&self);
        let forward_conn = connection_id.clone();
        let forward_symbol = symbol.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(data) = stream_rx.recv().await {
                let message = OutboundMessage::LiquidationVolume {
                    symbol: forward_symbol.clone(),
                    timeframe,
                    data,
                    timestamp: UnixMillis::now().as_u64(),
                    is_update: true,
                };
                hub.batcher.push(&forward_conn, message).await;
            }
        });

        while let Some(incoming) = ws_receiver.next().await {
            match incoming {
                Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(InboundMessage::Ping) => {
                        self.batcher.push(&connection_id, OutboundMessage::Pong).await;
                    }
                    Ok(InboundMessage::UpdateParams { .. }) => {
                        let message = "update_params is not supported for liquidation volume streams".to_string();
                        self.batcher.push(&connection_id, OutboundMessage::Error { message }).await;
                    }
                    Err(err) => tracing::debug!(connection_id, %err, "ignoring malformed inbound message"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(connection_id, %err, "websocket receive error");
                    break;
                }
            }
        }

        forward_task.abort();
        self.liquidation.unsubscribe_volume(&symbol, timeframe, subscriber_id).await;
        self.batcher.unregister(&connection_id).await;
        self.unregister_writer(&connection_id);
        writer_task.abort();
    }
}
