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

//! The liquidation aggregator (L10): one upstream forced-order task per
//! symbol shared by every raw/volume callback, plus per-`(symbol, timeframe)`
//! time-bucketed volume rollups.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use mdfanout_common::cache::TtlLruCache;
use mdfanout_core::ServiceError;
use mdfanout_model::{LiquidationEvent, LiquidationVolumeBucket, LiquidationVolumePoint, Timeframe};
use tokio::sync::{Mutex, mpsc};

use crate::exchange::ExchangeDriver;

/// History queries are cached under this key for 60 s, per spec.
const HISTORY_CACHE_TTL: Duration = Duration::from_secs(60);
const HISTORY_CACHE_SIZE: usize = 256;
const MAX_ROLLUP_INTERVAL: Duration = Duration::from_secs(5);

type SubscriberId = u64;

struct BufferedEvent {
    event_time_ms: u64,
    side: mdfanout_model::LiquidationSide,
    value: f64,
}

struct TimeframeState {
    buffer: VecDeque<BufferedEvent>,
    subscribers: Vec<(SubscriberId, mpsc::UnboundedSender<Vec<LiquidationVolumePoint>>)>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TimeframeState {
    fn new() -> Self {
        Self { buffer: VecDeque::new(), subscribers: Vec::new(), task: None }
    }
}

struct SymbolState {
    raw_subscribers: Vec<(SubscriberId, mpsc::UnboundedSender<LiquidationEvent>)>,
    timeframes: HashMap<Timeframe, Arc<Mutex<TimeframeState>>>,
    upstream_task: Option<tokio::task::JoinHandle<()>>,
    stop: Arc<std::sync::atomic::AtomicBool>,
}

impl SymbolState {
    fn new(stop: Arc<std::sync::atomic::AtomicBool>) -> Self {
        Self { raw_subscribers: Vec::new(), timeframes: HashMap::new(), upstream_task: None, stop }
    }

    fn ref_count(&self) -> usize {
        self.raw_subscribers.len() + self.timeframes.values().map(|_| 1).sum::<usize>()
    }
}

type HistoryCacheKey = (String, Timeframe, u64, u64);

pub struct LiquidationAggregator {
    exchange: Arc<dyn ExchangeDriver>,
    symbols: Mutex<HashMap<String, Arc<Mutex<SymbolState>>>>,
    history_cache: TtlLruCache<HistoryCacheKey, Vec<LiquidationVolumePoint>>,
    next_subscriber_id: AtomicU64,
}

impl LiquidationAggregator {
    #[must_use]
    pub fn new(exchange: Arc<dyn ExchangeDriver>) -> Self {
        Self {
            exchange,
            symbols: Mutex::new(HashMap::new()),
            history_cache: TtlLruCache::new(HISTORY_CACHE_SIZE, HISTORY_CACHE_TTL),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    async fn symbol_entry(&self, symbol: &str) -> Arc<Mutex<SymbolState>> {
        let mut symbols = self.symbols.lock().await;
        Arc::clone(
            symbols
                .entry(symbol.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(SymbolState::new(Arc::new(std::sync::atomic::AtomicBool::new(false)))))),
        )
    }

    /// Subscribes to raw normalized liquidation events for `symbol`,
    /// starting the shared upstream task if this is the first callback.
    pub async fn subscribe_events(&self, symbol: &str) -> (SubscriberId, mpsc::UnboundedReceiver<LiquidationEvent>) {
        let entry = self.symbol_entry(symbol).await;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);

        let mut state = entry.lock().await;
        state.raw_subscribers.push((id, tx));
        if state.upstream_task.is_none() {
            self.start_upstream_task(symbol.to_string(), Arc::clone(&entry), &mut state);
        }
        drop(state);

        (id, rx)
    }

    pub async fn unsubscribe_events(&self, symbol: &str, id: SubscriberId) {
        let entry = self.symbol_entry(symbol).await;
        let mut state = entry.lock().await;
        state.raw_subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.maybe_stop_upstream(symbol, &mut state);
    }

    /// Subscribes to time-bucketed volume rollups for `(symbol, timeframe)`,
    /// which must be one of the valid liquidation-volume timeframes.
    pub async fn subscribe_volume(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<(SubscriberId, mpsc::UnboundedReceiver<Vec<LiquidationVolumePoint>>), ServiceError> {
        let tf_ms = timeframe
            .liquidation_timeframe_millis()
            .ok_or_else(|| ServiceError::ParamInvalid(format!("{timeframe} is not a valid liquidation-volume timeframe")))?;

        let entry = self.symbol_entry(symbol).await;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);

        let mut state = entry.lock().await;
        let is_new_timeframe = !state.timeframes.contains_key(&timeframe);
        let tf_state = Arc::clone(state.timeframes.entry(timeframe).or_insert_with(|| Arc::new(Mutex::new(TimeframeState::new()))));
        tf_state.lock().await.subscribers.push((id, tx));

        if state.upstream_task.is_none() {
            self.start_upstream_task(symbol.to_string(), Arc::clone(&entry), &mut state);
        }
        if is_new_timeframe {
            self.start_rollup_task(symbol.to_string(), timeframe, tf_ms, tf_state);
        }
        drop(state);

        Ok((id, rx))
    }

    pub async fn unsubscribe_volume(&self, symbol: &str, timeframe: Timeframe, id: SubscriberId) {
        let entry = self.symbol_entry(symbol).await;
        let mut state = entry.lock().await;
        if let Some(tf_state) = state.timeframes.get(&timeframe) {
            let mut tf = tf_state.lock().await;
            tf.subscribers.retain(|(sub_id, _)| *sub_id != id);
            let now_empty = tf.subscribers.is_empty();
            if now_empty {
                if let Some(task) = tf.task.take() {
                    task.abort();
                }
            }
            drop(tf);
            if now_empty {
                state.timeframes.remove(&timeframe);
            }
        }
        self.maybe_stop_upstream(symbol, &mut state);
    }

    fn maybe_stop_upstream(&self, symbol: &str, state: &mut SymbolState) {
        if state.ref_count() == 0 {
            state.stop.store(true, Ordering::SeqCst);
            if let Some(task) = state.upstream_task.take() {
                task.abort();
            }
            let symbols = Arc::clone(&self.symbols);
            let symbol = symbol.to_string();
            tokio::spawn(async move {
                symbols.lock().await.remove(&symbol);
            });
        }
    }

    fn start_upstream_task(&self, symbol: String, entry: Arc<Mutex<SymbolState>>, state: &mut SymbolState) {
        let exchange = Arc::clone(&self.exchange);
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        state.stop = Arc::clone(&stop);

        let task = tokio::spawn(async move {
            loop {
                if stop.load(Ordering::SeqCst) {
                    return;
                }
                let mut rx = match exchange.forced_order_stream(&symbol).await {
                    Ok(rx) => rx,
                    Err(err) => {
                        tracing::warn!(symbol, error = %err, "failed to start forced-order stream, retrying");
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                };

                loop {
                    if stop.load(Ordering::SeqCst) {
                        return;
                    }
                    match rx.recv().await {
                        Some(event) => {
                            let mut state = entry.lock().await;
                            state.raw_subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
                            for tf_state in state.timeframes.values() {
                                let tf_ms_event = event.event_time_ms;
                                let tf_state = Arc::clone(tf_state);
                                let event = event.clone();
                                tokio::spawn(async move {
                                    let mut tf = tf_state.lock().await;
                                    tf.buffer.push_back(BufferedEvent { event_time_ms: tf_ms_event, side: event.side, value: event.value });
                                });
                            }
                        }
                        None => {
                            tracing::warn!(symbol, "forced-order stream ended, reconnecting");
                            break;
                        }
                    }
                }
                if !stop.load(Ordering::SeqCst) {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        });

        state.upstream_task = Some(task);
    }

    fn start_rollup_task(&self, symbol: String, timeframe: Timeframe, tf_ms: u64, tf_state: Arc<Mutex<TimeframeState>>) {
        let interval = Duration::from_secs(tf_ms / 1000).min(MAX_ROLLUP_INTERVAL).max(Duration::from_millis(100));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let points = {
                    let mut tf = tf_state.lock().await;
                    if tf.subscribers.is_empty() {
                        return;
                    }
                    roll_up(&mut tf.buffer, tf_ms)
                };

                let mut tf = tf_state.lock().await;
                tf.subscribers.retain(|(_, tx)| tx.send(points.clone()).is_ok());
                if tf.subscribers.is_empty() {
                    return;
                }
                let _ = symbol.as_str();
                let _ = timeframe;
            }
        });

        tokio::spawn({
            let tf_state = Arc::clone(&tf_state);
            async move {
                tf_state.lock().await.task = Some(task);
            }
        });
    }

    /// Queries historical forced-liquidation events and reduces them to the
    /// same bucketed shape the live rollup emits, cached by
    /// `(symbol, timeframe, start, end)` for 60 s.
    pub async fn backfill(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start_ms: u64,
        end_ms: u64,
        limit: usize,
    ) -> Result<Vec<LiquidationVolumePoint>, ServiceError> {
        let tf_ms = timeframe
            .liquidation_timeframe_millis()
            .ok_or_else(|| ServiceError::ParamInvalid(format!("{timeframe} is not a valid liquidation-volume timeframe")))?;

        let key = (symbol.to_string(), timeframe, start_ms, end_ms);
        if let Some(cached) = self.history_cache.get(&key) {
            return Ok(cached);
        }

        let events = self.exchange.fetch_liquidation_history(symbol, start_ms, end_ms, limit).await?;
        let mut buckets: BTreeMap<u64, LiquidationVolumeBucket> = BTreeMap::new();
        for event in events {
            let bucket_start = (event.event_time_ms / tf_ms) * tf_ms;
            let bucket = buckets.entry(bucket_start).or_insert(LiquidationVolumeBucket { bucket_start_ms: bucket_start, ..Default::default() });
            bucket.fold(event.side, event.value);
        }
        let points: Vec<LiquidationVolumePoint> = buckets.into_values().map(LiquidationVolumePoint::from).collect();

        self.history_cache.insert(key, points.clone());
        Ok(points)
    }
}

/// Folds buffered events into `(symbol, timeframe)` buckets covering the
/// current and immediately preceding bucket, discarding anything older, and
/// returns the sorted rollup points.
fn roll_up(buffer: &mut VecDeque<BufferedEvent>, tf_ms: u64) -> Vec<LiquidationVolumePoint> {
    let now_ms = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0);
    let current_bucket = (now_ms / tf_ms) * tf_ms;
    let floor = current_bucket.saturating_sub(tf_ms);

    buffer.retain(|event| {
        let bucket_start = (event.event_time_ms / tf_ms) * tf_ms;
        bucket_start >= floor
    });

    let mut buckets: BTreeMap<u64, LiquidationVolumeBucket> = BTreeMap::new();
    for event in buffer.iter() {
        let bucket_start = (event.event_time_ms / tf_ms) * tf_ms;
        let bucket = buckets.entry(bucket_start).or_insert(LiquidationVolumeBucket { bucket_start_ms: bucket_start, ..Default::default() });
        bucket.fold(event.side, event.value);
    }

    buckets.into_values().map(LiquidationVolumePoint::from).collect()
}
