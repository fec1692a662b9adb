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

//! The batcher (L7): coalesces rapid per-subscriber updates within a bounded
//! window before handing them to a send callback.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use mdfanout_core::UnixMillis;
use tokio::sync::Mutex;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;
pub const DEFAULT_MAX_BATCH_DELAY_MS: u64 = 100;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 500;

#[derive(Clone, Copy, Debug)]
pub struct BatcherConfig {
    pub max_batch_size: usize,
    pub max_batch_delay_ms: u64,
    pub max_queue_size: usize,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_batch_delay_ms: DEFAULT_MAX_BATCH_DELAY_MS,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatcherStats {
    pub queued: usize,
    pub dropped_overflow: u64,
    pub flushes: u64,
    pub average_batch_size: f64,
}

struct QueueState<T> {
    pending: VecDeque<T>,
    dropped_overflow: u64,
    flushes: u64,
    batch_size_sum: u64,
    updated_at: UnixMillis,
    flush_generation: u64,
}

impl<T> QueueState<T> {
    fn new() -> Self {
        Self { pending: VecDeque::new(), dropped_overflow: 0, flushes: 0, batch_size_sum: 0, updated_at: UnixMillis::now(), flush_generation: 0 }
    }
}

/// A per-subscriber FIFO queue of updates, flushed to a send callback either
/// once it reaches `max_batch_size` or after `max_batch_delay_ms` of
/// inactivity, whichever comes first.
///
/// `T` is the wire payload type (e.g. a serialized frame or a delta
/// message); the batcher is payload-agnostic.
pub struct Batcher<T: Send + 'static> {
    config: BatcherConfig,
    queues: Mutex<HashMap<String, QueueState<T>>>,
    send: Arc<dyn Fn(String, Vec<T>) + Send + Sync>,
}

impl<T: Send + 'static> Batcher<T> {
    #[must_use]
    pub fn new(config: BatcherConfig, send: Arc<dyn Fn(String, Vec<T>) + Send + Sync>) -> Arc<Self> {
        Arc::new(Self { config, queues: Mutex::new(HashMap::new()), send })
    }

    /// Enqueues `item` for `connection_id`, dropping the oldest queued item
    /// on overflow, and (re)schedules a flush timer.
    pub async fn push(self: &Arc<Self>, connection_id: &str, item: T) {
        let should_flush_now = {
            let mut queues = self.queues.lock().await;
            let state = queues.entry(connection_id.to_string()).or_insert_with(QueueState::new);
            state.updated_at = UnixMillis::now();

            if state.pending.len() >= self.config.max_queue_size {
                state.pending.pop_front();
                state.dropped_overflow += 1;
            }
            state.pending.push_back(item);
            state.flush_generation += 1;

            state.pending.len() >= self.config.max_batch_size
        };

        if should_flush_now {
            self.flush(connection_id).await;
        } else {
            self.schedule_delayed_flush(connection_id.to_string());
        }
    }

    fn schedule_delayed_flush(self: &Arc<Self>, connection_id: String) {
        let this = Arc::clone(self);
        let delay = Duration::from_millis(self.config.max_batch_delay_ms);
        tokio::spawn(async move {
            let generation = {
                let queues = this.queues.lock().await;
                queues.get(&connection_id).map(|s| s.flush_generation)
            };
            let Some(generation) = generation else { return };
            tokio::time::sleep(delay).await;
            let still_current = {
                let queues = this.queues.lock().await;
                queues.get(&connection_id).is_some_and(|s| s.flush_generation == generation)
            };
            if still_current {
                this.flush(&connection_id).await;
            }
        });
    }

    /// Flushes up to `max_batch_size` pending updates for `connection_id` to
    /// the send callback; reschedules if the queue is still non-empty
    /// afterwards.
    pub async fn flush(self: &Arc<Self>, connection_id: &str) {
        let batch = {
            let mut queues = self.queues.lock().await;
            let Some(state) = queues.get_mut(connection_id) else { return };
            if state.pending.is_empty() {
                return;
            }
            let take = state.pending.len().min(self.config.max_batch_size);
            let batch: Vec<T> = state.pending.drain(..take).collect();
            state.flushes += 1;
            state.batch_size_sum += batch.len() as u64;
            let still_pending = !state.pending.is_empty();
            (batch, still_pending)
        };

        let (batch, still_pending) = batch;
        if batch.is_empty() {
            return;
        }

        let send = Arc::clone(&self.send);
        let conn = connection_id.to_string();
        if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| send(conn, batch))) {
            tracing::warn!(connection_id, ?panic, "batcher send callback failed, dropping batch");
        }

        if still_pending {
            self.schedule_delayed_flush(connection_id.to_string());
        }
    }

    /// Immediately flushes every subscriber (or just `connection_id` when
    /// given), bypassing the delay timer.
    pub async fn force_flush(self: &Arc<Self>, connection_id: Option<&str>) {
        match connection_id {
            Some(id) => self.flush(id).await,
            None => {
                let ids: Vec<String> = self.queues.lock().await.keys().cloned().collect();
                for id in ids {
                    self.flush(&id).await;
                }
            }
        }
    }

    pub async fn unregister(&self, connection_id: &str) {
        self.queues.lock().await.remove(connection_id);
    }

    /// Drops queues untouched for longer than `max_age`.
    pub async fn sweep_stale(&self, max_age: Duration) -> usize {
        let now = UnixMillis::now();
        let max_age_ms = max_age.as_millis() as u64;
        let mut queues = self.queues.lock().await;
        let before = queues.len();
        queues.retain(|_, state| now.as_u64().saturating_sub(state.updated_at.as_u64()) <= max_age_ms);
        before - queues.len()
    }

    pub async fn stats(&self, connection_id: &str) -> Option<BatcherStats> {
        let queues = self.queues.lock().await;
        queues.get(connection_id).map(|state| BatcherStats {
            queued: state.pending.len(),
            dropped_overflow: state.dropped_overflow,
            flushes: state.flushes,
            average_batch_size: if state.flushes == 0 { 0.0 } else { state.batch_size_sum as f64 / state.flushes as f64 },
        })
    }
}

/// Spawns a background task that periodically sweeps stale queues and logs
/// aggregate stats; returns a handle to stop it by dropping the returned
/// receiver's sender side (abort on drop of the `JoinHandle` is sufficient).
pub fn spawn_maintenance<T: Send + 'static>(
    batcher: Arc<Batcher<T>>,
    sweep_interval: Duration,
    max_age: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            let removed = batcher.sweep_stale(max_age).await;
            if removed > 0 {
                tracing::debug!(removed, "batcher sweep dropped stale queues");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn capturing_send() -> (Arc<dyn Fn(String, Vec<u32>) + Send + Sync>, Arc<std::sync::Mutex<Vec<(String, Vec<u32>)>>>) {
        let captured = Arc::new(std::sync::Mutex::new(Vec::new()));
        let captured_clone = Arc::clone(&captured);
        let send: Arc<dyn Fn(String, Vec<u32>) + Send + Sync> = Arc::new(move |conn, batch| {
            captured_clone.lock().unwrap().push((conn, batch));
        });
        (send, captured)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn flushes_immediately_when_batch_size_reached() {
        let (send, captured) = capturing_send();
        let batcher = Batcher::new(BatcherConfig { max_batch_size: 2, max_batch_delay_ms: 10_000, max_queue_size: 100 }, send);
        batcher.push("conn-1", 1).await;
        batcher.push("conn-1", 2).await;
        assert_eq!(captured.lock().unwrap().len(), 1);
        assert_eq!(captured.lock().unwrap()[0].1, vec![1, 2]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn flushes_after_delay_when_under_batch_size() {
        let (send, captured) = capturing_send();
        let batcher = Batcher::new(BatcherConfig { max_batch_size: 10, max_batch_delay_ms: 20, max_queue_size: 100 }, send);
        batcher.push("conn-1", 1).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(captured.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overflow_drops_oldest_and_counts_it() {
        let (send, _captured) = capturing_send();
        let batcher = Batcher::new(BatcherConfig { max_batch_size: 100, max_batch_delay_ms: 10_000, max_queue_size: 2 }, send);
        batcher.push("conn-1", 1).await;
        batcher.push("conn-1", 2).await;
        batcher.push("conn-1", 3).await;
        let stats = batcher.stats("conn-1").await.unwrap();
        assert_eq!(stats.dropped_overflow, 1);
        assert_eq!(stats.queued, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn force_flush_bypasses_delay() {
        let (send, captured) = capturing_send();
        let batcher = Batcher::new(BatcherConfig { max_batch_size: 100, max_batch_delay_ms: 10_000, max_queue_size: 100 }, send);
        batcher.push("conn-1", 1).await;
        batcher.force_flush(Some("conn-1")).await;
        assert_eq!(captured.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unregister_drops_queue_state() {
        let (send, _captured) = capturing_send();
        let batcher = Batcher::new(BatcherConfig::default(), send);
        batcher.push("conn-1", 1).await;
        batcher.unregister("conn-1").await;
        assert!(batcher.stats("conn-1").await.is_none());
    }
}
