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

//! Counter/gauge/histogram/timer primitives and a registry, backing the
//! monitoring layer that samples process and system health on an interval.

use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicI64, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use dashmap::DashMap;
use sysinfo::System;

/// A monotonically increasing counter, e.g. "messages sent".
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// An instantaneous value that can move up or down, e.g. "active
/// subscribers".
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Upper bounds of the fixed histogram buckets, covering sub-millisecond
/// timers up to batch sizes in the low thousands. The final implicit bucket
/// catches anything above the last bound.
const BUCKET_BOUNDS: &[f64] =
    &[0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0];

/// A bounded set of observed values with min/max/mean/count plus p50/p90/p99
/// estimated from fixed buckets. Not a full quantile sketch (no interpolation
/// within a bucket); good enough for a service at this scale.
#[derive(Debug)]
pub struct Histogram {
    inner: Mutex<HistogramInner>,
}

#[derive(Debug)]
struct HistogramInner {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    // One counter per `BUCKET_BOUNDS` entry plus a trailing overflow bucket.
    buckets: Vec<u64>,
}

impl Default for HistogramInner {
    fn default() -> Self {
        Self { count: 0, sum: 0.0, min: f64::MAX, max: f64::MIN, buckets: vec![0; BUCKET_BOUNDS.len() + 1] }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self { inner: Mutex::new(HistogramInner::default()) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
}

impl HistogramInner {
    /// The smallest bucket upper bound whose cumulative count reaches the
    /// `p`-th percentile (`p` in `0.0..=1.0`), clamped to `max` for the
    /// overflow bucket.
    fn percentile(&self, p: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let target = ((p * self.count as f64).ceil() as u64).clamp(1, self.count);
        let mut cumulative = 0u64;
        for (i, &bucket_count) in self.buckets.iter().enumerate() {
            cumulative += bucket_count;
            if cumulative >= target {
                return BUCKET_BOUNDS.get(i).copied().unwrap_or(self.max);
            }
        }
        self.max
    }
}

impl Histogram {
    pub fn record(&self, value: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.count += 1;
        inner.sum += value;
        inner.min = inner.min.min(value);
        inner.max = inner.max.max(value);
        let bucket = BUCKET_BOUNDS.iter().position(|&bound| value <= bound).unwrap_or(BUCKET_BOUNDS.len());
        inner.buckets[bucket] += 1;
    }

    #[must_use]
    pub fn snapshot(&self) -> HistogramSnapshot {
        let inner = self.inner.lock().unwrap();
        if inner.count == 0 {
            return HistogramSnapshot::default();
        }
        HistogramSnapshot {
            count: inner.count,
            mean: inner.sum / inner.count as f64,
            min: inner.min,
            max: inner.max,
            p50: inner.percentile(0.50),
            p90: inner.percentile(0.90),
            p99: inner.percentile(0.99),
        }
    }
}

/// A histogram specialized for wall-clock durations, recorded in seconds.
#[derive(Debug, Default)]
pub struct Timer {
    histogram: Histogram,
}

impl Timer {
    #[must_use]
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard { timer: self, started_at: Instant::now() }
    }

    pub fn record_secs(&self, secs: f64) {
        self.histogram.record(secs);
    }

    #[must_use]
    pub fn snapshot(&self) -> HistogramSnapshot {
        self.histogram.snapshot()
    }
}

/// Records elapsed time to its parent [`Timer`] when dropped.
pub struct TimerGuard<'a> {
    timer: &'a Timer,
    started_at: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record_secs(self.started_at.elapsed().as_secs_f64());
    }
}

type LabelSet = Vec<(&'static str, String)>;

fn metric_key(name: &str, labels: &LabelSet) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let mut sorted = labels.clone();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}{{{joined}}}")
}

/// Central registry of named counters/gauges/histograms/timers, keyed by
/// name plus an optional sorted label set.
#[derive(Default)]
pub struct Registry {
    counters: DashMap<String, std::sync::Arc<Counter>>,
    gauges: DashMap<String, std::sync::Arc<Gauge>>,
    histograms: DashMap<String, std::sync::Arc<Histogram>>,
    timers: DashMap<String, std::sync::Arc<Timer>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> std::sync::Arc<Counter> {
        self.counter_with_labels(name, &[])
    }

    #[must_use]
    pub fn counter_with_labels(&self, name: &str, labels: &LabelSet) -> std::sync::Arc<Counter> {
        let key = metric_key(name, labels);
        self.counters.entry(key).or_default().clone()
    }

    #[must_use]
    pub fn gauge(&self, name: &str) -> std::sync::Arc<Gauge> {
        self.gauges.entry(name.to_string()).or_default().clone()
    }

    #[must_use]
    pub fn histogram(&self, name: &str) -> std::sync::Arc<Histogram> {
        self.histograms.entry(name.to_string()).or_default().clone()
    }

    #[must_use]
    pub fn timer(&self, name: &str) -> std::sync::Arc<Timer> {
        self.timers.entry(name.to_string()).or_default().clone()
    }

    /// A point-in-time view of every registered metric, suitable for a
    /// `/metrics`-shaped response.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut counters = BTreeMap::new();
        for entry in self.counters.iter() {
            counters.insert(entry.key().clone(), entry.value().get());
        }
        let mut gauges = BTreeMap::new();
        for entry in self.gauges.iter() {
            gauges.insert(entry.key().clone(), entry.value().get());
        }
        let mut histograms = BTreeMap::new();
        for entry in self.histograms.iter() {
            histograms.insert(entry.key().clone(), entry.value().snapshot());
        }
        for entry in self.timers.iter() {
            histograms.insert(entry.key().clone(), entry.value().snapshot());
        }
        MetricsSnapshot { counters, gauges, histograms }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, i64>,
    pub histograms: BTreeMap<String, HistogramSnapshot>,
}

impl serde::Serialize for HistogramSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("HistogramSnapshot", 7)?;
        s.serialize_field("count", &self.count)?;
        s.serialize_field("mean", &self.mean)?;
        s.serialize_field("min", &self.min)?;
        s.serialize_field("max", &self.max)?;
        s.serialize_field("p50", &self.p50)?;
        s.serialize_field("p90", &self.p90)?;
        s.serialize_field("p99", &self.p99)?;
        s.end()
    }
}

/// A threshold watch over a single gauge or counter, logging a `tracing`
/// warning each time it's breached. Deliberately not a full alerting
/// pipeline: this service has no outbound paging integration.
pub struct Alert {
    name: &'static str,
    threshold: f64,
    last_fired: Mutex<Option<Instant>>,
    cooldown: Duration,
}

impl Alert {
    #[must_use]
    pub fn new(name: &'static str, threshold: f64, cooldown: Duration) -> Self {
        Self { name, threshold, last_fired: Mutex::new(None), cooldown }
    }

    /// Checks `value` against the threshold; logs at most once per cooldown
    /// window.
    pub fn check(&self, value: f64) {
        if value < self.threshold {
            return;
        }
        let mut last_fired = self.last_fired.lock().unwrap();
        let should_fire = match *last_fired {
            Some(at) => at.elapsed() >= self.cooldown,
            None => true,
        };
        if should_fire {
            tracing::warn!(metric = self.name, value, threshold = self.threshold, "alert threshold breached");
            *last_fired = Some(Instant::now());
        }
    }
}

/// CPU alert fires above 90% sustained usage; memory alert above 90% of
/// total system memory.
const CPU_ALERT_THRESHOLD_PERCENT: f64 = 90.0;
const MEMORY_ALERT_THRESHOLD_FRACTION: f64 = 0.90;
const ALERT_COOLDOWN: Duration = Duration::from_secs(300);

/// Periodically samples host CPU and memory usage into a [`Registry`] via
/// `sysinfo`, evaluating the CPU/memory alerts against each sample.
pub struct SystemSampler {
    registry: std::sync::Arc<Registry>,
    interval: Duration,
}

impl SystemSampler {
    #[must_use]
    pub fn new(registry: std::sync::Arc<Registry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Runs until the returned future is dropped/the task is aborted.
    pub async fn run(self) {
        let mut system = System::new_all();
        let cpu_gauge = self.registry.gauge("system_cpu_percent_x100");
        let mem_gauge = self.registry.gauge("system_memory_used_bytes");
        let cpu_alert = Alert::new("system_cpu_percent", CPU_ALERT_THRESHOLD_PERCENT, ALERT_COOLDOWN);
        let memory_alert = Alert::new("system_memory_fraction", MEMORY_ALERT_THRESHOLD_FRACTION, ALERT_COOLDOWN);
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            system.refresh_cpu_usage();
            system.refresh_memory();
            let cpu_percent = f64::from(system.global_cpu_usage());
            cpu_gauge.set((cpu_percent * 100.0) as i64);
            mem_gauge.set(system.used_memory() as i64);

            cpu_alert.check(cpu_percent);
            let total_memory = system.total_memory();
            if total_memory > 0 {
                let memory_fraction = system.used_memory() as f64 / total_memory as f64;
                memory_alert.check(memory_fraction);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_accumulates() {
        let c = Counter::default();
        c.increment();
        c.add(4);
        assert_eq!(c.get(), 5);
    }

    #[test]
    fn gauge_tracks_latest_value() {
        let g = Gauge::default();
        g.set(10);
        g.decrement();
        assert_eq!(g.get(), 9);
    }

    #[test]
    fn histogram_computes_mean_min_max() {
        let h = Histogram::default();
        h.record(1.0);
        h.record(3.0);
        h.record(2.0);
        let snap = h.snapshot();
        assert_eq!(snap.count, 3);
        assert!((snap.mean - 2.0).abs() < 1e-9);
        assert_eq!(snap.min, 1.0);
        assert_eq!(snap.max, 3.0);
    }

    #[test]
    fn histogram_percentiles_track_the_bucket_distribution() {
        let h = Histogram::default();
        for _ in 0..98 {
            h.record(0.01);
        }
        h.record(0.5);
        h.record(5.0);
        let snap = h.snapshot();
        assert!(snap.p50 <= 0.025);
        assert!(snap.p90 < snap.p99);
        assert!((snap.p99 - 0.5).abs() < 1e-9);
        assert_eq!(snap.max, 5.0);
    }

    #[test]
    fn registry_reuses_same_metric_for_same_name() {
        let registry = Registry::new();
        registry.counter("sent").increment();
        registry.counter("sent").increment();
        assert_eq!(registry.counter("sent").get(), 2);
    }

    #[test]
    fn registry_distinguishes_by_label() {
        let registry = Registry::new();
        registry
            .counter_with_labels("sent", &vec![("symbol", "BTCUSDT".to_string())])
            .increment();
        registry
            .counter_with_labels("sent", &vec![("symbol", "ETHUSDT".to_string())])
            .increment();
        let snap = registry.snapshot();
        assert_eq!(snap.counters.len(), 2);
    }

    #[test]
    fn alert_respects_cooldown() {
        let alert = Alert::new("test_metric", 10.0, Duration::from_secs(60));
        alert.check(5.0); // below threshold, no fire
        alert.check(15.0); // fires
        alert.check(15.0); // within cooldown, suppressed
        // No direct observable here beyond not panicking; cooldown state is
        // exercised via `last_fired`.
        assert!(alert.last_fired.lock().unwrap().is_some());
    }
}
