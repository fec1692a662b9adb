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

//! A generic, process-wide TTL + LRU cache.
//!
//! Both the aggregation cache (L3) and the formatter cache (L4) are built on
//! top of this: a single `Mutex`-guarded map keyed by an arbitrary hashable
//! key, evicting by recency once a size cap is hit and by age on a periodic
//! sweep or lazily on lookup.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::Mutex,
    time::{Duration, Instant},
};

use indexmap::IndexMap;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub invalidations: u64,
}

impl CacheStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    access_count: u64,
}

struct Inner<K, V> {
    map: IndexMap<K, Entry<V>>,
    ttl: Duration,
    max_size: usize,
    hits: u64,
    misses: u64,
    invalidations: u64,
}

/// A TTL + LRU cache keyed by `K`, storing values of type `V`.
///
/// Recency is tracked via insertion order in an [`IndexMap`]: a hit moves its
/// entry to the back (most-recently-used); eviction removes from the front.
pub struct TtlLruCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlLruCache<K, V> {
    #[must_use]
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: IndexMap::new(),
                ttl,
                max_size,
                hits: 0,
                misses: 0,
                invalidations: 0,
            }),
        }
    }

    /// Looks up `key`. On a hit, refreshes recency and returns a clone of the
    /// cached value. An entry older than the TTL is treated as a miss and
    /// dropped.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().unwrap();
        let expired = match inner.map.get(key) {
            Some(entry) => entry.inserted_at.elapsed() > inner.ttl,
            None => {
                inner.misses += 1;
                return None;
            }
        };
        if expired {
            inner.map.shift_remove(key);
            inner.misses += 1;
            return None;
        }

        // Move to the back (most-recently-used position).
        let (k, mut entry) = inner.map.shift_remove_entry(key).unwrap();
        entry.access_count += 1;
        let value = entry.value.clone();
        inner.map.insert(k, entry);
        inner.hits += 1;
        Some(value)
    }

    /// Inserts or overwrites `key`, evicting the oldest entry first if the
    /// cache is at capacity.
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock().unwrap();
        if inner.map.len() >= inner.max_size && !inner.map.contains_key(&key) {
            inner.map.shift_remove_index(0);
        }
        inner.map.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
                access_count: 0,
            },
        );
    }

    /// Removes every entry for which `predicate` returns true. Used for
    /// symbol-level invalidation.
    pub fn invalidate_where<F: Fn(&K) -> bool>(&self, predicate: F) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.map.len();
        inner.map.retain(|k, _| !predicate(k));
        let removed = before - inner.map.len();
        inner.invalidations += removed as u64;
        removed
    }

    /// Periodic expiry sweep: removes every entry older than the TTL.
    pub fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let ttl = inner.ttl;
        let before = inner.map.len();
        inner.map.retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
        before - inner.map.len()
    }

    /// Drops the oldest `fraction` (0.0..=1.0) of entries by insertion order.
    pub fn evict_oldest_fraction(&self, fraction: f64) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let to_remove = ((inner.map.len() as f64) * fraction).ceil() as usize;
        for _ in 0..to_remove.min(inner.map.len()) {
            inner.map.shift_remove_index(0);
        }
        to_remove.min(inner.map.len())
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            size: inner.map.len(),
            invalidations: inner.invalidations,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A small, size-capped map with no TTL, used for the second, lower
/// second-resolution collapse cache that sits in front of the main
/// aggregation cache.
pub struct SecondBucketCache<K, V> {
    inner: Mutex<HashMap<K, (V, Instant)>>,
    max_size: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> SecondBucketCache<K, V> {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self { inner: Mutex::new(HashMap::new()), max_size }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    /// Inserts `key`; once `size > max_size` the single oldest entry by
    /// insertion time is dropped.
    pub fn insert(&self, key: K, value: V) {
        let mut map = self.inner.lock().unwrap();
        map.insert(key, (value, Instant::now()));
        if map.len() > self.max_size {
            if let Some(oldest_key) = map
                .iter()
                .min_by_key(|(_, (_, inserted_at))| *inserted_at)
                .map(|(k, _)| k.clone())
            {
                map.remove(&oldest_key);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
