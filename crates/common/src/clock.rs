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

//! Real-time and static `Clock` implementations.
//!
//! A trait rather than a bare `UnixMillis::now()` call everywhere so test
//! code can substitute a [`StaticClock`] and assert exact timing behavior
//! (full-snapshot intervals, batcher delays, cache TTLs) deterministically.

use std::sync::atomic::{AtomicU64, Ordering};

use mdfanout_core::time::UnixMillis;

/// Returns the current time; implementations must be `Send + Sync` so a
/// single clock instance can be shared across every tokio task.
pub trait Clock: Send + Sync {
    fn now(&self) -> UnixMillis;
}

/// The production clock: reads the OS wall-clock on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> UnixMillis {
        UnixMillis::now()
    }
}

/// A deterministic clock for tests: starts at a fixed time and only advances
/// when told to via [`StaticClock::advance`].
#[derive(Debug, Default)]
pub struct StaticClock {
    millis: AtomicU64,
}

impl StaticClock {
    #[must_use]
    pub fn new(start: UnixMillis) -> Self {
        Self { millis: AtomicU64::new(start.as_u64()) }
    }

    pub fn advance(&self, by_millis: u64) {
        self.millis.fetch_add(by_millis, Ordering::SeqCst);
    }

    pub fn set(&self, to: UnixMillis) {
        self.millis.store(to.as_u64(), Ordering::SeqCst);
    }
}

impl Clock for StaticClock {
    fn now(&self) -> UnixMillis {
        UnixMillis::new(self.millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_clock_advances_deterministically() {
        let clock = StaticClock::new(UnixMillis::new(1_000));
        assert_eq!(clock.now().as_u64(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now().as_u64(), 1_500);
    }
}
