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

//! A `UnixMillis` type for working with timestamps in milliseconds since the UNIX epoch.
//!
//! The wider ecosystem this service was built from favors nanosecond-precision
//! timestamps; this service only ever needs millisecond precision (exchange
//! feeds, HHMMSS formatting, bucket math) so the type stays in milliseconds
//! rather than carrying unused precision.

use std::{
    fmt::Display,
    ops::{Add, Sub},
    time::{SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a timestamp in milliseconds since the UNIX epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixMillis(u64);

impl UnixMillis {
    #[must_use]
    pub const fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let dur = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(dur.as_millis() as u64)
    }

    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0 as i64
    }

    #[must_use]
    pub const fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    #[must_use]
    pub const fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Returns the duration in seconds since this timestamp, relative to `now`.
    #[must_use]
    pub fn elapsed_secs(&self, now: Self) -> f64 {
        now.as_secs_f64() - self.as_secs_f64()
    }

    /// Converts to a UTC datetime, for formatting. Returns `None` on out-of-range values.
    #[must_use]
    pub fn to_datetime_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0 as i64)
    }

    /// Formats as `HH:MM:SS`, returning the literal string `"Invalid"` on failure.
    ///
    /// Never panics: this is used directly in outbound wire messages where a
    /// formatting failure must degrade gracefully rather than drop the connection.
    #[must_use]
    pub fn to_hhmmss(&self) -> String {
        match self.to_datetime_utc() {
            Some(dt) => dt.format("%H:%M:%S").to_string(),
            None => "Invalid".to_string(),
        }
    }
}

impl Display for UnixMillis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnixMillis {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UnixMillis> for u64 {
    fn from(value: UnixMillis) -> Self {
        value.0
    }
}

impl Add<u64> for UnixMillis {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub for UnixMillis {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 as i64 - rhs.0 as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hhmmss_formats_epoch() {
        assert_eq!(UnixMillis::new(0).to_hhmmss(), "00:00:00");
    }

    #[test]
    fn now_is_increasing() {
        let a = UnixMillis::now();
        let b = UnixMillis::now();
        assert!(b >= a);
    }

    #[test]
    fn elapsed_secs_computes_difference() {
        let a = UnixMillis::new(1_000);
        let b = UnixMillis::new(3_500);
        assert!((a.elapsed_secs(b) - 2.5).abs() < 1e-9);
    }
}
