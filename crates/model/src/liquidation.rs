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

//! Forced-liquidation event and time-bucketed volume rollup shapes (L10).

use serde::{Deserialize, Serialize};

/// The side of a forced liquidation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidationSide {
    Buy,
    Sell,
}

impl LiquidationSide {
    /// Parses the raw exchange side field (`"BUY"` / `"SELL"`), preserved
    /// verbatim for upstream compatibility.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            _ => None,
        }
    }
}

/// A single normalized forced-liquidation event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub symbol: String,
    pub side: LiquidationSide,
    pub quantity: f64,
    pub avg_price: f64,
    pub value: f64,
    pub event_time_ms: u64,
    pub display_time_hhmmss: String,
    pub base_asset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_price_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_formatted: Option<String>,
}

/// A single `(symbol, timeframe, bucket_start_ms)` volume rollup.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LiquidationVolumeBucket {
    pub bucket_start_ms: u64,
    pub buy_value: f64,
    pub sell_value: f64,
    pub count: u64,
}

impl LiquidationVolumeBucket {
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.buy_value + self.sell_value
    }

    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.buy_value - self.sell_value
    }

    pub fn fold(&mut self, side: LiquidationSide, value: f64) {
        match side {
            LiquidationSide::Buy => self.buy_value += value,
            LiquidationSide::Sell => self.sell_value += value,
        }
        self.count += 1;
    }
}

/// One emitted point of a liquidation-volume rollup series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidationVolumePoint {
    pub time_s: u64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub total_volume: f64,
    pub delta_volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_volume_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_volume_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_volume_formatted: Option<String>,
    pub count: u64,
    pub timestamp_ms: u64,
}

impl From<LiquidationVolumeBucket> for LiquidationVolumePoint {
    fn from(bucket: LiquidationVolumeBucket) -> Self {
        Self {
            time_s: bucket.bucket_start_ms / 1000,
            buy_volume: bucket.buy_value,
            sell_volume: bucket.sell_value,
            total_volume: bucket.total(),
            delta_volume: bucket.delta(),
            buy_volume_formatted: None,
            sell_volume_formatted: None,
            total_volume_formatted: None,
            count: bucket.count,
            timestamp_ms: bucket.bucket_start_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucketing_matches_the_worked_example() {
        // From the spec's literal scenario: timeframe=1m, events at t0=60_000
        // BUY 100, t1=90_000 SELL 40, t2=130_000 BUY 25.
        let tf_ms = 60_000u64;
        let mut buckets: std::collections::BTreeMap<u64, LiquidationVolumeBucket> =
            std::collections::BTreeMap::new();

        for (ts, side, value) in [
            (60_000u64, LiquidationSide::Buy, 100.0),
            (90_000u64, LiquidationSide::Sell, 40.0),
            (130_000u64, LiquidationSide::Buy, 25.0),
        ] {
            let bucket_start = (ts / tf_ms) * tf_ms;
            let bucket = buckets.entry(bucket_start).or_insert(LiquidationVolumeBucket {
                bucket_start_ms: bucket_start,
                ..Default::default()
            });
            bucket.fold(side, value);
        }

        let b0 = buckets.get(&60_000).unwrap();
        assert_eq!(b0.buy_value, 100.0);
        assert_eq!(b0.sell_value, 40.0);
        assert_eq!(b0.total(), 140.0);
        assert_eq!(b0.delta(), 60.0);
        assert_eq!(b0.count, 2);

        let b1 = buckets.get(&120_000).unwrap();
        assert_eq!(b1.buy_value, 25.0);
        assert_eq!(b1.sell_value, 0.0);
        assert_eq!(b1.total(), 25.0);
        assert_eq!(b1.count, 1);
    }

    #[test]
    fn parses_raw_side_field_verbatim() {
        assert_eq!(LiquidationSide::parse("BUY"), Some(LiquidationSide::Buy));
        assert_eq!(LiquidationSide::parse("SELL"), Some(LiquidationSide::Sell));
        assert_eq!(LiquidationSide::parse("buy"), None);
    }
}
