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

//! Shared enumerations used across the fan-out pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The kind of stream a subscriber session is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Orderbook,
    Ticker,
    Candles,
    Liquidation,
    LiquidationVolume,
}

/// The side of a two-sided order book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// Where an order-book update currently being served originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookSource {
    DepthCache,
    Push,
    PartialDepth,
    Mock,
}

/// Candle timeframes accepted for `candles` streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[strum(serialize = "1m")]
    #[serde(rename = "1m")]
    M1,
    #[strum(serialize = "3m")]
    #[serde(rename = "3m")]
    M3,
    #[strum(serialize = "5m")]
    #[serde(rename = "5m")]
    M5,
    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    M15,
    #[strum(serialize = "30m")]
    #[serde(rename = "30m")]
    M30,
    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    H1,
    #[strum(serialize = "2h")]
    #[serde(rename = "2h")]
    H2,
    #[strum(serialize = "4h")]
    #[serde(rename = "4h")]
    H4,
    #[strum(serialize = "6h")]
    #[serde(rename = "6h")]
    H6,
    #[strum(serialize = "8h")]
    #[serde(rename = "8h")]
    H8,
    #[strum(serialize = "12h")]
    #[serde(rename = "12h")]
    H12,
    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    D1,
    #[strum(serialize = "3d")]
    #[serde(rename = "3d")]
    D3,
    #[strum(serialize = "1w")]
    #[serde(rename = "1w")]
    W1,
    #[strum(serialize = "1M")]
    #[serde(rename = "1M")]
    Month1,
}

impl Timeframe {
    /// Parses a candle timeframe from its wire representation (e.g. `"5m"`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        use std::str::FromStr;
        Self::from_str(s).ok()
    }

    /// A liquidation-volume rollup only supports the subset named in the
    /// liquidation aggregator's valid-timeframe list.
    #[must_use]
    pub const fn liquidation_timeframe_millis(self) -> Option<u64> {
        match self {
            Self::M1 => Some(60_000),
            Self::M5 => Some(5 * 60_000),
            Self::M15 => Some(15 * 60_000),
            Self::M30 => Some(30 * 60_000),
            Self::H1 => Some(60 * 60_000),
            Self::H4 => Some(4 * 60 * 60_000),
            Self::D1 => Some(24 * 60 * 60_000),
            _ => None,
        }
    }
}

impl fmt::Debug for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "Bid"),
            Self::Ask => write!(f, "Ask"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_wire_timeframes() {
        for s in [
            "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
            "1M",
        ] {
            assert!(Timeframe::parse(s).is_some(), "failed to parse {s}");
        }
        assert!(Timeframe::parse("7x").is_none());
    }

    #[test]
    fn liquidation_timeframes_are_the_named_subset() {
        assert_eq!(Timeframe::M1.liquidation_timeframe_millis(), Some(60_000));
        assert_eq!(Timeframe::M3.liquidation_timeframe_millis(), None);
    }
}
