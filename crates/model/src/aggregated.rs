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

//! The derived, per-subscriber aggregated order book (L2 output shape).
//!
//! Lives only inside the aggregation cache and per-send paths; never mutated
//! in place, always replaced wholesale by a fresh [`crate::orderbook`] read.

use serde::{Deserialize, Serialize};

use crate::enums::BookSource;

/// One price level in an [`AggregatedBook`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub amount: f64,
    pub cumulative: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_formatted: Option<String>,
}

impl BookLevel {
    #[must_use]
    pub const fn new(price: f64, amount: f64, cumulative: f64) -> Self {
        Self {
            price,
            amount,
            cumulative,
            price_formatted: None,
            amount_formatted: None,
            cumulative_formatted: None,
        }
    }
}

/// Depth sufficiency analysis attached to every aggregated book.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketDepthInfo {
    pub requested: usize,
    pub actual: usize,
    pub raw_bids: usize,
    pub raw_asks: usize,
    pub sufficient: bool,
}

/// A fully aggregated, subscriber-ready view of one symbol's order book.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBook {
    pub symbol: String,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_formatted: Option<String>,
    pub rounding: f64,
    pub depth: usize,
    pub source: BookSource,
    pub aggregated: bool,
    pub market_depth_info: MarketDepthInfo,
}
