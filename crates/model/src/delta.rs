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

//! The per-subscriber delta wire shape emitted by the delta engine (L6).

use serde::{Deserialize, Serialize};

/// What happened to a price level between two successive sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaOp {
    Add,
    Update,
    Remove,
}

/// A single changed row within a [`DeltaMessage`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeltaLevel {
    pub price: f64,
    pub amount: f64,
    pub op: DeltaOp,
}

impl DeltaLevel {
    #[must_use]
    pub const fn new(price: f64, amount: f64, op: DeltaOp) -> Self {
        Self { price, amount, op }
    }
}

/// The add/update/remove diff between two successive aggregated snapshots
/// sent to a single subscriber.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeltaMessage {
    pub symbol: String,
    pub rounding: f64,
    pub timestamp: u64,
    pub sequence_id: u64,
    pub full_snapshot: bool,
    pub bids: Vec<DeltaLevel>,
    pub asks: Vec<DeltaLevel>,
}
