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

//! Metadata shape returned by the external Symbol Service interface (L13).
//!
//! The Symbol Service itself (ID↔display resolution, persistence) is an
//! out-of-scope external collaborator; this crate only defines the shape its
//! `info()` call returns, since the Aggregator/Formatter consume it.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub price_precision: u32,
    pub amount_precision: u32,
    pub base: String,
    pub quote: String,
    pub volume_24h: f64,
    pub rounding_options: Vec<f64>,
    pub default_rounding: f64,
}

impl SymbolInfo {
    #[must_use]
    pub fn amount_precision_capped(&self) -> u32 {
        self.amount_precision.min(8)
    }
}
