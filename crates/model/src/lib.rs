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

//! Core domain types for the market-data fan-out service.
//!
//! No business logic lives here beyond the small invariants each type
//! enforces at construction; the aggregation, caching and delta algorithms
//! that operate on these types live in `mdfanout-data` and `mdfanout-live`.

pub mod aggregated;
pub mod candle;
pub mod delta;
pub mod enums;
pub mod liquidation;
pub mod orderbook;
pub mod price;
pub mod session;
pub mod symbol;
pub mod ticker;

pub use aggregated::{AggregatedBook, BookLevel, MarketDepthInfo};
pub use candle::CandleUpdate;
pub use delta::{DeltaLevel, DeltaMessage, DeltaOp};
pub use enums::{BookSource, StreamType, Timeframe};
pub use liquidation::{LiquidationEvent, LiquidationSide, LiquidationVolumeBucket, LiquidationVolumePoint};
pub use orderbook::{OrderBook, OrderBookSnapshot, OrderBookUpdate};
pub use price::PriceKey;
pub use session::SessionParams;
pub use symbol::SymbolInfo;
pub use ticker::TickerUpdate;
