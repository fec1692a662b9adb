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

//! Upstream stream multiplexing (L9), delta diffing (L6), batching (L7),
//! serialization (L8) and liquidation rollups (L10): everything that sits
//! between the abstract exchange driver and the Connection Hub.

pub mod batcher;
pub mod delta;
pub mod exchange;
pub mod liquidation;
pub mod serializer;
pub mod upstream;

pub use batcher::{Batcher, BatcherConfig, BatcherStats};
pub use delta::DeltaEngine;
pub use exchange::{ExchangeDriver, OrderBookEvent};
pub use liquidation::LiquidationAggregator;
pub use serializer::{BenchmarkResult, Compress, FrameHeaders, SerializerSelection, WireFormat, benchmark, deserialize, serialize};
pub use upstream::{StreamEvent, StreamState, SubscriberId, UpstreamStreamManager};
