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

//! The subscriber-facing wire protocol (§6): inbound control messages and
//! outbound broadcast/ack messages, both JSON objects with a `type` tag.

use mdfanout_core::ServiceError;
use mdfanout_live::{Compress, WireFormat};
use mdfanout_model::{
    AggregatedBook, BookLevel, BookSource, CandleUpdate, DeltaMessage, LiquidationEvent, LiquidationVolumePoint,
    MarketDepthInfo, TickerUpdate, Timeframe,
};
use serde::{Deserialize, Serialize};

/// A message a subscriber socket may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Ping,
    UpdateParams {
        #[serde(default)]
        depth: Option<usize>,
        #[serde(default)]
        rounding: Option<f64>,
    },
}

/// A message the hub may send to a subscriber socket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Pong,
    Error {
        message: String,
    },
    ParamsUpdated {
        depth: usize,
        rounding: f64,
        success: bool,
    },
    OrderbookUpdate {
        symbol: String,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
        timestamp: u64,
        rounding: f64,
        depth: usize,
        source: BookSource,
        aggregated: bool,
        rounding_options: Vec<f64>,
        market_depth_info: MarketDepthInfo,
    },
    OrderbookDelta(DeltaMessage),
    OrderbookSnapshot(DeltaMessage),
    TickerUpdate(TickerUpdate),
    CandleUpdate(CandleUpdate),
    LiquidationEvent(LiquidationEvent),
    LiquidationVolume {
        symbol: String,
        timeframe: Timeframe,
        data: Vec<LiquidationVolumePoint>,
        timestamp: u64,
        is_update: bool,
    },
}

impl OutboundMessage {
    /// Builds the full `orderbook_update` shape (§4.11) from an aggregated
    /// book plus the subscriber's rounding menu. `rounding_options` is empty
    /// when no symbol metadata was available, matching the two drifted
    /// shapes the distilled source intentionally preserves (§9).
    #[must_use]
    pub fn orderbook_update(book: &AggregatedBook, rounding_options: Vec<f64>) -> Self {
        Self::OrderbookUpdate {
            symbol: book.symbol.clone(),
            bids: book.bids.clone(),
            asks: book.asks.clone(),
            timestamp: book.timestamp,
            rounding: book.rounding,
            depth: book.depth,
            source: book.source,
            aggregated: book.aggregated,
            rounding_options,
            market_depth_info: book.market_depth_info,
        }
    }

    /// Wraps a delta engine result as the appropriate outbound variant:
    /// `orderbook_snapshot` when it carries a full resync, `orderbook_delta`
    /// otherwise.
    #[must_use]
    pub fn orderbook_diff(message: DeltaMessage) -> Self {
        if message.full_snapshot {
            Self::OrderbookSnapshot(message)
        } else {
            Self::OrderbookDelta(message)
        }
    }

    /// Serializes to the newline-free JSON text frame sent over the wire.
    ///
    /// # Panics
    ///
    /// Never, in practice: every variant is built from already-validated
    /// model types with no non-finite floats reaching here via the
    /// aggregator's own invariants, but a serialization failure is treated
    /// as a logic bug rather than papered over.
    #[must_use]
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).expect("outbound message is always representable as JSON")
    }

    /// Encodes this message through the L8 serializer using `format`/
    /// `compression` (normally the pair `SerializerSelection` resolved from
    /// the startup benchmark), returning the ready-to-send frame bytes.
    pub fn encode(&self, format: WireFormat, compression: Compress) -> Result<Vec<u8>, ServiceError> {
        mdfanout_live::serialize(self, format, compression).map(|(bytes, _headers)| bytes)
    }
}
