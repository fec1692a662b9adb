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

//! HTTP/WebSocket route table for the subscriber-facing hub (§4.11, §6).

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use mdfanout_model::SessionParams;
use serde::Deserialize;

use crate::hub::ConnectionHub;

const DEFAULT_ORDERBOOK_DEPTH: usize = 20;
const DEFAULT_ROUNDING: f64 = 0.01;
const DEFAULT_LIQUIDATION_VOLUME_BACKFILL: usize = 500;

#[derive(Debug, Deserialize)]
struct OrderbookQuery {
    #[serde(default = "default_depth")]
    limit: usize,
    #[serde(default = "default_rounding")]
    rounding: f64,
}

fn default_depth() -> usize {
    DEFAULT_ORDERBOOK_DEPTH
}

fn default_rounding() -> f64 {
    DEFAULT_ROUNDING
}

#[derive(Debug, Deserialize)]
struct LiquidationVolumeQuery {
    since_ms: Option<u64>,
    #[serde(default = "default_backfill_limit")]
    limit: usize,
}

fn default_backfill_limit() -> usize {
    DEFAULT_LIQUIDATION_VOLUME_BACKFILL
}

/// Builds the axum router serving every subscriber-facing WebSocket route
/// against a shared [`ConnectionHub`].
#[must_use]
pub fn router(hub: Arc<ConnectionHub>) -> Router {
    Router::new()
        .route("/ws/orderbook/{symbol}", get(orderbook_handler))
        .route("/ws/ticker/{symbol}", get(ticker_handler))
        .route("/ws/candles/{symbol}/{timeframe}", get(candles_handler))
        .route("/ws/liquidations/{symbol}", get(liquidation_events_handler))
        .route("/ws/liquidations/{symbol}/{timeframe}", get(liquidation_volume_handler))
        .with_state(hub)
}

async fn orderbook_handler(
    ws: WebSocketUpgrade,
    Path(symbol): Path<String>,
    Query(query): Query<OrderbookQuery>,
    State(hub): State<Arc<ConnectionHub>>,
) -> impl IntoResponse {
    let params = SessionParams::clamped(query.limit, query.rounding);
    ws.on_upgrade(move |socket: WebSocket| hub.serve_orderbook(socket, symbol, params.depth, params.rounding))
}

async fn ticker_handler(
    ws: WebSocketUpgrade,
    Path(symbol): Path<String>,
    State(hub): State<Arc<ConnectionHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket: WebSocket| hub.serve_ticker(socket, symbol))
}

async fn candles_handler(
    ws: WebSocketUpgrade,
    Path((symbol, timeframe)): Path<(String, String)>,
    State(hub): State<Arc<ConnectionHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket: WebSocket| hub.serve_candles(socket, symbol, timeframe))
}

async fn liquidation_events_handler(
    ws: WebSocketUpgrade,
    Path(symbol): Path<String>,
    State(hub): State<Arc<ConnectionHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket: WebSocket| hub.serve_liquidation_events(socket, symbol))
}

async fn liquidation_volume_handler(
    ws: WebSocketUpgrade,
    Path((symbol, timeframe)): Path<(String, String)>,
    Query(query): Query<LiquidationVolumeQuery>,
    State(hub): State<Arc<ConnectionHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket: WebSocket| {
        hub.serve_liquidation_volume(socket, symbol, timeframe, query.since_ms, query.limit)
    })
}
