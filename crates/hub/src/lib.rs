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

//! Subscriber-facing connection hub: session lifecycle, wire protocol and
//! routing (§4.11). Sits above the data/live layers and below the binary
//! that owns process configuration and signal handling.

mod hub;
mod router;
mod symbol_service;
mod wire;

pub use hub::ConnectionHub;
pub use router::router;
pub use symbol_service::{StaticSymbolService, SymbolService};
pub use wire::{InboundMessage, OutboundMessage};
