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

//! Common machinery shared by every component in the fan-out pipeline.
//!
//! This crate plays the same role the "common" crate plays in larger
//! trading-platform workspaces: clock abstraction, shared Tokio runtime
//! access, logging bootstrap, and the generic cache/metrics primitives that
//! the domain crates build their own specific caches and counters on top of.

pub mod cache;
pub mod clock;
pub mod logging;
pub mod metrics;
pub mod runtime;
