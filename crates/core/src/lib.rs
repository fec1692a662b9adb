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

//! Shared primitives used across the market-data fan-out service.
//!
//! Mirrors the small "core" crate pattern of a larger trading platform: no
//! business logic lives here, only the timestamp type and correctness-check
//! helpers that every other crate in the workspace depends on.

pub mod correctness;
pub mod error;
pub mod time;

pub use error::ServiceError;
pub use time::UnixMillis;
