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

//! Service-wide error kinds (see the error handling design).
//!
//! A single [`ServiceError`] enum is shared by every crate in the workspace so
//! that callers can match on the same set of kinds regardless of which
//! component raised them, per the retry/drop table:
//!
//! - `UpstreamTransient` — retried with backoff.
//! - `UpstreamProtocol` — per-message warn, drop the message.
//! - `ConfigInvalid` — bad symbol/params at session start; reported, not retried.
//! - `ParamInvalid` — bad mid-session update; connection kept open.
//! - `SubscriberSend` — single-subscriber failure; broadcast continues.
//! - `Internal` — unexpected; logged, generic error surfaced, service keeps running.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("upstream transient error: {0}")]
    UpstreamTransient(String),

    #[error("upstream protocol error: {0}")]
    UpstreamProtocol(String),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("invalid parameter update: {0}")]
    ParamInvalid(String),

    #[error("subscriber send failed: {0}")]
    SubscriberSend(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether a worker loop should retry the operation that produced this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamTransient(_))
    }
}
