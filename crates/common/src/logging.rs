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

//! Logging bootstrap.
//!
//! Every component logs through `tracing` spans/events with structured
//! key=value fields (`symbol`, `stream_key`, `sequence_id`, …) rather than
//! plain strings, matching the wider ecosystem's choice of logging crate.
//! This is intentionally a thin `tracing-subscriber` setup: a full
//! file-writer/log-guard stack is disproportionate to this service's scope.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{EnvFilter, fmt};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global `tracing` subscriber once per process.
///
/// `default_level` is used when the `RUST_LOG` environment variable is
/// unset; subsequent calls are a no-op so tests and `main` can both call
/// this safely.
pub fn init_tracing(default_level: &str) {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
