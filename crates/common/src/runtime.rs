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

//! Access to the process-wide Tokio runtime.
//!
//! Upstream stream tasks, subscriber reader/writer tasks and periodic sweep
//! tasks are all spawned against this single runtime, so every long-running
//! worker in the service shares the same thread pool and shuts down with it.

use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Environment variable controlling the number of OS threads for the shared
/// runtime. Unset or unparsable falls back to the Tokio default (number of
/// logical CPUs).
const WORKER_THREADS_ENV: &str = "MDFANOUT_WORKER_THREADS";

fn build_runtime() -> Runtime {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Ok(threads) = std::env::var(WORKER_THREADS_ENV) {
        if let Ok(n) = threads.parse::<usize>() {
            if n > 0 {
                builder.worker_threads(n);
            }
        }
    }
    builder.build().expect("failed to build the shared Tokio runtime")
}

/// Returns a handle to the process-wide runtime, creating it on first call.
///
/// # Panics
///
/// Panics if the runtime cannot be created (e.g. unable to spawn OS threads).
#[must_use]
pub fn get_runtime() -> Handle {
    RUNTIME.get_or_init(build_runtime).handle().clone()
}
