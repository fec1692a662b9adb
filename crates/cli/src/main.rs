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

//! Process entry point: loads configuration, wires every component, and
//! serves the subscriber-facing WebSocket API until a shutdown signal
//! arrives (§4.13).

mod config;

use std::sync::Arc;

use mdfanout_data::OrderBookManager;
use mdfanout_hub::{ConnectionHub, StaticSymbolService, router};
use mdfanout_live::{DeltaEngine, LiquidationAggregator, UpstreamStreamManager};
use mdfanout_mockex::MockExchange;

use crate::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    mdfanout_common::logging::init_tracing(&config.log_level);

    if config.upstream_base_url.is_none() {
        tracing::warn!("MDFANOUT_UPSTREAM_BASE_URL not set, running against the synthetic mock exchange");
    }
    let exchange: Arc<dyn mdfanout_live::ExchangeDriver> = Arc::new(MockExchange::new());

    let order_books = Arc::new(OrderBookManager::new(
        config.order_books.max_books,
        config.order_books.cleanup_threshold,
        config.order_books.cache_max_size,
        config.order_books.cache_ttl(),
    ));
    order_books.set_persistent_mode(config.order_books.persistent_mode);

    let upstream = Arc::new(UpstreamStreamManager::new(Arc::clone(&exchange), Arc::clone(&order_books)));
    let liquidation = Arc::new(LiquidationAggregator::new(Arc::clone(&exchange)));
    let delta = Arc::new(DeltaEngine::new(config.delta.full_snapshot_interval(), config.delta.max_age()));
    let symbols = Arc::new(StaticSymbolService::with_common_majors());

    let hub = ConnectionHub::new(order_books, upstream, liquidation, Arc::clone(&delta), config.batcher.as_batcher_config(), symbols);

    let metrics = Arc::new(mdfanout_common::metrics::Registry::new());
    let sampler = mdfanout_common::metrics::SystemSampler::new(Arc::clone(&metrics), config.monitoring.interval());
    let sampler_task = tokio::spawn(sampler.run());
    let delta_for_sweep = Arc::clone(&delta);
    let sweep_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.delta.max_age());
        loop {
            ticker.tick().await;
            let removed = delta_for_sweep.sweep_stale();
            if removed > 0 {
                tracing::debug!(removed, "delta engine sweep dropped stale subscriber state");
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(bind_addr = %config.bind_addr, "mdfanout listening");

    let app = router(hub);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    sampler_task.abort();
    sweep_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async { tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_crate_builds() {
        // Compilation of this crate is the test; `main` itself requires a
        // bound socket and a running runtime to exercise meaningfully.
    }
}
