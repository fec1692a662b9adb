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

//! Process-wide configuration, loaded from `MDFANOUT_*` environment
//! variables (§3A/§4.13). Every sub-struct mirrors a single owning
//! component's constructor arguments so `main` can build that component
//! straight off the matching field group.

use std::time::Duration;

use mdfanout_core::ServiceError;
use serde::Deserialize;

const ENV_PREFIX: &str = "MDFANOUT_";

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{suffix}")).ok()
}

fn parse_env<T: std::str::FromStr>(suffix: &str, default: T) -> Result<T, ServiceError> {
    match env_var(suffix) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ServiceError::ConfigInvalid(format!("{ENV_PREFIX}{suffix} has an invalid value: '{raw}'"))),
    }
}

/// Order Book Manager construction parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderBookManagerConfig {
    pub max_books: usize,
    pub cleanup_threshold: f64,
    pub cache_max_size: usize,
    pub cache_ttl_seconds: u64,
    pub persistent_mode: bool,
}

impl Default for OrderBookManagerConfig {
    fn default() -> Self {
        Self { max_books: 10_000, cleanup_threshold: 0.8, cache_max_size: 1_000, cache_ttl_seconds: 30, persistent_mode: false }
    }
}

impl OrderBookManagerConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            max_books: parse_env("MAX_BOOKS", defaults.max_books)?,
            cleanup_threshold: parse_env("CLEANUP_THRESHOLD", defaults.cleanup_threshold)?,
            cache_max_size: parse_env("CACHE_MAX_SIZE", defaults.cache_max_size)?,
            cache_ttl_seconds: parse_env("CACHE_TTL_SECONDS", defaults.cache_ttl_seconds)?,
            persistent_mode: parse_env("PERSISTENT_MODE", defaults.persistent_mode)?,
        })
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

/// Batcher (L7) construction parameters; mirrors `mdfanout_live::BatcherConfig`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatcherSettings {
    pub max_batch_size: usize,
    pub max_batch_delay_ms: u64,
    pub max_queue_size: usize,
}

impl Default for BatcherSettings {
    fn default() -> Self {
        Self {
            max_batch_size: mdfanout_live::batcher::DEFAULT_MAX_BATCH_SIZE,
            max_batch_delay_ms: mdfanout_live::batcher::DEFAULT_MAX_BATCH_DELAY_MS,
            max_queue_size: mdfanout_live::batcher::DEFAULT_MAX_QUEUE_SIZE,
        }
    }
}

impl BatcherSettings {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            max_batch_size: parse_env("BATCH_MAX_SIZE", defaults.max_batch_size)?,
            max_batch_delay_ms: parse_env("BATCH_MAX_DELAY_MS", defaults.max_batch_delay_ms)?,
            max_queue_size: parse_env("BATCH_MAX_QUEUE_SIZE", defaults.max_queue_size)?,
        })
    }

    #[must_use]
    pub fn as_batcher_config(&self) -> mdfanout_live::BatcherConfig {
        mdfanout_live::BatcherConfig {
            max_batch_size: self.max_batch_size,
            max_batch_delay_ms: self.max_batch_delay_ms,
            max_queue_size: self.max_queue_size,
        }
    }
}

/// Delta Engine (L9) construction parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaEngineConfig {
    pub full_snapshot_interval_secs: u64,
    pub max_age_secs: u64,
}

impl Default for DeltaEngineConfig {
    fn default() -> Self {
        Self { full_snapshot_interval_secs: 30, max_age_secs: 300 }
    }
}

impl DeltaEngineConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            full_snapshot_interval_secs: parse_env("DELTA_FULL_SNAPSHOT_INTERVAL_SECS", defaults.full_snapshot_interval_secs)?,
            max_age_secs: parse_env("DELTA_MAX_AGE_SECS", defaults.max_age_secs)?,
        })
    }

    #[must_use]
    pub fn full_snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.full_snapshot_interval_secs)
    }

    #[must_use]
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

/// Monitoring (L12) sampling cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub metrics_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { metrics_interval_secs: 15 }
    }
}

impl MonitoringConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self { metrics_interval_secs: parse_env("METRICS_INTERVAL_SECS", defaults.metrics_interval_secs)? })
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.metrics_interval_secs)
    }
}

/// Aggregation result cache (§7) sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationCacheConfig {
    pub max_size: usize,
    pub ttl_seconds: u64,
}

impl Default for AggregationCacheConfig {
    fn default() -> Self {
        Self { max_size: 1_000, ttl_seconds: 30 }
    }
}

impl AggregationCacheConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            max_size: parse_env("AGGREGATION_CACHE_MAX_SIZE", defaults.max_size)?,
            ttl_seconds: parse_env("AGGREGATION_CACHE_TTL_SECONDS", defaults.ttl_seconds)?,
        })
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Formatted-string cache (§7) sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatterCacheConfig {
    pub enabled: bool,
    pub max_size: usize,
    pub ttl_seconds: u64,
}

impl Default for FormatterCacheConfig {
    fn default() -> Self {
        Self { enabled: true, max_size: 1_000, ttl_seconds: 30 }
    }
}

impl FormatterCacheConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            enabled: parse_env("FORMATTER_CACHE_ENABLED", defaults.enabled)?,
            max_size: parse_env("FORMATTER_CACHE_MAX_SIZE", defaults.max_size)?,
            ttl_seconds: parse_env("FORMATTER_CACHE_TTL_SECONDS", defaults.ttl_seconds)?,
        })
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Upstream exchange stream manager (L3/L4) construction parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub reconnect_delay_ms: u64,
    pub max_reconnect_delay_ms: u64,
    pub depth_cache_refresh_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { reconnect_delay_ms: 500, max_reconnect_delay_ms: 30_000, depth_cache_refresh_secs: 3_600 }
    }
}

impl UpstreamConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            reconnect_delay_ms: parse_env("UPSTREAM_RECONNECT_DELAY_MS", defaults.reconnect_delay_ms)?,
            max_reconnect_delay_ms: parse_env("UPSTREAM_MAX_RECONNECT_DELAY_MS", defaults.max_reconnect_delay_ms)?,
            depth_cache_refresh_secs: parse_env("UPSTREAM_DEPTH_CACHE_REFRESH_SECS", defaults.depth_cache_refresh_secs)?,
        })
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    #[must_use]
    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }

    #[must_use]
    pub fn depth_cache_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.depth_cache_refresh_secs)
    }
}

/// Liquidation aggregator (L10) bucketing/retention parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LiquidationConfig {
    pub volume_bucket_secs: u64,
    pub history_retention_secs: u64,
}

impl Default for LiquidationConfig {
    fn default() -> Self {
        Self { volume_bucket_secs: 60, history_retention_secs: 86_400 }
    }
}

impl LiquidationConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            volume_bucket_secs: parse_env("LIQUIDATION_VOLUME_BUCKET_SECS", defaults.volume_bucket_secs)?,
            history_retention_secs: parse_env("LIQUIDATION_HISTORY_RETENTION_SECS", defaults.history_retention_secs)?,
        })
    }

    #[must_use]
    pub fn history_retention(&self) -> Duration {
        Duration::from_secs(self.history_retention_secs)
    }
}

/// Connection hub (L6/L11) session limits.
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    pub max_connections: usize,
    pub ping_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { max_connections: 10_000, ping_interval_secs: 30 }
    }
}

impl HubConfig {
    fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            max_connections: parse_env("HUB_MAX_CONNECTIONS", defaults.max_connections)?,
            ping_interval_secs: parse_env("HUB_PING_INTERVAL_SECS", defaults.ping_interval_secs)?,
        })
    }

    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

/// Aggregates every sub-component's configuration plus top-level process
/// settings (bind address, log level, upstream base URL).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub log_level: String,
    pub upstream_base_url: Option<String>,
    pub history_base_url: Option<String>,
    pub order_books: OrderBookManagerConfig,
    pub batcher: BatcherSettings,
    pub delta: DeltaEngineConfig,
    pub monitoring: MonitoringConfig,
    pub aggregation_cache: AggregationCacheConfig,
    pub formatter_cache: FormatterCacheConfig,
    pub upstream: UpstreamConfig,
    pub liquidation: LiquidationConfig,
    pub hub: HubConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            upstream_base_url: None,
            history_base_url: None,
            order_books: OrderBookManagerConfig::default(),
            batcher: BatcherSettings::default(),
            delta: DeltaEngineConfig::default(),
            monitoring: MonitoringConfig::default(),
            aggregation_cache: AggregationCacheConfig::default(),
            formatter_cache: FormatterCacheConfig::default(),
            upstream: UpstreamConfig::default(),
            liquidation: LiquidationConfig::default(),
            hub: HubConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads a configuration snapshot from `MDFANOUT_*` environment
    /// variables, falling back to documented defaults for anything unset.
    /// Out-of-range/unparsable values are reported as [`ServiceError::ConfigInvalid`];
    /// nothing here is a required field, so there is no separate fatal-missing case.
    pub fn from_env() -> Result<Self, ServiceError> {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: env_var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            log_level: env_var("LOG_LEVEL").unwrap_or(defaults.log_level),
            upstream_base_url: env_var("UPSTREAM_BASE_URL"),
            history_base_url: env_var("HISTORY_BASE_URL"),
            order_books: OrderBookManagerConfig::from_env()?,
            batcher: BatcherSettings::from_env()?,
            delta: DeltaEngineConfig::from_env()?,
            monitoring: MonitoringConfig::from_env()?,
            aggregation_cache: AggregationCacheConfig::from_env()?,
            formatter_cache: FormatterCacheConfig::from_env()?,
            upstream: UpstreamConfig::from_env()?,
            liquidation: LiquidationConfig::from_env()?,
            hub: HubConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_fallbacks() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.order_books.max_books, 10_000);
        assert_eq!(config.batcher.max_batch_size, mdfanout_live::batcher::DEFAULT_MAX_BATCH_SIZE);
    }

    #[test]
    fn invalid_numeric_env_is_reported_as_config_invalid() {
        // SAFETY: test-only, single-threaded access to this specific variable.
        unsafe { std::env::set_var("MDFANOUT_MAX_BOOKS", "not-a-number") };
        let result = OrderBookManagerConfig::from_env();
        unsafe { std::env::remove_var("MDFANOUT_MAX_BOOKS") };
        assert!(matches!(result, Err(ServiceError::ConfigInvalid(_))));
    }
}
