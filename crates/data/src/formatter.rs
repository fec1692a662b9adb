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

//! Price/amount/total number formatting, with an optional process-wide
//! result cache in front of the (comparatively expensive) string formatting.

use std::time::Duration;

use mdfanout_common::cache::TtlLruCache;
use mdfanout_model::SymbolInfo;

const SCIENTIFIC_THRESHOLD: f64 = 1e-5;
const MILLIONS: f64 = 1e6;
const THOUSANDS: f64 = 1e3;
const DEFAULT_PRICE_PRECISION: usize = 2;

fn is_zero_or_tiny(v: f64) -> bool {
    v == 0.0
}

/// Formats a price: `"0.00"` for zero, scientific notation below `1e-5`,
/// otherwise fixed with the symbol's price precision (default 2).
#[must_use]
pub fn format_price(v: f64, meta: Option<&SymbolInfo>) -> String {
    if is_zero_or_tiny(v) {
        return "0.00".to_string();
    }
    if v.abs() < SCIENTIFIC_THRESHOLD {
        return format_scientific(v);
    }
    let precision = meta.map_or(DEFAULT_PRICE_PRECISION, |m| m.price_precision as usize);
    format!("{v:.precision$}")
}

/// Formats an amount: zero/scientific as [`format_price`], then M/K
/// suffixes above 1e6/1e3, otherwise `max(2, amount_precision)` decimals
/// capped at 8.
#[must_use]
pub fn format_amount(v: f64, meta: Option<&SymbolInfo>) -> String {
    if is_zero_or_tiny(v) {
        return "0.00".to_string();
    }
    if v.abs() < SCIENTIFIC_THRESHOLD {
        return format_scientific(v);
    }
    if v.abs() >= MILLIONS {
        return format!("{:.2}M", v / MILLIONS);
    }
    if v.abs() >= THOUSANDS {
        return format!("{:.2}K", v / THOUSANDS);
    }
    let precision = meta.map_or(2, |m| m.amount_precision_capped() as usize).max(2);
    format!("{v:.precision$}")
}

/// Formats a cumulative total: same M/K suffixing as [`format_amount`], but
/// very small non-zero values (`< 0.01`) get 4 decimals instead of 2.
#[must_use]
pub fn format_total(v: f64, meta: Option<&SymbolInfo>) -> String {
    if is_zero_or_tiny(v) {
        return "0.00".to_string();
    }
    if v.abs() >= MILLIONS {
        return format!("{:.2}M", v / MILLIONS);
    }
    if v.abs() >= THOUSANDS {
        return format!("{:.2}K", v / THOUSANDS);
    }
    if v.abs() < 0.01 {
        return format!("{v:.4}");
    }
    let precision = meta.map_or(2, |m| m.amount_precision_capped() as usize).max(2);
    format!("{v:.precision$}")
}

fn format_scientific(v: f64) -> String {
    // Two significant digits in the mantissa, e.g. "1.23e-6".
    format!("{v:.2e}")
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
enum Method {
    Price,
    Amount,
    Total,
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct CacheKey {
    method: Method,
    symbol: String,
    price_precision: u32,
    amount_precision: u32,
    value_bits: u64,
}

/// Caches formatted strings keyed by `(method, symbol, price_prec:amount_prec, value)`.
/// Disabled entirely when constructed with `enabled: false`, in which case
/// every call recomputes.
pub struct FormatterCache {
    cache: Option<TtlLruCache<CacheKey, String>>,
}

impl FormatterCache {
    #[must_use]
    pub fn new(enabled: bool, max_size: usize, ttl: Duration) -> Self {
        Self { cache: enabled.then(|| TtlLruCache::new(max_size, ttl)) }
    }

    fn key(method: Method, symbol: &str, meta: Option<&SymbolInfo>, value: f64) -> CacheKey {
        let (price_precision, amount_precision) =
            meta.map_or((DEFAULT_PRICE_PRECISION as u32, 2), |m| (m.price_precision, m.amount_precision_capped()));
        CacheKey {
            method,
            symbol: symbol.to_string(),
            price_precision,
            amount_precision,
            value_bits: value.to_bits(),
        }
    }

    #[must_use]
    pub fn format_price(&self, symbol: &str, v: f64, meta: Option<&SymbolInfo>) -> String {
        self.cached(Method::Price, symbol, meta, v, || format_price(v, meta))
    }

    #[must_use]
    pub fn format_amount(&self, symbol: &str, v: f64, meta: Option<&SymbolInfo>) -> String {
        self.cached(Method::Amount, symbol, meta, v, || format_amount(v, meta))
    }

    #[must_use]
    pub fn format_total(&self, symbol: &str, v: f64, meta: Option<&SymbolInfo>) -> String {
        self.cached(Method::Total, symbol, meta, v, || format_total(v, meta))
    }

    fn cached(
        &self,
        method: Method,
        symbol: &str,
        meta: Option<&SymbolInfo>,
        value: f64,
        compute: impl FnOnce() -> String,
    ) -> String {
        let Some(cache) = &self.cache else {
            return compute();
        };
        let key = Self::key(method, symbol, meta, value);
        if let Some(hit) = cache.get(&key) {
            return hit;
        }
        let result = compute();
        cache.insert(key, result.clone());
        result
    }

    #[must_use]
    pub fn stats(&self) -> Option<mdfanout_common::cache::CacheStats> {
        self.cache.as_ref().map(TtlLruCache::stats)
    }
}
