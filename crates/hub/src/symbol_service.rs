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

//! The Symbol-Service interface (L13): id-to-canonical-symbol resolution,
//! suggestions for a miss, and the metadata the Aggregator/Formatter consume.
//!
//! The real service (persistence, fuzzy matching, exchange metadata sync) is
//! an external collaborator and out of scope here; this module only defines
//! the interface the Connection Hub is written against, plus a small static
//! implementation for local development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mdfanout_model::SymbolInfo;

/// Resolves subscriber-supplied symbol ids to canonical symbols and supplies
/// the metadata the aggregation/formatting layer needs.
#[async_trait]
pub trait SymbolService: Send + Sync {
    /// Resolves `id` to a canonical symbol, or `None` if unknown.
    async fn resolve(&self, id: &str) -> Option<String>;

    /// Returns up to `n` candidate symbols close to `id`, for an error
    /// message when resolution fails.
    async fn suggestions(&self, id: &str, n: usize) -> Vec<String>;

    /// Returns metadata for a canonical symbol, if known.
    async fn info(&self, id: &str) -> Option<SymbolInfo>;
}

/// A fixed in-memory symbol table: exact case-insensitive match for
/// `resolve`, prefix match for `suggestions`. Suitable for local development
/// and as a test double; a production deployment supplies its own
/// `SymbolService`.
pub struct StaticSymbolService {
    symbols: BTreeMap<String, SymbolInfo>,
}

impl StaticSymbolService {
    #[must_use]
    pub fn new(symbols: Vec<(String, SymbolInfo)>) -> Self {
        Self { symbols: symbols.into_iter().collect() }
    }

    /// A handful of plausible majors, enough to exercise the hub without an
    /// external service wired in.
    #[must_use]
    pub fn with_common_majors() -> Self {
        let entries = [
            ("BTCUSDT", 2u32, 6u32, "BTC", "USDT"),
            ("ETHUSDT", 2, 5, "ETH", "USDT"),
            ("SOLUSDT", 4, 3, "SOL", "USDT"),
            ("BNBUSDT", 2, 4, "BNB", "USDT"),
            ("XRPUSDT", 5, 1, "XRP", "USDT"),
        ];
        let symbols = entries
            .into_iter()
            .map(|(symbol, price_precision, amount_precision, base, quote)| {
                (
                    symbol.to_string(),
                    SymbolInfo {
                        price_precision,
                        amount_precision,
                        base: base.to_string(),
                        quote: quote.to_string(),
                        volume_24h: 0.0,
                        rounding_options: vec![0.01, 0.1, 1.0, 10.0],
                        default_rounding: 0.01,
                    },
                )
            })
            .collect();
        Self::new(symbols)
    }
}

#[async_trait]
impl SymbolService for StaticSymbolService {
    async fn resolve(&self, id: &str) -> Option<String> {
        let upper = id.to_uppercase();
        self.symbols.keys().find(|s| **s == upper).cloned()
    }

    async fn suggestions(&self, id: &str, n: usize) -> Vec<String> {
        let upper = id.to_uppercase();
        let prefix: String = upper.chars().take(3).collect();
        self.symbols.keys().filter(|s| s.starts_with(&prefix)).take(n).cloned().collect()
    }

    async fn info(&self, id: &str) -> Option<SymbolInfo> {
        self.symbols.get(&id.to_uppercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_symbol_case_insensitively() {
        let svc = StaticSymbolService::with_common_majors();
        assert_eq!(svc.resolve("btcusdt").await, Some("BTCUSDT".to_string()));
    }

    #[tokio::test]
    async fn unknown_symbol_resolves_to_none_with_suggestions() {
        let svc = StaticSymbolService::with_common_majors();
        assert_eq!(svc.resolve("DOGEUSDT").await, None);
        let suggestions = svc.suggestions("BTCFOO", 3).await;
        assert!(suggestions.contains(&"BTCUSDT".to_string()));
    }

    #[tokio::test]
    async fn info_returns_metadata_for_known_symbol() {
        let svc = StaticSymbolService::with_common_majors();
        let info = svc.info("ETHUSDT").await.unwrap();
        assert_eq!(info.base, "ETH");
    }
}
