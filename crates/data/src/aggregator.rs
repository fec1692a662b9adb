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

//! Price-bucket aggregation: rounding primitives, exact-level bucketing, and
//! the full aggregate pass over an [`OrderBook`].

use mdfanout_model::{
    AggregatedBook, BookLevel, BookSource, MarketDepthInfo, OrderBook, SymbolInfo,
};

use crate::formatter::FormatterCache;

const ZERO_FILTER: f64 = 1e-6;
const MAX_AGGREGATE_ATTEMPTS: u32 = 5;

/// Rounds `v` down to the nearest multiple of `m` via scaling, never modulo
/// (float remainders drift for non-power-of-two moduli).
#[must_use]
pub fn round_down(v: f64, m: f64) -> f64 {
    if m <= 0.0 {
        return v;
    }
    let scale = 1.0 / m;
    (v * scale).floor() / scale
}

/// Rounds `v` up to the nearest multiple of `m`, same scaling approach as
/// [`round_down`].
#[must_use]
pub fn round_up(v: f64, m: f64) -> f64 {
    if m <= 0.0 {
        return v;
    }
    let scale = 1.0 / m;
    (v * scale).ceil() / scale
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExactLevel {
    pub price: f64,
    pub amount: f64,
}

/// Buckets raw `(price, amount)` rows into at most `depth` rounded levels.
///
/// Rows with non-positive price or amount are rejected. Buckets whose total
/// amount is `<= 1e-6` after summation are dropped to survive float drift
/// from repeated rounding. Asks sort ascending, bids descending.
#[must_use]
pub fn get_exact_levels(
    raw: &[(f64, f64)],
    is_ask: bool,
    depth: usize,
    rounding: f64,
) -> Vec<ExactLevel> {
    use std::collections::BTreeMap;

    use mdfanout_model::PriceKey;

    let mut buckets: BTreeMap<PriceKey, f64> = BTreeMap::new();
    for &(price, amount) in raw {
        if price <= 0.0 || amount <= 0.0 {
            continue;
        }
        let rounded = if is_ask { round_up(price, rounding) } else { round_down(price, rounding) };
        *buckets.entry(PriceKey(rounded)).or_insert(0.0) += amount;
    }

    let mut levels: Vec<ExactLevel> = buckets
        .into_iter()
        .filter(|(_, amount)| *amount > ZERO_FILTER)
        .map(|(price, amount)| ExactLevel { price: price.0, amount })
        .collect();

    if is_ask {
        levels.sort_by(|a, b| a.price.total_cmp(&b.price));
    } else {
        levels.sort_by(|a, b| b.price.total_cmp(&a.price));
    }
    levels.truncate(depth);
    levels
}

fn initial_multiplier(rounding: f64) -> u32 {
    if rounding >= 1.0 { (rounding * 100.0).floor().max(100.0) as u32 } else { 100 }
}

/// Runs the full aggregation pass over `book`: progressively widens the raw
/// snapshot window until both sides reach `depth` buckets (or attempts run
/// out), computes running cumulative totals, and attaches formatted strings
/// when `symbol_meta` is supplied.
#[must_use]
pub fn aggregate(
    book: &OrderBook,
    depth: usize,
    rounding: f64,
    source: BookSource,
    symbol_meta: Option<&SymbolInfo>,
    formatter: Option<&FormatterCache>,
) -> AggregatedBook {
    let mut multiplier = initial_multiplier(rounding);
    let (mut bids, mut asks, mut raw_bid_count, mut raw_ask_count) = (Vec::new(), Vec::new(), 0, 0);

    for _ in 0..MAX_AGGREGATE_ATTEMPTS {
        let window = depth.saturating_mul(multiplier as usize).max(depth);
        let (raw_bids, raw_asks) = book.snapshot(Some(window));
        raw_bid_count = raw_bids.len();
        raw_ask_count = raw_asks.len();

        let bid_pairs: Vec<(f64, f64)> = raw_bids.iter().map(|l| (l.price, l.amount)).collect();
        let ask_pairs: Vec<(f64, f64)> = raw_asks.iter().map(|l| (l.price, l.amount)).collect();

        bids = get_exact_levels(&bid_pairs, false, depth, rounding);
        asks = get_exact_levels(&ask_pairs, true, depth, rounding);

        if bids.len() >= depth.min(raw_bid_count) && asks.len() >= depth.min(raw_ask_count) {
            break;
        }
        multiplier = multiplier.saturating_mul(2);
    }

    let mut bid_levels = Vec::with_capacity(bids.len());
    let mut cumulative = 0.0;
    for level in &bids {
        cumulative += level.amount;
        bid_levels.push(make_level(&book.symbol, level.price, level.amount, cumulative, symbol_meta, formatter));
    }

    // Asks are reversed to high-price-first for the cumulative suffix-sum
    // pass, then left in that (descending) order for transport so the top
    // row's cumulative equals total visible ask liquidity.
    let mut reversed_asks = asks.clone();
    reversed_asks.reverse();
    let mut ask_levels_desc = Vec::with_capacity(reversed_asks.len());
    let mut cumulative = 0.0;
    for level in &reversed_asks {
        cumulative += level.amount;
        ask_levels_desc.push(make_level(&book.symbol, level.price, level.amount, cumulative, symbol_meta, formatter));
    }

    let market_depth_info = MarketDepthInfo {
        requested: depth,
        actual: bid_levels.len().min(ask_levels_desc.len()),
        raw_bids: raw_bid_count,
        raw_asks: raw_ask_count,
        sufficient: raw_bid_count >= depth * 10 && raw_ask_count >= depth * 10,
    };

    if bid_levels.is_empty() && ask_levels_desc.is_empty() {
        tracing::debug!(symbol = %book.symbol, "aggregate produced an empty book");
    }

    AggregatedBook {
        symbol: book.symbol.clone(),
        bids: bid_levels,
        asks: ask_levels_desc,
        timestamp: book.last_update_time.as_u64(),
        time_formatted: Some(book.last_update_time.to_hhmmss()),
        rounding,
        depth,
        source,
        aggregated: true,
        market_depth_info,
    }
}

fn make_level(
    symbol: &str,
    price: f64,
    amount: f64,
    cumulative: f64,
    meta: Option<&SymbolInfo>,
    formatter: Option<&FormatterCache>,
) -> BookLevel {
    match meta {
        Some(meta) => match formatter {
            Some(formatter) => BookLevel {
                price,
                amount,
                cumulative,
                price_formatted: Some(formatter.format_price(symbol, price, Some(meta))),
                amount_formatted: Some(formatter.format_amount(symbol, amount, Some(meta))),
                cumulative_formatted: Some(formatter.format_total(symbol, cumulative, Some(meta))),
            },
            None => BookLevel {
                price,
                amount,
                cumulative,
                price_formatted: Some(crate::formatter::format_price(price, Some(meta))),
                amount_formatted: Some(crate::formatter::format_amount(amount, Some(meta))),
                cumulative_formatted: Some(crate::formatter::format_total(cumulative, Some(meta))),
            },
        },
        None => BookLevel { price, amount, cumulative, price_formatted: None, amount_formatted: None, cumulative_formatted: None },
    }
}

#[cfg(test)]
mod tests {
    use mdfanout_model::OrderBookSnapshot;

    use super::*;

    #[test]
    fn round_down_scales_instead_of_modulo() {
        assert!((round_down(100.37, 0.1) - 100.3).abs() < 1e-9);
        assert!((round_down(100.0, 0.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn round_up_scales_instead_of_modulo() {
        assert!((round_up(100.31, 0.1) - 100.4).abs() < 1e-9);
    }

    #[test]
    fn get_exact_levels_rejects_non_positive_rows() {
        let raw = vec![(100.0, 1.0), (-1.0, 1.0), (100.0, -1.0), (0.0, 1.0)];
        let levels = get_exact_levels(&raw, false, 10, 1.0);
        assert_eq!(levels.len(), 1);
        assert!((levels[0].amount - 1.0).abs() < 1e-9);
    }

    #[test]
    fn get_exact_levels_drops_dust_buckets() {
        let raw = vec![(100.0, 1e-8)];
        let levels = get_exact_levels(&raw, false, 10, 1.0);
        assert!(levels.is_empty());
    }

    #[test]
    fn get_exact_levels_sorts_bids_desc_asks_asc() {
        let raw = vec![(101.0, 1.0), (99.0, 1.0), (100.0, 1.0)];
        let bids = get_exact_levels(&raw, false, 10, 1.0);
        assert_eq!(bids.iter().map(|l| l.price).collect::<Vec<_>>(), vec![101.0, 100.0, 99.0]);
        let asks = get_exact_levels(&raw, true, 10, 1.0);
        assert_eq!(asks.iter().map(|l| l.price).collect::<Vec<_>>(), vec![99.0, 100.0, 101.0]);
    }

    fn sample_book() -> OrderBook {
        let mut book = OrderBook::new("BTCUSDT".to_string());
        let bids: Vec<_> = (0..50).map(|i| mdfanout_model::OrderBookUpdate { price: 100.0 - i as f64 * 0.5, amount: 1.0 }).collect();
        let asks: Vec<_> = (0..50).map(|i| mdfanout_model::OrderBookUpdate { price: 101.0 + i as f64 * 0.5, amount: 1.0 }).collect();
        book.apply_snapshot(&OrderBookSnapshot {
            symbol: "BTCUSDT".to_string(),
            bids,
            asks,
            timestamp: mdfanout_core::UnixMillis::new(1_000),
        })
        .unwrap();
        book
    }

    #[test]
    fn aggregate_computes_prefix_sum_bids_and_suffix_sum_asks() {
        let book = sample_book();
        let result = aggregate(&book, 5, 1.0, BookSource::Mock, None, None);
        assert_eq!(result.bids.len(), 5);
        assert_eq!(result.asks.len(), 5);

        // bid cumulative is a running prefix sum, strictly increasing
        for pair in result.bids.windows(2) {
            assert!(pair[1].cumulative > pair[0].cumulative);
        }
        // ask cumulative top row holds the total visible ask liquidity
        let total_ask_amount: f64 = result.asks.iter().map(|l| l.amount).sum();
        assert!((result.asks[0].cumulative - total_ask_amount).abs() < 1e-9);
    }

    #[test]
    fn aggregate_attaches_formatted_strings_when_meta_present() {
        let book = sample_book();
        let meta = SymbolInfo {
            price_precision: 2,
            amount_precision: 4,
            base: "BTC".into(),
            quote: "USDT".into(),
            volume_24h: 0.0,
            rounding_options: vec![0.01, 0.1, 1.0],
            default_rounding: 0.01,
        };
        let result = aggregate(&book, 5, 1.0, BookSource::Mock, Some(&meta), None);
        assert!(result.bids[0].price_formatted.is_some());
    }

    #[test]
    fn aggregate_of_empty_book_returns_empty_sides() {
        let book = OrderBook::new("BTCUSDT".to_string());
        let result = aggregate(&book, 5, 1.0, BookSource::Mock, None, None);
        assert!(result.bids.is_empty());
        assert!(result.asks.is_empty());
        assert_eq!(result.market_depth_info.actual, 0);
    }
}
