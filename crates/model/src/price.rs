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

//! A totally-ordered wrapper around `f64` for use as a sorted-map key.
//!
//! Prices are kept as doubles throughout this service (never as fixed-point
//! integers): the aggregation primitives always compare with tolerance and
//! round via scale-then-floor/ceil rather than `%`, so plain `f64` is safe
//! here as long as it has a total order for the book's sorted maps.

use std::cmp::Ordering;

/// A price used as a `BTreeMap` key for one side of an [`OrderBook`](crate::orderbook::OrderBook).
///
/// Ordering is the natural numeric order; which side reads ascending vs
/// descending is a property of how the book iterates its two maps, not of
/// this type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceKey(pub f64);

impl PriceKey {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl Eq for PriceKey {}

impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for PriceKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for PriceKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Returns true if `|a - b| < tolerance`, the standard comparison used
/// throughout this service for floating-point price/amount equality.
#[must_use]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_numerically() {
        let mut keys = vec![PriceKey(3.0), PriceKey(1.0), PriceKey(2.0)];
        keys.sort();
        assert_eq!(keys.iter().map(|k| k.0).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn approx_eq_respects_tolerance() {
        assert!(approx_eq(1.0, 1.0 + 1e-9, 1e-8));
        assert!(!approx_eq(1.0, 1.0 + 1e-7, 1e-8));
    }
}
