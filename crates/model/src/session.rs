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

//! Per-session aggregation parameters, shared between the Order-Book Manager
//! and the Connection Hub (the hub owns the session record; the manager owns
//! a parameter copy keyed by the same connection id).

use mdfanout_core::correctness::check_in_range_inclusive;

pub const MIN_DEPTH: usize = 5;
pub const MAX_DEPTH: usize = 5000;
pub const MIN_ROUNDING: f64 = 1e-4;

/// Per-subscriber aggregation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionParams {
    pub depth: usize,
    pub rounding: f64,
    pub use_depth_cache: bool,
    pub aggregate: bool,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            depth: 20,
            rounding: 0.01,
            use_depth_cache: true,
            aggregate: true,
        }
    }
}

impl SessionParams {
    /// Clamps `depth` into `[5, 5000]` and `rounding` to `>= 1e-4`, matching
    /// the Connection Hub's inbound validation rules.
    #[must_use]
    pub fn clamped(depth: usize, rounding: f64) -> Self {
        Self {
            depth: depth.clamp(MIN_DEPTH, MAX_DEPTH),
            rounding: if rounding > 0.0 { rounding.max(MIN_ROUNDING) } else { MIN_ROUNDING },
            ..Default::default()
        }
    }

    /// Validates `depth`/`rounding` are already within bounds, returning an
    /// error message for a [`ServiceError::ParamInvalid`](mdfanout_core::ServiceError::ParamInvalid) caller.
    ///
    /// # Errors
    ///
    /// Returns an error message if either value is out of range.
    pub fn validate(depth: usize, rounding: f64) -> Result<(), String> {
        check_in_range_inclusive(depth, MIN_DEPTH, MAX_DEPTH, "depth")?;
        if rounding <= 0.0 {
            return Err("invalid value for 'rounding': must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_depth_to_bounds() {
        assert_eq!(SessionParams::clamped(1, 0.01).depth, MIN_DEPTH);
        assert_eq!(SessionParams::clamped(100_000, 0.01).depth, MAX_DEPTH);
        assert_eq!(SessionParams::clamped(100, 0.01).depth, 100);
    }

    #[test]
    fn clamps_rounding_to_minimum() {
        assert_eq!(SessionParams::clamped(10, 0.0).rounding, MIN_ROUNDING);
        assert_eq!(SessionParams::clamped(10, -1.0).rounding, MIN_ROUNDING);
        assert_eq!(SessionParams::clamped(10, 1e-6).rounding, MIN_ROUNDING);
    }
}
