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

//! Functions for correctness checks, similar to the *design by contract* philosophy.
//!
//! A condition is a predicate which must be true just prior to the execution of
//! some section of code for correct behavior as per the design specification.

/// Checks `value` is strictly positive (`> 0`).
///
/// # Errors
///
/// Returns an error message if the check fails.
pub fn check_positive(value: f64, param: &str) -> Result<(), String> {
    if value <= 0.0 || !value.is_finite() {
        return Err(format!("invalid value for '{param}': {value} was not positive"));
    }
    Ok(())
}

/// Checks `value` is non-negative (`>= 0`).
///
/// # Errors
///
/// Returns an error message if the check fails.
pub fn check_non_negative(value: f64, param: &str) -> Result<(), String> {
    if value < 0.0 || !value.is_finite() {
        return Err(format!("invalid value for '{param}': {value} was negative or non-finite"));
    }
    Ok(())
}

/// Checks `s` is a non-empty string.
///
/// # Errors
///
/// Returns an error message if the check fails.
pub fn check_nonempty_string<T: AsRef<str>>(s: T, param: &str) -> Result<(), String> {
    if s.as_ref().is_empty() {
        return Err(format!("invalid string for '{param}': was empty"));
    }
    Ok(())
}

/// Checks `value` is within the inclusive range `[min, max]`.
///
/// # Errors
///
/// Returns an error message if the check fails.
pub fn check_in_range_inclusive<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
    param: &str,
) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!(
            "invalid value for '{param}': {value} was not in range [{min}, {max}]"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive() {
        assert!(check_positive(0.0, "x").is_err());
        assert!(check_positive(-1.0, "x").is_err());
        assert!(check_positive(1.0, "x").is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(check_in_range_inclusive(4, 5, 5000, "depth").is_err());
        assert!(check_in_range_inclusive(5, 5, 5000, "depth").is_ok());
        assert!(check_in_range_inclusive(5001, 5, 5000, "depth").is_err());
    }
}
