// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geofence distance conversion.
//!
//! The API reports a person's distance from home as
//! `relativeDistanceFromHomeFence`, a normalized value in `0..=1`. It maps
//! onto kilometers through a log-power model:
//!
//! ```text
//! km  = X_FACTOR * POW_FACTOR ^ (rel * 10)
//! rel = 0.1 / (ln(POW_FACTOR) / ln(km / X_FACTOR))
//! ```
//!
//! Results are rounded to 2, 1 or 0 decimals below 10, below 100 and from
//! 100 upwards respectively.
//!
//! # Examples
//!
//! ```
//! use tado_bridge::types::{km_to_miles, km_to_relative, relative_to_km};
//!
//! assert_eq!(relative_to_km(0.0), 0.0);
//! assert_eq!(relative_to_km(0.5), 9.27);
//! assert_eq!(km_to_miles(100.0), 62.1);
//! assert!((km_to_relative(9.27) - 0.5).abs() < 0.001);
//! ```

/// Unit factor of the distance model.
///
/// Empirically calibrated against GPS measurements (accurate to about 99 %
/// at 1 km and 96 % at 4000 km). Do not adjust.
pub const X_FACTOR: f64 = 0.01981;

/// Logarithmic base of the distance model. Empirically calibrated together
/// with [`X_FACTOR`].
pub const POW_FACTOR: f64 = 3.42;

/// Miles per kilometer, used by [`km_to_miles`].
pub const MILES_PER_KM: f64 = 0.621_371_192_24;

/// Lower clamp applied by [`km_to_relative`].
pub const MIN_KM: f64 = 0.03;

/// Upper clamp applied by [`km_to_relative`].
pub const MAX_KM: f64 = 4000.0;

/// Converts the normalized geofence distance to kilometers.
#[must_use]
pub fn relative_to_km(relative: f64) -> f64 {
    if relative == 0.0 {
        return 0.0;
    }
    round_tiered(X_FACTOR * POW_FACTOR.powf(relative * 10.0))
}

/// Converts kilometers back to the normalized geofence distance.
///
/// Inputs are clamped to `[MIN_KM, MAX_KM]`; the result is not rounded.
#[must_use]
pub fn km_to_relative(km: f64) -> f64 {
    if km == 0.0 {
        return 0.0;
    }
    let km = km.clamp(MIN_KM, MAX_KM);
    0.1 / (POW_FACTOR.ln() / (km / X_FACTOR).ln())
}

/// Converts kilometers to miles using the same rounding tiers.
#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    round_tiered(MILES_PER_KM * km)
}

fn round_tiered(value: f64) -> f64 {
    let decimals = if value < 10.0 {
        2
    } else if value < 100.0 {
        1
    } else {
        0
    };
    super::round_to(value, decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_zero() {
        assert!(relative_to_km(0.0).abs() < f64::EPSILON);
        assert!(km_to_relative(0.0).abs() < f64::EPSILON);
        assert!(km_to_miles(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rounding_tiers() {
        // 9.2686...
        assert!((relative_to_km(0.5) - 9.27).abs() < 1e-9);
        // 31.6986...
        assert!((relative_to_km(0.6) - 31.7).abs() < 1e-9);
        // 108.409...
        assert!((relative_to_km(0.7) - 108.0).abs() < 1e-9);
    }

    #[test]
    fn miles_tiers() {
        assert!((km_to_miles(1.0) - 0.62).abs() < 1e-9);
        assert!((km_to_miles(100.0) - 62.1).abs() < 1e-9);
        assert!((km_to_miles(1000.0) - 621.0).abs() < 1e-9);
    }

    #[test]
    fn relative_clamps() {
        assert!((km_to_relative(0.001) - km_to_relative(MIN_KM)).abs() < f64::EPSILON);
        assert!((km_to_relative(10_000.0) - km_to_relative(MAX_KM)).abs() < f64::EPSILON);
    }

    #[test]
    fn round_trip_within_tolerance() {
        for step in 1..=10 {
            let rel = f64::from(step) / 10.0;
            let back = km_to_relative(relative_to_km(rel));
            assert!((back - rel).abs() < 0.01, "rel {rel} came back as {back}");
        }
    }
}
