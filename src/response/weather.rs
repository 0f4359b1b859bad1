// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Weather payload (`GET /homes/{home}/weather`).

use serde::{Deserialize, Serialize};

use super::{Percentage, Temperature};

/// Outside weather at the home location.
///
/// # Examples
///
/// ```
/// use tado_bridge::response::Weather;
///
/// let json = r#"{
///     "solarIntensity": {"percentage": 67.4},
///     "outsideTemperature": {"celsius": 8.24},
///     "weatherState": {"value": "CLOUDY_PARTLY"}
/// }"#;
/// let weather: Weather = serde_json::from_str(json).unwrap();
/// assert_eq!(weather.condition(), Some("CLOUDY_PARTLY"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    /// Solar intensity.
    pub solar_intensity: Option<Percentage>,
    /// Outside temperature.
    pub outside_temperature: Option<Temperature>,
    /// Weather condition.
    pub weather_state: Option<WeatherState>,
}

impl Weather {
    /// Returns the raw condition id.
    #[must_use]
    pub fn condition(&self) -> Option<&str> {
        self.weather_state.as_ref().map(|w| w.value.as_str())
    }
}

/// Weather condition code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeatherState {
    /// Condition id, for example `SUN` or `SCATTERED_RAIN`.
    pub value: String,
}
