// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Weather reducer for the virtual home device.

use crate::capabilities::{Capabilities, Capability};
use crate::event::{EventNotification, Trigger};
use crate::labels::{Labels, capitalize};
use crate::response::Weather;
use crate::state::PublishedState;
use crate::types::round_to;

use super::{Change, Diff, Reduction};

/// Weather condition ids the vendor is known to report, lowercased.
pub const WEATHER_CONDITIONS: [&str; 19] = [
    "sun",
    "cloudy_partly",
    "cloudy_mostly",
    "cloudy",
    "foggy",
    "drizzle",
    "scattered_rain",
    "rain",
    "rain_hail",
    "hail",
    "scattered_rain_snow",
    "rain_snow",
    "scattered_snow",
    "snow",
    "freezing",
    "windy",
    "thunderstorm",
    "night_clear",
    "night_cloudy",
];

/// Turns an unknown condition id into display text.
///
/// ```
/// use tado_bridge::engine::humanize_condition;
///
/// assert_eq!(humanize_condition("sand_storm"), "Sand storm");
/// ```
#[must_use]
pub fn humanize_condition(id: &str) -> String {
    capitalize(&id.replace('_', " "))
}

/// Returns the display text of a lowercase condition id.
///
/// Known ids are translated; unknown ids are humanized.
#[must_use]
pub fn weather_label(id: &str, labels: &Labels) -> String {
    if WEATHER_CONDITIONS.contains(&id) {
        if let Some(label) = labels.weather_condition(id) {
            return label.to_string();
        }
    }
    humanize_condition(id)
}

/// Logs an unknown condition id once per transition to it.
///
/// Returns `true` when a warning was emitted.
fn report_unknown(id: &str, change: &Change) -> bool {
    if *change == Change::Unchanged || WEATHER_CONDITIONS.contains(&id) {
        return false;
    }
    tracing::warn!(condition = id, "Unknown weather condition");
    true
}

/// Derives outside temperature, solar intensity and weather condition.
#[must_use]
pub fn reduce_weather(
    capabilities: &Capabilities,
    published: &PublishedState,
    weather: &Weather,
    labels: &Labels,
) -> Reduction {
    let mut diff = Diff::new(capabilities, published);

    if let Some(temperature) = weather.outside_temperature.as_ref() {
        let value = round_to(temperature.celsius, 1);
        if diff.set(Capability::OutsideTemperature, value).is_changed() {
            diff.fire(
                EventNotification::new(Trigger::OutsideTemperature).with_token("temperature", value),
            );
        }
    }

    if let Some(intensity) = weather.solar_intensity.as_ref() {
        let value = round_to(intensity.percentage, 0);
        if diff.set(Capability::SolarIntensity, value).is_changed() {
            diff.fire(
                EventNotification::new(Trigger::SolarIntensity).with_token("intensity", value),
            );
        }
    }

    if let Some(condition) = weather.condition() {
        let id = condition.to_lowercase();
        let label = weather_label(&id, labels);
        let change = diff.set(Capability::WeatherState, label);
        report_unknown(&id, &change);
        if change.is_changed() {
            diff.fire(EventNotification::new(Trigger::Weather).with_state("weather_id", id));
        }
    }

    diff.finish()
}
