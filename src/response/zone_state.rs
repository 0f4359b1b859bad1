// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone state payload (`GET /homes/{home}/zones/{zone}/state`).

use serde::{Deserialize, Serialize};

use crate::types::ZoneKind;

/// Current state of one zone.
///
/// Every block is optional: a missing block only disables the capabilities
/// derived from it for the current poll.
///
/// # Examples
///
/// ```
/// use tado_bridge::response::{Power, ZoneState};
///
/// let json = r#"{
///     "setting": {"type": "HEATING", "power": "ON", "temperature": {"celsius": 21.0}},
///     "overlayType": null,
///     "overlay": null,
///     "openWindow": null,
///     "sensorDataPoints": {
///         "insideTemperature": {"celsius": 20.46},
///         "humidity": {"percentage": 48.3}
///     }
/// }"#;
/// let state: ZoneState = serde_json::from_str(json).unwrap();
/// assert_eq!(state.power(), Some(Power::On));
/// assert_eq!(state.inside_temperature(), Some(20.46));
/// assert!(!state.is_window_open());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneState {
    /// Effective setting (schedule or overlay).
    pub setting: Option<ZoneSetting>,
    /// `MANUAL` when an overlay is active, `null` on schedule.
    pub overlay_type: Option<String>,
    /// Active overlay, if any.
    pub overlay: Option<ZoneOverlay>,
    /// Present (non-null) while an open window is detected.
    pub open_window: Option<serde_json::Value>,
    /// Derived activity (heating power).
    pub activity_data_points: Option<ActivityDataPoints>,
    /// Sensor readings.
    pub sensor_data_points: Option<SensorDataPoints>,
    /// Connection state of the zone.
    pub link: Option<Link>,
}

impl ZoneState {
    /// Returns the power state of the current setting.
    #[must_use]
    pub fn power(&self) -> Option<Power> {
        self.setting.as_ref().and_then(|s| s.power)
    }

    /// Returns the measured inside temperature in °C.
    #[must_use]
    pub fn inside_temperature(&self) -> Option<f64> {
        self.sensor_data_points
            .as_ref()
            .and_then(|s| s.inside_temperature.as_ref())
            .map(|t| t.celsius)
    }

    /// Returns the measured relative humidity in percent.
    #[must_use]
    pub fn humidity(&self) -> Option<f64> {
        self.sensor_data_points
            .as_ref()
            .and_then(|s| s.humidity.as_ref())
            .map(|h| h.percentage)
    }

    /// Returns the heating power in percent.
    #[must_use]
    pub fn heating_power(&self) -> Option<f64> {
        self.activity_data_points
            .as_ref()
            .and_then(|a| a.heating_power.as_ref())
            .map(|h| h.percentage)
    }

    /// Returns `true` while an open window is detected.
    #[must_use]
    pub fn is_window_open(&self) -> bool {
        self.open_window.as_ref().is_some_and(|w| !w.is_null())
    }

    /// Returns `true` unless a manual overlay is active.
    #[must_use]
    pub fn is_smart_schedule(&self) -> bool {
        self.overlay_type.as_deref() != Some("MANUAL")
    }

    /// Returns the termination of the active overlay.
    #[must_use]
    pub fn termination(&self) -> Option<&OverlayTermination> {
        self.overlay.as_ref().and_then(|o| o.termination.as_ref())
    }
}

/// A zone setting, as reported and as sent in overlays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSetting {
    /// Zone type of the setting.
    #[serde(rename = "type")]
    pub kind: Option<ZoneKind>,
    /// Power state.
    pub power: Option<Power>,
    /// Target temperature; absent or null when off.
    pub temperature: Option<Temperature>,
    /// Air-conditioning mode (`COOL`, `HEAT`, `DRY`, `FAN`, `AUTO`).
    pub mode: Option<String>,
}

/// Power state of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Power {
    /// Zone is on.
    On,
    /// Zone is off.
    Off,
    /// Any value this crate does not know.
    #[serde(other)]
    Unknown,
}

impl Power {
    /// Returns the vendor identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A temperature reading or setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Temperature {
    /// Degrees Celsius.
    pub celsius: f64,
    /// Degrees Fahrenheit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fahrenheit: Option<f64>,
}

impl Temperature {
    /// Creates a Celsius-only temperature.
    #[must_use]
    pub const fn celsius(celsius: f64) -> Self {
        Self {
            celsius,
            fahrenheit: None,
        }
    }
}

/// A percentage reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percentage {
    /// Value in percent.
    pub percentage: f64,
}

/// Active manual override of the schedule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneOverlay {
    /// Overlay type, usually `MANUAL`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Setting applied by the overlay.
    pub setting: Option<ZoneSetting>,
    /// When the overlay ends.
    pub termination: Option<OverlayTermination>,
}

/// Termination policy of an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayTermination {
    /// Termination kind.
    #[serde(rename = "type")]
    pub kind: TerminationKind,
    /// Configured timer duration.
    pub duration_in_seconds: Option<u64>,
    /// Remaining timer duration.
    pub remaining_time_in_seconds: Option<u64>,
}

/// How an overlay ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationKind {
    /// Until cleared by the user.
    Manual,
    /// After a fixed duration.
    Timer,
    /// Until the next schedule block.
    #[serde(alias = "NEXT_TIME_BLOCK")]
    TadoMode,
    /// Any value this crate does not know.
    #[serde(other)]
    Unknown,
}

/// Sensor readings of a zone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataPoints {
    /// Inside temperature.
    pub inside_temperature: Option<Temperature>,
    /// Relative humidity.
    pub humidity: Option<Percentage>,
}

/// Derived activity of a zone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDataPoints {
    /// Heating power.
    pub heating_power: Option<Percentage>,
}

/// Connection state of a zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    /// `ONLINE` or `OFFLINE`.
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ac_timer_overlay() {
        let json = r#"{
            "setting": {"type": "AIR_CONDITIONING", "power": "ON", "mode": "COOL",
                        "temperature": {"celsius": 22.0, "fahrenheit": 71.6}},
            "overlayType": "MANUAL",
            "overlay": {
                "type": "MANUAL",
                "setting": {"type": "AIR_CONDITIONING", "power": "ON", "mode": "COOL"},
                "termination": {"type": "TIMER", "durationInSeconds": 900,
                                "remainingTimeInSeconds": 297}
            },
            "openWindow": null,
            "link": {"state": "ONLINE"}
        }"#;
        let state: ZoneState = serde_json::from_str(json).unwrap();
        let termination = state.termination().unwrap();
        assert_eq!(termination.kind, TerminationKind::Timer);
        assert_eq!(termination.remaining_time_in_seconds, Some(297));
        assert!(!state.is_smart_schedule());
        assert_eq!(
            state.setting.as_ref().unwrap().kind,
            Some(ZoneKind::AirConditioning)
        );
    }

    #[test]
    fn open_window_object_counts_as_open() {
        let json = r#"{"openWindow": {"detectedTime": "2024-01-01T00:00:00Z",
                                      "durationInSeconds": 900}}"#;
        let state: ZoneState = serde_json::from_str(json).unwrap();
        assert!(state.is_window_open());
    }

    #[test]
    fn unknown_enum_values_do_not_fail() {
        let json = r#"{
            "setting": {"type": "HEATING", "power": "STANDBY"},
            "overlay": {"termination": {"type": "SOMETHING_NEW"}}
        }"#;
        let state: ZoneState = serde_json::from_str(json).unwrap();
        assert_eq!(state.power(), Some(Power::Unknown));
        assert_eq!(state.termination().unwrap().kind, TerminationKind::Unknown);
    }

    #[test]
    fn empty_state_has_no_readings() {
        let state: ZoneState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.inside_temperature(), None);
        assert_eq!(state.heating_power(), None);
        assert!(state.is_smart_schedule());
    }
}
