// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trigger notifications.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Triggers a device can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Humidity changed. Tokens: `percentage`.
    Humidity,
    /// Heating power changed. Tokens: `percentage`.
    HeatingPower,
    /// Open window detection changed. Tokens: `detection`.
    DetectOpenWindow,
    /// Schedule active changed. Tokens: `detection`.
    SmartHeating,
    /// Zone switched on or off. Tokens: `is_on`.
    #[serde(rename = "target_onoff")]
    TargetOnOff,
    /// Air-conditioning mode changed. State: `mode`.
    AcModeChanged,
    /// Outside temperature changed. Tokens: `temperature`.
    OutsideTemperature,
    /// Solar intensity changed. Tokens: `intensity`.
    SolarIntensity,
    /// Weather condition changed. State: `weather_id`.
    Weather,
    /// Someone-home flag changed. Tokens: `presence`.
    PresenceStatus,
    /// Battery status changed. Tokens: `state`, `isOk`, `isNotOk`.
    BatteryStateChanged,
    /// Geo tracking toggled. Tokens: `mobile_geoTrackingEnabled`.
    MobileTrackingChanged,
    /// Location fix gained or lost. Tokens: `mobile_location`.
    MobileLocationNullChanged,
    /// At-home changed. Tokens: `mobile_athome`.
    #[serde(rename = "mobile_athome_changed")]
    MobileAtHomeChanged,
    /// Distance from the home fence changed. Tokens: `mobile_distance`,
    /// `mobile_kilometers`, `mobile_miles`.
    MobileDistanceChanged,
    /// Whole minutes since the last location change ticked.
    /// Tokens and state: `minutes_since_location`.
    MobileTimeSinceLocation,
}

impl Trigger {
    /// Returns the trigger id used by the host.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Humidity => "humidity",
            Self::HeatingPower => "heating_power",
            Self::DetectOpenWindow => "detect_open_window",
            Self::SmartHeating => "smart_heating",
            Self::TargetOnOff => "target_onoff",
            Self::AcModeChanged => "ac_mode_changed",
            Self::OutsideTemperature => "outside_temperature",
            Self::SolarIntensity => "solar_intensity",
            Self::Weather => "weather",
            Self::PresenceStatus => "presence_status",
            Self::BatteryStateChanged => "battery_state_changed",
            Self::MobileTrackingChanged => "mobile_tracking_changed",
            Self::MobileLocationNullChanged => "mobile_location_null_changed",
            Self::MobileAtHomeChanged => "mobile_athome_changed",
            Self::MobileDistanceChanged => "mobile_distance_changed",
            Self::MobileTimeSinceLocation => "mobile_time_since_location",
        }
    }

    /// Returns `true` for per-person triggers carrying `mobile_id` in their
    /// state.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        matches!(
            self,
            Self::MobileTrackingChanged
                | Self::MobileLocationNullChanged
                | Self::MobileAtHomeChanged
                | Self::MobileDistanceChanged
                | Self::MobileTimeSinceLocation
        )
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One fired trigger.
///
/// `tokens` are handed to the automation as values; `state` is matched
/// against trigger arguments (see [`crate::condition`]).
///
/// # Examples
///
/// ```
/// use tado_bridge::event::{EventNotification, Trigger};
///
/// let n = EventNotification::new(Trigger::Humidity).with_token("percentage", 54.0);
/// assert_eq!(n.token("percentage"), Some(&serde_json::json!(54.0)));
/// assert!(n.state.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventNotification {
    /// Which trigger fired.
    pub trigger: Trigger,
    /// Values exposed to the automation.
    pub tokens: Map<String, Value>,
    /// Values matched against trigger arguments.
    pub state: Map<String, Value>,
}

impl EventNotification {
    /// Creates a notification without tokens or state.
    #[must_use]
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            tokens: Map::new(),
            state: Map::new(),
        }
    }

    /// Adds a token.
    #[must_use]
    pub fn with_token(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.tokens.insert(key.to_string(), value.into());
        self
    }

    /// Adds a state entry.
    #[must_use]
    pub fn with_state(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.state.insert(key.to_string(), value.into());
        self
    }

    /// Returns a token.
    #[must_use]
    pub fn token(&self, key: &str) -> Option<&Value> {
        self.tokens.get(key)
    }

    /// Returns a state entry.
    #[must_use]
    pub fn state_value(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Returns the person id of a per-person notification.
    #[must_use]
    pub fn mobile_id(&self) -> Option<u64> {
        self.state.get("mobile_id").and_then(Value::as_u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_serde() {
        for trigger in [
            Trigger::TargetOnOff,
            Trigger::MobileAtHomeChanged,
            Trigger::AcModeChanged,
            Trigger::MobileTimeSinceLocation,
        ] {
            let json = serde_json::to_value(trigger).unwrap();
            assert_eq!(json, Value::String(trigger.name().to_string()));
        }
    }

    #[test]
    fn mobile_triggers() {
        assert!(Trigger::MobileDistanceChanged.is_mobile());
        assert!(!Trigger::PresenceStatus.is_mobile());
    }

    #[test]
    fn mobile_id_from_state() {
        let n = EventNotification::new(Trigger::MobileAtHomeChanged)
            .with_token("mobile_athome", true)
            .with_state("mobile_id", 42u64);
        assert_eq!(n.mobile_id(), Some(42));
        assert_eq!(n.token("mobile_athome"), Some(&Value::Bool(true)));
    }
}
