// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Overlay commands.

use serde::{Serialize, Serializer};

use crate::error::ValueError;
use crate::response::{Power, Temperature};
use crate::types::{ZoneKind, parse_timer};

/// When an overlay ends.
///
/// # Examples
///
/// ```
/// use tado_bridge::command::Termination;
///
/// let json = serde_json::to_value(Termination::timer("00:30").unwrap()).unwrap();
/// assert_eq!(json, serde_json::json!({"type": "TIMER", "durationInSeconds": 1800}));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Termination {
    /// Until the user resumes the schedule.
    #[default]
    Manual,
    /// For a fixed duration.
    Timer {
        /// Duration in seconds.
        #[serde(rename = "durationInSeconds")]
        duration_in_seconds: u32,
    },
    /// Until the next schedule block.
    TadoMode,
}

impl Termination {
    /// Creates a timer termination from an `HH:MM` argument.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidTimer`] if the argument is malformed.
    pub fn timer(hh_mm: &str) -> Result<Self, ValueError> {
        parse_timer(hh_mm).map(|duration_in_seconds| Self::Timer {
            duration_in_seconds,
        })
    }
}

/// The setpoint field of an overlay setting.
///
/// The API distinguishes an absent field from an explicit `null`: on/off
/// overlays for hot water without a thermostat must send `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Setpoint {
    /// Field is left out.
    #[default]
    Omitted,
    /// Field is sent as `null`.
    Null,
    /// Field carries a temperature.
    Celsius(f64),
}

impl Setpoint {
    fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }
}

impl Serialize for Setpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Omitted | Self::Null => serializer.serialize_none(),
            Self::Celsius(celsius) => Temperature::celsius(*celsius).serialize(serializer),
        }
    }
}

/// Setting applied by an overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySetting {
    /// Zone type.
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    /// Power state.
    pub power: Power,
    /// Air-conditioning mode, upper case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Setpoint.
    #[serde(skip_serializing_if = "Setpoint::is_omitted")]
    pub temperature: Setpoint,
}

/// Body of `PUT /homes/{home}/zones/{zone}/overlay`.
///
/// # Examples
///
/// ```
/// use tado_bridge::command::{OverlayCommand, Termination};
/// use tado_bridge::types::ZoneKind;
///
/// let cmd = OverlayCommand::power_on(ZoneKind::Heating)
///     .with_temperature(21.5)
///     .until(Termination::TadoMode);
/// assert_eq!(
///     serde_json::to_value(&cmd).unwrap(),
///     serde_json::json!({
///         "setting": {"type": "HEATING", "power": "ON", "temperature": {"celsius": 21.5}},
///         "termination": {"type": "TADO_MODE"}
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayCommand {
    /// Overlay type; `MANUAL` for setpoint overlays.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub overlay_type: Option<String>,
    /// Setting to apply.
    pub setting: OverlaySetting,
    /// When the overlay ends.
    pub termination: Termination,
}

impl OverlayCommand {
    /// Creates a manual overlay with the given power state.
    #[must_use]
    pub fn new(kind: ZoneKind, power: Power) -> Self {
        Self {
            overlay_type: None,
            setting: OverlaySetting {
                kind,
                power,
                mode: None,
                temperature: Setpoint::Omitted,
            },
            termination: Termination::Manual,
        }
    }

    /// Creates an overlay switching the zone on.
    #[must_use]
    pub fn power_on(kind: ZoneKind) -> Self {
        Self::new(kind, Power::On)
    }

    /// Creates an overlay switching the zone off.
    #[must_use]
    pub fn power_off(kind: ZoneKind) -> Self {
        Self::new(kind, Power::Off)
    }

    /// Sets the setpoint in °C.
    #[must_use]
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.setting.temperature = Setpoint::Celsius(celsius);
        self
    }

    /// Sends the setpoint as explicit `null`.
    #[must_use]
    pub fn with_null_temperature(mut self) -> Self {
        self.setting.temperature = Setpoint::Null;
        self
    }

    /// Sets the air-conditioning mode (`Cool`, `HEAT`, ...).
    #[must_use]
    pub fn with_mode(mut self, mode: &str) -> Self {
        self.setting.mode = Some(mode.to_ascii_uppercase());
        self
    }

    /// Marks the overlay as a `MANUAL` setpoint overlay.
    #[must_use]
    pub fn manual(mut self) -> Self {
        self.overlay_type = Some("MANUAL".to_string());
        self
    }

    /// Sets the termination.
    #[must_use]
    pub fn until(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }
}
