// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone capabilities payload (`GET /homes/{home}/zones/{zone}/capabilities`).

use serde::{Deserialize, Serialize};

use crate::types::{ZoneKind, round_to};

/// Setpoint range defaults for air conditioning without reported ranges.
const AC_DEFAULT_MIN: f64 = 16.0;
const AC_DEFAULT_MAX: f64 = 30.0;

/// What a zone accepts as setting.
///
/// Heating and hot water report one `temperatures` block. Air conditioning
/// reports one block per supported mode.
///
/// # Examples
///
/// ```
/// use tado_bridge::response::ZoneCapabilities;
///
/// let json = r#"{"type": "HEATING",
///                "temperatures": {"celsius": {"min": 5, "max": 25, "step": 0.1}}}"#;
/// let caps: ZoneCapabilities = serde_json::from_str(json).unwrap();
/// let options = caps.temperature_options();
/// assert_eq!(options.first().unwrap().label, "5.0 °C");
/// assert_eq!(options.len(), 41);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCapabilities {
    /// Zone type.
    #[serde(rename = "type")]
    pub kind: Option<ZoneKind>,
    /// Setpoint range (heating, hot water).
    pub temperatures: Option<TemperatureRanges>,
    /// Hot water: the boiler accepts a setpoint (otherwise on/off only).
    pub can_set_temperature: Option<bool>,
    /// Air conditioning: cooling.
    #[serde(rename = "COOL")]
    pub cool: Option<AcModeCapabilities>,
    /// Air conditioning: heating.
    #[serde(rename = "HEAT")]
    pub heat: Option<AcModeCapabilities>,
    /// Air conditioning: dehumidifying.
    #[serde(rename = "DRY")]
    pub dry: Option<AcModeCapabilities>,
    /// Air conditioning: fan only.
    #[serde(rename = "FAN")]
    pub fan: Option<AcModeCapabilities>,
    /// Air conditioning: automatic.
    #[serde(rename = "AUTO")]
    pub auto: Option<AcModeCapabilities>,
}

/// Setpoint ranges per unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureRanges {
    /// Range in °C.
    pub celsius: Option<TemperatureRange>,
}

/// An inclusive setpoint range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureRange {
    /// Lowest setpoint.
    pub min: f64,
    /// Highest setpoint.
    pub max: f64,
    /// Step between setpoints.
    pub step: Option<f64>,
}

/// Capabilities of one air-conditioning mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcModeCapabilities {
    /// Setpoint range in this mode.
    pub temperatures: Option<TemperatureRanges>,
    /// Supported fan speeds.
    pub fan_speeds: Option<Vec<String>>,
}

impl AcModeCapabilities {
    fn celsius(&self) -> Option<TemperatureRange> {
        self.temperatures.and_then(|t| t.celsius)
    }
}

/// One selectable setpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureOption {
    /// Display text, for example `21.5 °C`.
    pub label: String,
    /// Setpoint in °C.
    pub celsius: f64,
}

impl ZoneCapabilities {
    /// Returns `true` if the zone accepts a setpoint.
    ///
    /// Only hot water can lack one; a missing flag counts as supported.
    #[must_use]
    pub fn supports_temperature(&self) -> bool {
        self.can_set_temperature.unwrap_or(true)
    }

    /// Returns the accepted setpoint range.
    ///
    /// Air conditioning reports ranges per mode; `mode` is matched case
    /// insensitively and ignored for other zones.
    #[must_use]
    pub fn celsius_range(&self, mode: Option<&str>) -> Option<TemperatureRange> {
        if self.kind != Some(ZoneKind::AirConditioning) {
            return self.temperatures.and_then(|t| t.celsius);
        }
        let caps = match mode?.to_ascii_uppercase().as_str() {
            "COOL" => self.cool.as_ref(),
            "HEAT" => self.heat.as_ref(),
            "DRY" => self.dry.as_ref(),
            "FAN" => self.fan.as_ref(),
            "AUTO" => self.auto.as_ref(),
            _ => None,
        };
        caps.and_then(AcModeCapabilities::celsius)
    }

    /// Returns the air-conditioning modes the zone supports, capitalized
    /// (`Cool`, `Heat`, `Fan`, `Dry`, `Auto`).
    #[must_use]
    pub fn ac_modes(&self) -> Vec<&'static str> {
        [
            (&self.cool, "Cool"),
            (&self.heat, "Heat"),
            (&self.fan, "Fan"),
            (&self.dry, "Dry"),
            (&self.auto, "Auto"),
        ]
        .into_iter()
        .filter_map(|(caps, name)| caps.as_ref().map(|_| name))
        .collect()
    }

    /// Returns the selectable setpoints.
    ///
    /// Air conditioning spans `COOL.min..=HEAT.max` in whole degrees
    /// (defaults 16..=30). Other zones use their reported range; steps
    /// below one degree are offered in half degrees.
    #[must_use]
    pub fn temperature_options(&self) -> Vec<TemperatureOption> {
        let (min, max, step) = if self.kind == Some(ZoneKind::AirConditioning) {
            let min = self
                .cool
                .as_ref()
                .and_then(AcModeCapabilities::celsius)
                .map_or(AC_DEFAULT_MIN, |r| r.min);
            let max = self
                .heat
                .as_ref()
                .and_then(AcModeCapabilities::celsius)
                .map_or(AC_DEFAULT_MAX, |r| r.max);
            (min, max, 1.0)
        } else {
            match self.temperatures.and_then(|t| t.celsius) {
                Some(range) => (range.min, range.max, range.step.unwrap_or(1.0)),
                None => return Vec::new(),
            }
        };

        let (step, decimals) = if step < 1.0 { (0.5, 1) } else { (step, 0) };
        let mut options = Vec::new();
        let mut index = 0u32;
        loop {
            let celsius = round_to(min + f64::from(index) * step, 1);
            if celsius > max {
                break;
            }
            options.push(TemperatureOption {
                label: format!("{celsius:.decimals$} °C"),
                celsius,
            });
            index += 1;
        }
        options
    }
}
