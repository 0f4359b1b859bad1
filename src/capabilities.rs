// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability sets per zone kind.
//!
//! A capability is a named, observable property a device exposes to the
//! host (measured temperature, on/off, battery status, ...). The engine only
//! derives and publishes capabilities that are declared for the device, so
//! the set decides which parts of a snapshot are looked at.
//!
//! The defaults per [`ZoneKind`] match what the pairing flow declares; a
//! custom set can be built with [`Capabilities::builder`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::ZoneKind;

/// A capability a device can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Capability {
    /// Inside temperature, °C, one decimal.
    MeasureTemperature,
    /// Relative humidity, whole percent.
    MeasureHumidity,
    /// Heating power, whole percent.
    HeatingPower,
    /// Open window detected.
    DetectOpenWindow,
    /// Schedule active (no manual overlay).
    SmartHeating,
    /// Zone switched on.
    TargetOnOff,
    /// Setpoint, °C, one decimal.
    TargetTemperature,
    /// Air-conditioning mode label.
    AircoMode,
    /// Outside temperature, °C, one decimal.
    OutsideTemperature,
    /// Solar intensity, whole percent.
    SolarIntensity,
    /// Localized weather condition.
    WeatherState,
    /// Someone is home.
    PresenceStatus,
    /// Battery status text.
    BatteryState,
    /// Simulated battery percentage.
    MeasureBattery,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Self; 14] = [
        Self::MeasureTemperature,
        Self::MeasureHumidity,
        Self::HeatingPower,
        Self::DetectOpenWindow,
        Self::SmartHeating,
        Self::TargetOnOff,
        Self::TargetTemperature,
        Self::AircoMode,
        Self::OutsideTemperature,
        Self::SolarIntensity,
        Self::WeatherState,
        Self::PresenceStatus,
        Self::BatteryState,
        Self::MeasureBattery,
    ];

    /// Returns the capability name used by the host.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MeasureTemperature => "measure_temperature",
            Self::MeasureHumidity => "measure_humidity",
            Self::HeatingPower => "heating_power",
            Self::DetectOpenWindow => "detect_open_window",
            Self::SmartHeating => "smart_heating",
            Self::TargetOnOff => "target_onoff",
            Self::TargetTemperature => "target_temperature",
            Self::AircoMode => "airco_mode",
            Self::OutsideTemperature => "measure_temperature.outside",
            Self::SolarIntensity => "solar_intensity",
            Self::WeatherState => "weather_state",
            Self::PresenceStatus => "presence_status",
            Self::BatteryState => "battery_state",
            Self::MeasureBattery => "measure_battery",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ParseError::InvalidValue {
                field: "capability".to_string(),
                message: format!("unknown capability: {s}"),
            })
    }
}

impl TryFrom<String> for Capability {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Capability> for String {
    fn from(value: Capability) -> Self {
        value.name().to_string()
    }
}

/// The set of capabilities a device declares.
///
/// # Examples
///
/// ```
/// use tado_bridge::{Capabilities, Capability};
/// use tado_bridge::types::ZoneKind;
///
/// let heating = Capabilities::for_kind(ZoneKind::Heating);
/// assert!(heating.contains(Capability::HeatingPower));
/// assert!(!heating.contains(Capability::AircoMode));
///
/// // A radiator zone without wall thermostat or humidity sensor
/// let custom = Capabilities::builder()
///     .with(Capability::TargetTemperature)
///     .with(Capability::SmartHeating)
///     .build();
/// assert_eq!(custom.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<Capability>);

impl Capabilities {
    /// Returns the default set for a zone kind.
    #[must_use]
    pub fn for_kind(kind: ZoneKind) -> Self {
        match kind {
            ZoneKind::Heating => Self::heating(),
            ZoneKind::HotWater => Self::hot_water(),
            ZoneKind::AirConditioning => Self::air_conditioning(),
            ZoneKind::Home => Self::home(),
        }
    }

    /// Radiator valves and wall thermostats.
    #[must_use]
    pub fn heating() -> Self {
        Self::from_iter([
            Capability::MeasureTemperature,
            Capability::MeasureHumidity,
            Capability::HeatingPower,
            Capability::DetectOpenWindow,
            Capability::SmartHeating,
            Capability::TargetTemperature,
            Capability::BatteryState,
            Capability::MeasureBattery,
        ])
    }

    /// Domestic hot water.
    #[must_use]
    pub fn hot_water() -> Self {
        Self::from_iter([
            Capability::TargetOnOff,
            Capability::TargetTemperature,
            Capability::SmartHeating,
        ])
    }

    /// Smart AC control.
    #[must_use]
    pub fn air_conditioning() -> Self {
        Self::from_iter([
            Capability::MeasureTemperature,
            Capability::MeasureHumidity,
            Capability::DetectOpenWindow,
            Capability::SmartHeating,
            Capability::TargetOnOff,
            Capability::TargetTemperature,
            Capability::AircoMode,
        ])
    }

    /// Virtual whole-home device.
    #[must_use]
    pub fn home() -> Self {
        Self::from_iter([
            Capability::OutsideTemperature,
            Capability::SolarIntensity,
            Capability::WeatherState,
            Capability::PresenceStatus,
        ])
    }

    /// Starts an empty set.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::default()
    }

    /// Returns `true` if the capability is declared.
    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Returns `true` if any battery capability is declared.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.contains(Capability::BatteryState)
    }

    /// Returns the number of declared capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builder for a custom [`Capabilities`] set.
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    set: BTreeSet<Capability>,
}

impl CapabilitiesBuilder {
    /// Starts from the defaults of a zone kind.
    #[must_use]
    pub fn from_kind(kind: ZoneKind) -> Self {
        Self {
            set: Capabilities::for_kind(kind).0,
        }
    }

    /// Adds a capability.
    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        self.set.insert(capability);
        self
    }

    /// Removes a capability.
    #[must_use]
    pub fn without(mut self, capability: Capability) -> Self {
        self.set.remove(&capability);
        self
    }

    /// Builds the set.
    #[must_use]
    pub fn build(self) -> Capabilities {
        Capabilities(self.set)
    }
}
