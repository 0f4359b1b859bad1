// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone kinds exposed as devices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// The kind of device a zone is exposed as.
///
/// The first three map one-to-one onto the vendor zone types. `Home` is the
/// virtual device carrying weather and presence for the whole home.
///
/// # Examples
///
/// ```
/// use tado_bridge::types::ZoneKind;
///
/// let kind: ZoneKind = "HOT_WATER".parse().unwrap();
/// assert_eq!(kind, ZoneKind::HotWater);
/// assert_eq!(kind.off_temperature(), Some(30.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneKind {
    /// Radiator valves and wall thermostats.
    Heating,
    /// Domestic hot water.
    HotWater,
    /// Air-conditioning units controlled through a smart AC control.
    AirConditioning,
    /// Virtual whole-home device (weather, presence).
    #[serde(rename = "TADO_HOME")]
    Home,
}

impl ZoneKind {
    /// Returns the vendor identifier for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Heating => "HEATING",
            Self::HotWater => "HOT_WATER",
            Self::AirConditioning => "AIR_CONDITIONING",
            Self::Home => "TADO_HOME",
        }
    }

    /// Target temperature shown while the zone is switched off.
    ///
    /// Air conditioning keeps its last published setpoint, so it has none.
    #[must_use]
    pub const fn off_temperature(&self) -> Option<f64> {
        match self {
            Self::Heating => Some(5.0),
            Self::HotWater => Some(30.0),
            Self::AirConditioning | Self::Home => None,
        }
    }

    /// Returns `true` for kinds backed by a real vendor zone.
    #[must_use]
    pub const fn is_zone(&self) -> bool {
        !matches!(self, Self::Home)
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEATING" => Ok(Self::Heating),
            "HOT_WATER" => Ok(Self::HotWater),
            "AIR_CONDITIONING" => Ok(Self::AirConditioning),
            "TADO_HOME" | "HOME" => Ok(Self::Home),
            _ => Err(ParseError::InvalidValue {
                field: "zone type".to_string(),
                message: format!("unknown zone type: {s}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_case_insensitive() {
        assert_eq!("heating".parse::<ZoneKind>().unwrap(), ZoneKind::Heating);
        assert_eq!(
            "AIR_CONDITIONING".parse::<ZoneKind>().unwrap(),
            ZoneKind::AirConditioning
        );
        assert_eq!("tado_home".parse::<ZoneKind>().unwrap(), ZoneKind::Home);
        assert!("BOILER".parse::<ZoneKind>().is_err());
    }

    #[test]
    fn serde_uses_vendor_names() {
        let json = serde_json::to_string(&ZoneKind::Home).unwrap();
        assert_eq!(json, "\"TADO_HOME\"");
        let kind: ZoneKind = serde_json::from_str("\"HOT_WATER\"").unwrap();
        assert_eq!(kind, ZoneKind::HotWater);
    }

    #[test]
    fn off_temperatures() {
        assert_eq!(ZoneKind::Heating.off_temperature(), Some(5.0));
        assert_eq!(ZoneKind::HotWater.off_temperature(), Some(30.0));
        assert_eq!(ZoneKind::AirConditioning.off_temperature(), None);
    }
}
