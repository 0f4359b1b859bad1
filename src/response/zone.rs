// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone listing payload (`GET /homes/{home}/zones`).

use serde::{Deserialize, Serialize};

/// One zone with its member hardware.
///
/// # Examples
///
/// ```
/// use tado_bridge::response::Zone;
///
/// let json = r#"[{
///     "id": 1, "name": "Living room", "type": "HEATING",
///     "devices": [
///         {"serialNo": "RU01234567", "deviceType": "RU02", "batteryState": "NORMAL"},
///         {"serialNo": "VA01234567", "deviceType": "VA02", "batteryState": "LOW"}
///     ]
/// }]"#;
/// let zones: Vec<Zone> = serde_json::from_str(json).unwrap();
/// assert_eq!(zones[0].devices.len(), 2);
/// assert_eq!(zones[0].devices[1].type_prefix(), "VA");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Zone identifier, unique within a home.
    pub id: u32,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Vendor zone type.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Member hardware.
    #[serde(default)]
    pub devices: Vec<SubDevice>,
}

/// A physical device that belongs to a zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubDevice {
    /// Full serial number.
    pub serial_no: String,
    /// Short serial number.
    pub short_serial_no: Option<String>,
    /// Hardware type, for example `VA02`.
    pub device_type: Option<String>,
    /// Battery level (`NORMAL`, `LOW`); absent for mains-powered hardware.
    pub battery_state: Option<String>,
}

impl SubDevice {
    /// Returns the two-character hardware class taken from the serial
    /// number (`RU` wall thermostat, `VA` radiator valve, ...).
    #[must_use]
    pub fn type_prefix(&self) -> &str {
        self.serial_no.get(..2).unwrap_or(&self.serial_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mains_powered_device_has_no_battery() {
        let json = r#"{"serialNo": "BU01234567", "deviceType": "BU01"}"#;
        let dev: SubDevice = serde_json::from_str(json).unwrap();
        assert!(dev.battery_state.is_none());
        assert_eq!(dev.type_prefix(), "BU");
    }

    #[test]
    fn short_serial_prefix() {
        let dev = SubDevice {
            serial_no: "V".to_string(),
            ..SubDevice::default()
        };
        assert_eq!(dev.type_prefix(), "V");
    }
}
