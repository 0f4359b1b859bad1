// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mobile device payload (`GET /homes/{home}/mobileDevices`).

use serde::{Deserialize, Serialize};

/// A phone or tablet registered for geofencing.
///
/// `location` is `null` when the device has not reported a fix for an
/// extended period, and is absent altogether when tracking is disabled.
///
/// # Examples
///
/// ```
/// use tado_bridge::response::MobileDevice;
///
/// let json = r#"{
///     "id": 42, "name": "Phone",
///     "settings": {"geoTrackingEnabled": true},
///     "location": {
///         "stale": false, "atHome": false,
///         "bearingFromHome": {"degrees": 90.0, "radians": 1.5708},
///         "relativeDistanceFromHomeFence": 0.3
///     }
/// }"#;
/// let dev: MobileDevice = serde_json::from_str(json).unwrap();
/// assert!(dev.tracking_enabled());
/// assert!(!dev.location.unwrap().at_home);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDevice {
    /// Device identifier.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Device settings.
    #[serde(default)]
    pub settings: MobileSettings,
    /// Last known location.
    pub location: Option<MobileLocation>,
    /// Platform information.
    pub device_metadata: Option<DeviceMetadata>,
}

impl MobileDevice {
    /// Returns `true` if location based control is enabled.
    #[must_use]
    pub fn tracking_enabled(&self) -> bool {
        self.settings.geo_tracking_enabled
    }
}

/// Mobile device settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileSettings {
    /// Location based control enabled.
    #[serde(default)]
    pub geo_tracking_enabled: bool,
}

/// A geofence fix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileLocation {
    /// The fix is outdated.
    #[serde(default)]
    pub stale: bool,
    /// Inside the home fence.
    #[serde(default)]
    pub at_home: bool,
    /// Direction from home.
    #[serde(default)]
    pub bearing_from_home: Bearing,
    /// Normalized distance from the home fence, `0..=1`.
    #[serde(default)]
    pub relative_distance_from_home_fence: f64,
}

/// Direction from home.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bearing {
    /// Degrees.
    pub degrees: f64,
    /// Radians.
    pub radians: f64,
}

/// Platform information of a mobile device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    /// `Android` or `iOS`.
    pub platform: Option<String>,
    /// OS version.
    pub os_version: Option<String>,
    /// Hardware model.
    pub model: Option<String>,
    /// Locale.
    pub locale: Option<String>,
}
