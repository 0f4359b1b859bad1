// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last processed API responses of a device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::{SubDevice, Weather, ZoneState};
use crate::types::ZoneKind;

/// Immutable record of what the last successful polls returned.
///
/// Never mutated in place: each `with_*` method returns a new snapshot that
/// replaces the previous one once the diff it belongs to has been applied.
///
/// # Examples
///
/// ```
/// use tado_bridge::response::ZoneState;
/// use tado_bridge::state::DeviceSnapshot;
/// use tado_bridge::types::ZoneKind;
///
/// let empty = DeviceSnapshot::new(1, ZoneKind::Heating);
/// let next = empty.with_zone_state(ZoneState::default());
/// assert!(empty.zone_state().is_none());
/// assert!(next.zone_state().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    zone_id: u32,
    kind: ZoneKind,
    zone_state: Option<ZoneState>,
    weather: Option<Weather>,
    sub_devices: Vec<SubDevice>,
    taken_at: Option<DateTime<Utc>>,
}

impl DeviceSnapshot {
    /// Creates an empty snapshot for a zone.
    #[must_use]
    pub fn new(zone_id: u32, kind: ZoneKind) -> Self {
        Self {
            zone_id,
            kind,
            zone_state: None,
            weather: None,
            sub_devices: Vec::new(),
            taken_at: None,
        }
    }

    /// Zone identifier.
    #[must_use]
    pub fn zone_id(&self) -> u32 {
        self.zone_id
    }

    /// Zone kind.
    #[must_use]
    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// Last zone state.
    #[must_use]
    pub fn zone_state(&self) -> Option<&ZoneState> {
        self.zone_state.as_ref()
    }

    /// Last weather report.
    #[must_use]
    pub fn weather(&self) -> Option<&Weather> {
        self.weather.as_ref()
    }

    /// Last known member hardware.
    #[must_use]
    pub fn sub_devices(&self) -> &[SubDevice] {
        &self.sub_devices
    }

    /// When the snapshot was last replaced.
    #[must_use]
    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.taken_at
    }

    /// Returns `true` before the first successful poll.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taken_at.is_none()
    }

    /// Returns a snapshot with a new zone state.
    #[must_use]
    pub fn with_zone_state(&self, state: ZoneState) -> Self {
        Self {
            zone_state: Some(state),
            taken_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Returns a snapshot with a new weather report.
    #[must_use]
    pub fn with_weather(&self, weather: Weather) -> Self {
        Self {
            weather: Some(weather),
            taken_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Returns a snapshot with new member hardware.
    #[must_use]
    pub fn with_sub_devices(&self, devices: Vec<SubDevice>) -> Self {
        Self {
            sub_devices: devices,
            taken_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_keeps_other_parts() {
        let snapshot = DeviceSnapshot::new(3, ZoneKind::Heating)
            .with_sub_devices(vec![SubDevice {
                serial_no: "VA123".to_string(),
                ..SubDevice::default()
            }])
            .with_zone_state(ZoneState::default());

        assert_eq!(snapshot.zone_id(), 3);
        assert_eq!(snapshot.sub_devices().len(), 1);
        assert!(snapshot.zone_state().is_some());
        assert!(snapshot.weather().is_none());
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn new_snapshot_is_empty() {
        let snapshot = DeviceSnapshot::new(0, ZoneKind::Home);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.kind(), ZoneKind::Home);
    }
}
