// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration types for the device manager.

use std::time::Duration;

use crate::capabilities::Capabilities;
use crate::types::ZoneKind;

/// Configuration for a managed device.
///
/// A device is either one zone of a home or the virtual home device that
/// carries weather and presence.
///
/// # Examples
///
/// ```
/// use tado_bridge::manager::{DeviceConfig, PollIntervals};
/// use tado_bridge::types::ZoneKind;
/// use std::time::Duration;
///
/// let living = DeviceConfig::zone(12345, 1, ZoneKind::Heating).with_name("Living room");
/// assert_eq!(living.display_name(), "Living room");
///
/// let home = DeviceConfig::home(12345)
///     .with_intervals(PollIntervals::default().with_weather(Duration::from_secs(300)));
/// assert_eq!(home.kind, ZoneKind::Home);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    /// Home the device belongs to.
    pub home_id: u64,
    /// Zone id; `0` for the home device.
    pub zone_id: u32,
    /// Zone kind.
    pub kind: ZoneKind,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional capability set (derived from the kind if not provided).
    pub capabilities: Option<Capabilities>,
    /// Poll periods.
    pub intervals: PollIntervals,
}

impl DeviceConfig {
    /// Creates a configuration for one zone.
    #[must_use]
    pub fn zone(home_id: u64, zone_id: u32, kind: ZoneKind) -> Self {
        Self {
            home_id,
            zone_id,
            kind,
            name: None,
            capabilities: None,
            intervals: PollIntervals::default(),
        }
    }

    /// Creates a configuration for the virtual home device.
    #[must_use]
    pub fn home(home_id: u64) -> Self {
        Self::zone(home_id, 0, ZoneKind::Home)
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the device capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Sets the poll periods.
    #[must_use]
    pub fn with_intervals(mut self, intervals: PollIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// Returns the configured capabilities or the default set of the kind.
    #[must_use]
    pub fn resolved_capabilities(&self) -> Capabilities {
        self.capabilities
            .clone()
            .unwrap_or_else(|| Capabilities::for_kind(self.kind))
    }

    /// Returns the display name, falling back to `<kind> <zone>`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None if self.kind == ZoneKind::Home => "Home".to_string(),
            None => format!("{} {}", self.kind, self.zone_id),
        }
    }
}

/// Periods of the poll tasks of one device.
///
/// The presence poll of the home device runs with the state period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    /// Zone state (home device: presence).
    pub state: Duration,
    /// Zone membership and battery levels.
    pub zone_info: Duration,
    /// Outside weather (home device only).
    pub weather: Duration,
    /// Simulated battery percentage.
    pub battery_blink: Duration,
}

impl PollIntervals {
    /// Default zone state period.
    pub const DEFAULT_STATE: Duration = Duration::from_secs(7);
    /// Default zone info period.
    pub const DEFAULT_ZONE_INFO: Duration = Duration::from_secs(60);
    /// Default weather period.
    pub const DEFAULT_WEATHER: Duration = Duration::from_secs(60);
    /// Default battery blink period.
    pub const DEFAULT_BATTERY_BLINK: Duration = Duration::from_secs(30);

    /// Sets the zone state period.
    #[must_use]
    pub fn with_state(mut self, period: Duration) -> Self {
        self.state = period;
        self
    }

    /// Sets the zone info period.
    #[must_use]
    pub fn with_zone_info(mut self, period: Duration) -> Self {
        self.zone_info = period;
        self
    }

    /// Sets the weather period.
    #[must_use]
    pub fn with_weather(mut self, period: Duration) -> Self {
        self.weather = period;
        self
    }

    /// Sets the battery blink period.
    #[must_use]
    pub fn with_battery_blink(mut self, period: Duration) -> Self {
        self.battery_blink = period;
        self
    }
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            state: Self::DEFAULT_STATE,
            zone_info: Self::DEFAULT_ZONE_INFO,
            weather: Self::DEFAULT_WEATHER,
            battery_blink: Self::DEFAULT_BATTERY_BLINK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CapabilitiesBuilder, Capability};

    #[test]
    fn zone_defaults() {
        let config = DeviceConfig::zone(1, 4, ZoneKind::HotWater);
        assert_eq!(config.intervals, PollIntervals::default());
        assert_eq!(config.intervals.state, Duration::from_secs(7));
        assert!(config.name.is_none());
        assert_eq!(
            config.resolved_capabilities(),
            Capabilities::for_kind(ZoneKind::HotWater)
        );
    }

    #[test]
    fn capability_override() {
        let caps = CapabilitiesBuilder::from_kind(ZoneKind::Heating)
            .without(Capability::MeasureHumidity)
            .build();
        let config = DeviceConfig::zone(1, 2, ZoneKind::Heating).with_capabilities(caps.clone());
        assert_eq!(config.resolved_capabilities(), caps);
    }

    #[test]
    fn home_device() {
        let config = DeviceConfig::home(99);
        assert_eq!(config.zone_id, 0);
        assert_eq!(config.display_name(), "Home");
    }

    #[test]
    fn interval_builders() {
        let intervals = PollIntervals::default()
            .with_state(Duration::from_secs(10))
            .with_battery_blink(Duration::from_secs(5));
        assert_eq!(intervals.state, Duration::from_secs(10));
        assert_eq!(intervals.battery_blink, Duration::from_secs(5));
        assert_eq!(intervals.zone_info, PollIntervals::DEFAULT_ZONE_INFO);
    }
}
