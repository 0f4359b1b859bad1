// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payloads of the remote API.
//!
//! This module provides structures for deserializing the JSON returned by
//! the API. Blocks the engine derives capabilities from are optional so a
//! missing field disables one capability instead of failing the poll.

mod home;
mod mobile;
mod weather;
mod zone;
mod zone_capabilities;
mod zone_control;
mod zone_state;

pub use home::{Home, HomeRef, Me};
pub use mobile::{Bearing, DeviceMetadata, MobileDevice, MobileLocation, MobileSettings};
pub use weather::{Weather, WeatherState};
pub use zone::{SubDevice, Zone};
pub use zone_capabilities::{
    AcModeCapabilities, TemperatureOption, TemperatureRange, TemperatureRanges, ZoneCapabilities,
};
pub use zone_control::ZoneControl;
pub use zone_state::{
    ActivityDataPoints, Link, OverlayTermination, Percentage, Power, SensorDataPoints,
    Temperature, TerminationKind, ZoneOverlay, ZoneSetting, ZoneState,
};
