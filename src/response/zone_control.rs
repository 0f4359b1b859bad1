// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone control payload (`GET /homes/{home}/zones/{zone}/control[/{variant}]`).

use serde::{Deserialize, Serialize};

use super::Temperature;

/// Control parameters of a zone.
///
/// The `drivers` variant of an air-conditioning zone carries the on/off
/// behavior (`hysteresis`, `minOnOffTimeInSeconds`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneControl {
    /// Zone type.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Early start enabled.
    pub early_start_enabled: Option<bool>,
    /// Switching hysteresis.
    pub hysteresis: Option<Temperature>,
    /// Minimum time between switching on and off.
    pub min_on_off_time_in_seconds: Option<u64>,
}
