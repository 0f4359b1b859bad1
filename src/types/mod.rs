// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the crate.
//!
//! - [`ZoneKind`] - The kind of device a zone is exposed as
//! - [`CapabilityValue`] - A published capability value
//! - Geofence distance conversion ([`relative_to_km`], [`km_to_relative`],
//!   [`km_to_miles`])
//! - Overlay countdown formatting ([`format_countdown`]) and timer parsing
//!   ([`parse_timer`])

mod capability_value;
mod countdown;
mod distance;
mod zone_kind;

pub use capability_value::{CapabilityValue, round_to};
pub use countdown::{format_countdown, parse_timer};
pub use distance::{
    MAX_KM, MILES_PER_KM, MIN_KM, POW_FACTOR, X_FACTOR, km_to_miles, km_to_relative,
    relative_to_km,
};
pub use zone_kind::ZoneKind;
