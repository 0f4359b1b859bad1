// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands sent to a zone.
//!
//! Zones are controlled through overlays: a temporary setting that replaces
//! the schedule until it is cleared, a timer runs out, or the next schedule
//! block starts.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`OverlayCommand`] | Body of a set-overlay request |
//! | [`Termination`] | When the overlay ends |
//! | [`Setpoint`] | Omitted, `null` or a temperature |
//!
//! Clearing the overlay (resuming the schedule) has no body and maps to
//! [`TadoApi::unset_overlay`](crate::protocol::TadoApi::unset_overlay).

mod overlay;

pub use overlay::{OverlayCommand, OverlaySetting, Setpoint, Termination};
