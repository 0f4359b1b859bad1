// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Overlay countdown formatting and timer parsing.
//!
//! Timer overlays report their remaining time in seconds; the mode label
//! shows it as `H:MM:SS` with the seconds rounded to the nearest 5 so the
//! label does not change on every poll. Timer arguments supplied by users
//! use `HH:MM`.

use crate::error::ValueError;

/// Formats a remaining duration as `H:MM:SS`.
///
/// The duration is first rounded to the nearest multiple of 5 seconds.
/// Hours are not padded.
///
/// # Examples
///
/// ```
/// use tado_bridge::types::format_countdown;
///
/// assert_eq!(format_countdown(300), "0:05:00");
/// assert_eq!(format_countdown(3_723), "1:02:05");
/// assert_eq!(format_countdown(3_721), "1:02:00");
/// ```
#[must_use]
pub fn format_countdown(remaining_secs: u64) -> String {
    let rounded = (remaining_secs + 2) / 5 * 5;
    let hours = rounded / 3600;
    let minutes = (rounded % 3600) / 60;
    let seconds = rounded % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Parses an `HH:MM` timer argument into seconds.
///
/// # Examples
///
/// ```
/// use tado_bridge::types::parse_timer;
///
/// assert_eq!(parse_timer("01:30").unwrap(), 5_400);
/// assert_eq!(parse_timer("00:05").unwrap(), 300);
/// ```
///
/// # Errors
///
/// Returns [`ValueError::InvalidTimer`] if the string is not two numeric
/// fields separated by `:`, the minutes exceed 59 or the total does not
/// fit in a `u32`.
pub fn parse_timer(s: &str) -> Result<u32, ValueError> {
    let invalid = || ValueError::InvalidTimer(s.to_string());
    let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if minutes > 59 {
        return Err(invalid());
    }
    hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60))
        .ok_or_else(invalid)
}
