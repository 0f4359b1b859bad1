// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Condition checks and trigger argument filters.
//!
//! Conditions read the published capability values or the mobile person
//! records of a device. Filters decide whether a fired
//! [`EventNotification`] matches the arguments an automation was set up
//! with (a person, a weather condition, a mode).
//!
//! # Examples
//!
//! ```
//! use tado_bridge::Capability;
//! use tado_bridge::condition;
//! use tado_bridge::state::{CapabilityUpdate, PublishedState};
//!
//! let mut published = PublishedState::new();
//! published.apply(&CapabilityUpdate::new(Capability::MeasureTemperature, 20.5));
//!
//! // Bounds may be given in either order
//! assert!(condition::between(&published, Capability::MeasureTemperature, 21.0, 19.0));
//! assert!(!condition::between(&published, Capability::MeasureTemperature, 21.0, 25.0));
//! ```

use crate::capabilities::Capability;
use crate::engine::{MobileTracker, PersonRecord, weather_label};
use crate::error::ValueError;
use crate::event::{EventNotification, Trigger};
use crate::labels::Labels;
use crate::state::PublishedState;
use crate::types::{km_to_relative, parse_timer};

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a < b { (a, b) } else { (b, a) }
}

/// Returns `true` if a numeric capability lies within `[a, b]`.
///
/// The bounds are swapped when given in descending order. An unpublished
/// capability never matches.
#[must_use]
pub fn between(published: &PublishedState, capability: Capability, a: f64, b: f64) -> bool {
    let (low, high) = ordered(a, b);
    published
        .get_f64(capability)
        .is_some_and(|v| v >= low && v <= high)
}

/// Zone is switched on.
#[must_use]
pub fn is_on(published: &PublishedState) -> bool {
    published.get_bool(Capability::TargetOnOff).unwrap_or(false)
}

/// The schedule is active.
#[must_use]
pub fn smart_schedule(published: &PublishedState) -> bool {
    published.get_bool(Capability::SmartHeating).unwrap_or(false)
}

/// An open window is detected.
#[must_use]
pub fn open_window(published: &PublishedState) -> bool {
    published
        .get_bool(Capability::DetectOpenWindow)
        .unwrap_or(false)
}

/// Someone is home.
#[must_use]
pub fn presence(published: &PublishedState) -> bool {
    published.get_bool(Capability::PresenceStatus).unwrap_or(false)
}

/// No battery reports a low level.
#[must_use]
pub fn battery_ok(published: &PublishedState) -> bool {
    published
        .get_str(Capability::BatteryState)
        .is_none_or(|text| !text.contains("Low"))
}

/// The mode label starts with the translated `mode` (`COOL`, `HEAT`, ...).
#[must_use]
pub fn ac_mode_is(published: &PublishedState, mode: &str, labels: &Labels) -> bool {
    let wanted = labels.mode(mode);
    published
        .get_str(Capability::AircoMode)
        .is_some_and(|label| label.starts_with(&wanted))
}

/// The weather condition is `id` (`rain`, `SUN`, ...).
#[must_use]
pub fn weather_is(published: &PublishedState, id: &str, labels: &Labels) -> bool {
    let wanted = weather_label(&id.to_lowercase(), labels);
    published.get_str(Capability::WeatherState) == Some(wanted.as_str())
}

fn tracked(tracker: &MobileTracker, mobile_id: u64) -> Option<&PersonRecord> {
    tracker
        .record(mobile_id)
        .filter(|r| r.geo_tracking_enabled)
}

/// The person has location based control enabled.
#[must_use]
pub fn tracking_enabled(tracker: &MobileTracker, mobile_id: u64) -> bool {
    tracked(tracker, mobile_id).is_some()
}

/// The person's location changed less than `timeout` (`HH:MM`) ago.
///
/// # Errors
///
/// Returns [`ValueError::InvalidTimer`] if `timeout` is malformed.
pub fn location_within(
    tracker: &MobileTracker,
    mobile_id: u64,
    timeout: &str,
) -> Result<bool, ValueError> {
    let timeout_minutes = i64::from(parse_timer(timeout)? / 60);
    Ok(tracked(tracker, mobile_id).is_some_and(|r| r.minutes_since_location < timeout_minutes))
}

/// The person has a location fix.
#[must_use]
pub fn location_valid(tracker: &MobileTracker, mobile_id: u64) -> bool {
    tracked(tracker, mobile_id).is_some_and(|r| r.location.is_some())
}

/// The person is inside the home fence.
#[must_use]
pub fn at_home(tracker: &MobileTracker, mobile_id: u64) -> bool {
    tracked(tracker, mobile_id)
        .and_then(|r| r.location)
        .is_some_and(|l| l.at_home)
}

/// The person's normalized distance lies within `[a, b]`.
#[must_use]
pub fn distance_between(tracker: &MobileTracker, mobile_id: u64, a: f64, b: f64) -> bool {
    let (low, high) = ordered(a, b);
    tracked(tracker, mobile_id)
        .and_then(|r| r.location)
        .is_some_and(|l| {
            let d = l.relative_distance_from_home_fence;
            d >= low && d <= high
        })
}

/// The person's distance lies within `[a, b]` kilometers.
#[must_use]
pub fn kilometers_between(tracker: &MobileTracker, mobile_id: u64, a: f64, b: f64) -> bool {
    let (low, high) = ordered(a, b);
    distance_between(tracker, mobile_id, km_to_relative(low), km_to_relative(high))
}

/// A per-person trigger belongs to `mobile_id`.
#[must_use]
pub fn mobile_matches(notification: &EventNotification, mobile_id: u64) -> bool {
    notification.trigger.is_mobile() && notification.mobile_id() == Some(mobile_id)
}

/// A weather trigger reports condition `id`.
#[must_use]
pub fn weather_matches(notification: &EventNotification, id: &str) -> bool {
    notification.trigger == Trigger::Weather
        && notification
            .state_value("weather_id")
            .and_then(|v| v.as_str())
            .is_some_and(|v| v.eq_ignore_ascii_case(id))
}

/// A mode trigger reports the translated `mode`.
#[must_use]
pub fn ac_mode_matches(notification: &EventNotification, mode: &str, labels: &Labels) -> bool {
    let wanted = labels.mode(mode);
    notification.trigger == Trigger::AcModeChanged
        && notification
            .state_value("mode")
            .and_then(|v| v.as_str())
            == Some(wanted.as_str())
}

/// Decides whether a minutes-since-location tick matches.
///
/// `remaining` is `timeout` minus the elapsed minutes. Without repeat the
/// trigger matches once when `remaining` reaches zero; with repeat it also
/// matches every `repeat_minutes` after that.
///
/// ```
/// use tado_bridge::condition::time_since_location_matches;
///
/// assert!(time_since_location_matches("00:30", 0, 30).unwrap());
/// assert!(!time_since_location_matches("00:30", 0, 31).unwrap());
/// assert!(time_since_location_matches("00:30", 10, 50).unwrap());
/// assert!(!time_since_location_matches("00:30", 10, 45).unwrap());
/// ```
///
/// # Errors
///
/// Returns [`ValueError::InvalidTimer`] if `timeout` is malformed.
pub fn time_since_location_matches(
    timeout: &str,
    repeat_minutes: u32,
    minutes_since_location: i64,
) -> Result<bool, ValueError> {
    let remaining = i64::from(parse_timer(timeout)? / 60) - minutes_since_location;
    Ok(match repeat_minutes {
        0 => remaining == 0,
        repeat => remaining <= 0 && remaining % i64::from(repeat) == 0,
    })
}

/// Filters a `mobile_time_since_location` trigger for one person.
///
/// # Errors
///
/// Returns [`ValueError::InvalidTimer`] if `timeout` is malformed.
pub fn time_since_location_filter(
    notification: &EventNotification,
    mobile_id: u64,
    timeout: &str,
    repeat_minutes: u32,
) -> Result<bool, ValueError> {
    if notification.trigger != Trigger::MobileTimeSinceLocation
        || !mobile_matches(notification, mobile_id)
    {
        return Ok(false);
    }
    let Some(minutes) = notification
        .state_value("minutes_since_location")
        .and_then(serde_json::Value::as_i64)
    else {
        return Ok(false);
    };
    time_since_location_matches(timeout, repeat_minutes, minutes)
}
