// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mobile presence tracking.
//!
//! Every phone with location based control reports whether it is at home
//! and how far away it is. [`MobileTracker`] keeps one [`PersonRecord`] per
//! phone and fires the per-person triggers on transitions;
//! [`reduce_presence`] derives the "someone is home" capability.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capabilities::{Capabilities, Capability};
use crate::event::{EventNotification, Trigger};
use crate::response::{DeviceMetadata, MobileDevice, MobileLocation};
use crate::state::PublishedState;
use crate::types::{km_to_miles, relative_to_km};

use super::{Diff, Reduction};

/// What is known about one tracked person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    /// Mobile device id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Location based control enabled.
    pub geo_tracking_enabled: bool,
    /// Last fix; `None` without one.
    pub location: Option<MobileLocation>,
    /// When the location last changed.
    pub last_change: DateTime<Utc>,
    /// Whole minutes between `last_change` and the last poll.
    pub minutes_since_location: i64,
    /// Platform information.
    #[serde(default)]
    pub device_metadata: Option<DeviceMetadata>,
}

impl PersonRecord {
    fn from_device(device: &MobileDevice, last_change: DateTime<Utc>) -> Self {
        Self {
            id: device.id,
            name: device.name.clone(),
            geo_tracking_enabled: device.tracking_enabled(),
            location: device.location,
            last_change,
            minutes_since_location: 0,
            device_metadata: device.device_metadata.clone(),
        }
    }

    /// Returns the widget state of this person.
    #[must_use]
    pub fn status(&self) -> PersonLocationStatus {
        match self.location {
            _ if !self.geo_tracking_enabled => PersonLocationStatus::Off,
            None => PersonLocationStatus::NoLocation,
            Some(location) if location.stale => PersonLocationStatus::Stale,
            Some(location) if location.at_home => PersonLocationStatus::Home,
            Some(_) => PersonLocationStatus::Away,
        }
    }

    /// Returns the distance from the home fence in km.
    #[must_use]
    pub fn kilometers(&self) -> Option<f64> {
        self.location
            .map(|l| relative_to_km(l.relative_distance_from_home_fence))
    }
}

/// Location state of a person as shown in device lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonLocationStatus {
    /// Location based control disabled.
    Off,
    /// Tracking enabled but no fix.
    NoLocation,
    /// The fix is outdated.
    Stale,
    /// Inside the home fence.
    Home,
    /// Outside the home fence.
    Away,
}

impl fmt::Display for PersonLocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Off => "Off",
            Self::NoLocation => "NoLocation",
            Self::Stale => "Stale",
            Self::Home => "Home",
            Self::Away => "Away",
        };
        f.write_str(s)
    }
}

/// Per-person transition detector.
///
/// A person seen for the first time is recorded without triggers. Persons
/// missing from a poll are dropped.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use tado_bridge::engine::MobileTracker;
/// use tado_bridge::event::Trigger;
/// use tado_bridge::response::MobileDevice;
///
/// let phone: MobileDevice = serde_json::from_str(r#"{
///     "id": 7, "name": "Phone", "settings": {"geoTrackingEnabled": true},
///     "location": {"stale": false, "atHome": true,
///                  "bearingFromHome": {"degrees": 0.0, "radians": 0.0},
///                  "relativeDistanceFromHomeFence": 0.0}
/// }"#).unwrap();
///
/// let start = Utc::now();
/// let mut tracker = MobileTracker::new();
/// assert!(tracker.update(&[phone.clone()], start).is_empty());
///
/// let events = tracker.update(&[phone], start + Duration::minutes(3));
/// assert_eq!(events[0].trigger, Trigger::MobileTimeSinceLocation);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MobileTracker {
    records: Vec<PersonRecord>,
}

impl MobileTracker {
    /// Creates a tracker without records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a tracker from persisted records.
    #[must_use]
    pub fn from_records(records: Vec<PersonRecord>) -> Self {
        Self { records }
    }

    /// Returns all records.
    #[must_use]
    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    /// Returns the record of one person.
    #[must_use]
    pub fn record(&self, id: u64) -> Option<&PersonRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Compares a poll against the records and returns the fired triggers.
    pub fn update(&mut self, devices: &[MobileDevice], now: DateTime<Utc>) -> Vec<EventNotification> {
        let previous: HashMap<u64, &PersonRecord> =
            self.records.iter().map(|r| (r.id, r)).collect();
        let mut events = Vec::new();

        let records: Vec<PersonRecord> = devices
            .iter()
            .map(|device| match previous.get(&device.id) {
                Some(before) => track(device, before, now, &mut events),
                None => {
                    tracing::debug!(mobile_id = device.id, name = %device.name, "Tracking new mobile device");
                    PersonRecord::from_device(device, now)
                }
            })
            .collect();

        self.records = records;
        events
    }
}

fn track(
    device: &MobileDevice,
    before: &PersonRecord,
    now: DateTime<Utc>,
    events: &mut Vec<EventNotification>,
) -> PersonRecord {
    let mut record = PersonRecord::from_device(device, before.last_change);
    record.minutes_since_location = before.minutes_since_location;

    let minutes = (now - before.last_change).num_minutes();
    if minutes != before.minutes_since_location {
        record.minutes_since_location = minutes;
        events.push(
            EventNotification::new(Trigger::MobileTimeSinceLocation)
                .with_token("minutes_since_location", minutes)
                .with_state("mobile_id", device.id)
                .with_state("minutes_since_location", minutes),
        );
    }

    let mut moved = false;
    let tracking = device.tracking_enabled();
    if tracking != before.geo_tracking_enabled {
        moved = true;
        events.push(
            EventNotification::new(Trigger::MobileTrackingChanged)
                .with_token("mobile_geoTrackingEnabled", tracking)
                .with_state("mobile_id", device.id),
        );
    }

    if tracking {
        let valid = device.location.is_some();
        if valid != before.location.is_some() {
            events.push(
                EventNotification::new(Trigger::MobileLocationNullChanged)
                    .with_token("mobile_location", valid)
                    .with_state("mobile_id", device.id),
            );
        }

        if let Some(location) = device.location {
            match before.location {
                None => {
                    events.push(at_home_changed(device.id, &location));
                    events.push(distance_changed(device.id, &location));
                }
                Some(last) => {
                    if location.at_home != last.at_home {
                        moved = true;
                        events.push(at_home_changed(device.id, &location));
                    }
                    if location.relative_distance_from_home_fence
                        != last.relative_distance_from_home_fence
                    {
                        moved = true;
                        events.push(distance_changed(device.id, &location));
                    } else if location.bearing_from_home != last.bearing_from_home {
                        moved = true;
                    }
                }
            }
        }
    }

    if moved {
        record.last_change = now;
        record.minutes_since_location = 0;
    }
    record
}

fn at_home_changed(id: u64, location: &MobileLocation) -> EventNotification {
    EventNotification::new(Trigger::MobileAtHomeChanged)
        .with_token("mobile_athome", location.at_home)
        .with_state("mobile_id", id)
}

fn distance_changed(id: u64, location: &MobileLocation) -> EventNotification {
    let relative = location.relative_distance_from_home_fence;
    let km = relative_to_km(relative);
    EventNotification::new(Trigger::MobileDistanceChanged)
        .with_token("mobile_distance", relative)
        .with_token("mobile_kilometers", km)
        .with_token("mobile_miles", km_to_miles(km))
        .with_state("mobile_id", id)
}

/// Returns `true` if someone is home.
///
/// Only persons with tracking enabled and a fresh fix count. Without any
/// such person the home is assumed occupied.
#[must_use]
pub fn presence_status(devices: &[MobileDevice]) -> bool {
    let fresh: Vec<&MobileLocation> = devices
        .iter()
        .filter(|d| d.tracking_enabled())
        .filter_map(|d| d.location.as_ref())
        .filter(|l| !l.stale)
        .collect();
    fresh.is_empty() || fresh.iter().any(|l| l.at_home)
}

/// Publishes the presence capability; fires `presence_status` on a flip.
#[must_use]
pub fn reduce_presence(
    capabilities: &Capabilities,
    published: &PublishedState,
    devices: &[MobileDevice],
) -> Reduction {
    let mut diff = Diff::new(capabilities, published);
    let value = presence_status(devices);
    if diff.set(Capability::PresenceStatus, value).is_changed() {
        diff.fire(EventNotification::new(Trigger::PresenceStatus).with_token("presence", value));
    }
    diff.finish()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::response::{Bearing, MobileSettings};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn phone(id: u64, tracking: bool, location: Option<MobileLocation>) -> MobileDevice {
        MobileDevice {
            id,
            name: format!("Phone {id}"),
            settings: MobileSettings {
                geo_tracking_enabled: tracking,
            },
            location,
            device_metadata: None,
        }
    }

    fn fix(at_home: bool, relative: f64, degrees: f64) -> Option<MobileLocation> {
        Some(MobileLocation {
            stale: false,
            at_home,
            bearing_from_home: Bearing {
                degrees,
                radians: degrees.to_radians(),
            },
            relative_distance_from_home_fence: relative,
        })
    }

    fn triggers(events: &[EventNotification]) -> Vec<Trigger> {
        events.iter().map(|e| e.trigger).collect()
    }

    #[test]
    fn presence_defaults_to_home() {
        assert!(presence_status(&[]));
        assert!(presence_status(&[phone(1, false, fix(false, 0.4, 0.0))]));
    }

    #[test]
    fn presence_follows_fresh_fixes() {
        assert!(!presence_status(&[phone(1, true, fix(false, 0.4, 0.0))]));
        assert!(presence_status(&[
            phone(1, true, fix(false, 0.4, 0.0)),
            phone(2, true, fix(true, 0.0, 0.0)),
        ]));
    }

    #[test]
    fn stale_fix_does_not_count() {
        let mut stale = fix(false, 0.4, 0.0);
        if let Some(l) = stale.as_mut() {
            l.stale = true;
        }
        assert!(presence_status(&[phone(1, true, stale)]));
        assert!(presence_status(&[phone(1, true, None)]));
    }

    #[test]
    fn reduce_presence_fires_on_flip() {
        let caps = Capabilities::home();
        let mut published = PublishedState::new();
        let away = [phone(1, true, fix(false, 0.4, 0.0))];
        let home = [phone(1, true, fix(true, 0.0, 0.0))];

        let seeded = reduce_presence(&caps, &published, &away);
        assert!(seeded.events.is_empty());
        for update in &seeded.updates {
            published.apply(update);
        }
        assert!(reduce_presence(&caps, &published, &away).is_empty());

        let flipped = reduce_presence(&caps, &published, &home);
        assert_eq!(triggers(&flipped.events), vec![Trigger::PresenceStatus]);
        assert_eq!(
            flipped.events[0].token("presence"),
            Some(&serde_json::json!(true))
        );
    }

    #[test]
    fn first_poll_records_silently() {
        let mut tracker = MobileTracker::new();
        let events = tracker.update(&[phone(1, true, fix(true, 0.0, 0.0))], start());
        assert!(events.is_empty());
        assert_eq!(tracker.records().len(), 1);
        assert_eq!(tracker.record(1).unwrap().status(), PersonLocationStatus::Home);
    }

    #[test]
    fn same_minute_is_idempotent() {
        let mut tracker = MobileTracker::new();
        let poll = [phone(1, true, fix(false, 0.4, 90.0))];
        tracker.update(&poll, start());
        assert!(tracker.update(&poll, start() + Duration::seconds(7)).is_empty());
        assert!(tracker.update(&poll, start() + Duration::seconds(14)).is_empty());
    }

    #[test]
    fn minutes_tick_once_per_minute() {
        let mut tracker = MobileTracker::new();
        let poll = [phone(1, true, fix(false, 0.4, 90.0))];
        tracker.update(&poll, start());

        let events = tracker.update(&poll, start() + Duration::seconds(61));
        assert_eq!(triggers(&events), vec![Trigger::MobileTimeSinceLocation]);
        assert_eq!(events[0].mobile_id(), Some(1));
        assert_eq!(
            events[0].token("minutes_since_location"),
            Some(&serde_json::json!(1))
        );

        assert!(tracker.update(&poll, start() + Duration::seconds(100)).is_empty());
        assert_eq!(tracker.record(1).unwrap().minutes_since_location, 1);
    }

    #[test]
    fn distance_change_fires_and_resets() {
        let mut tracker = MobileTracker::new();
        tracker.update(&[phone(1, true, fix(false, 0.4, 90.0))], start());

        let later = start() + Duration::minutes(5);
        let events = tracker.update(&[phone(1, true, fix(false, 0.5, 90.0))], later);
        assert_eq!(
            triggers(&events),
            vec![
                Trigger::MobileTimeSinceLocation,
                Trigger::MobileDistanceChanged
            ]
        );
        let distance = &events[1];
        assert_eq!(distance.token("mobile_distance"), Some(&serde_json::json!(0.5)));
        assert_eq!(
            distance.token("mobile_kilometers"),
            Some(&serde_json::json!(9.27))
        );
        assert!(distance.token("mobile_miles").is_some());

        let record = tracker.record(1).unwrap();
        assert_eq!(record.last_change, later);
        assert_eq!(record.minutes_since_location, 0);
    }

    #[test]
    fn arriving_home_fires_at_home_and_distance() {
        let mut tracker = MobileTracker::new();
        tracker.update(&[phone(1, true, fix(false, 0.2, 90.0))], start());
        let events = tracker.update(&[phone(1, true, fix(true, 0.0, 90.0))], start());
        assert_eq!(
            triggers(&events),
            vec![Trigger::MobileAtHomeChanged, Trigger::MobileDistanceChanged]
        );
        assert_eq!(
            events[0].token("mobile_athome"),
            Some(&serde_json::json!(true))
        );
    }

    #[test]
    fn bearing_change_is_silent_but_resets_timer() {
        let mut tracker = MobileTracker::new();
        tracker.update(&[phone(1, true, fix(false, 0.4, 90.0))], start());

        let later = start() + Duration::seconds(30);
        let events = tracker.update(&[phone(1, true, fix(false, 0.4, 180.0))], later);
        assert!(events.is_empty());
        assert_eq!(tracker.record(1).unwrap().last_change, later);
    }

    #[test]
    fn losing_and_regaining_fix() {
        let mut tracker = MobileTracker::new();
        tracker.update(&[phone(1, true, fix(false, 0.4, 90.0))], start());

        let lost = tracker.update(&[phone(1, true, None)], start());
        assert_eq!(triggers(&lost), vec![Trigger::MobileLocationNullChanged]);
        assert_eq!(
            lost[0].token("mobile_location"),
            Some(&serde_json::json!(false))
        );
        assert_eq!(
            tracker.record(1).unwrap().status(),
            PersonLocationStatus::NoLocation
        );

        let regained = tracker.update(&[phone(1, true, fix(false, 0.4, 90.0))], start());
        assert_eq!(
            triggers(&regained),
            vec![
                Trigger::MobileLocationNullChanged,
                Trigger::MobileAtHomeChanged,
                Trigger::MobileDistanceChanged
            ]
        );
        // A regained fix is a new baseline, not a movement
        assert_eq!(tracker.record(1).unwrap().last_change, start());
    }

    #[test]
    fn tracking_toggle_fires_and_resets() {
        let mut tracker = MobileTracker::new();
        tracker.update(&[phone(1, true, fix(false, 0.4, 90.0))], start());

        let later = start() + Duration::seconds(20);
        let events = tracker.update(&[phone(1, false, None)], later);
        assert_eq!(triggers(&events), vec![Trigger::MobileTrackingChanged]);
        assert_eq!(
            events[0].token("mobile_geoTrackingEnabled"),
            Some(&serde_json::json!(false))
        );
        let record = tracker.record(1).unwrap();
        assert_eq!(record.last_change, later);
        assert_eq!(record.status(), PersonLocationStatus::Off);
    }

    #[test]
    fn removed_persons_are_pruned() {
        let mut tracker = MobileTracker::new();
        tracker.update(
            &[
                phone(1, true, fix(true, 0.0, 0.0)),
                phone(2, true, fix(true, 0.0, 0.0)),
            ],
            start(),
        );
        tracker.update(&[phone(2, true, fix(true, 0.0, 0.0))], start());
        assert!(tracker.record(1).is_none());
        assert_eq!(tracker.records().len(), 1);
    }

    #[test]
    fn records_round_trip_through_json() {
        let mut tracker = MobileTracker::new();
        tracker.update(&[phone(3, true, fix(false, 0.3, 45.0))], start());
        let json = serde_json::to_value(&tracker).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["geoTrackingEnabled"], true);

        let restored: MobileTracker = serde_json::from_value(json).unwrap();
        assert_eq!(restored, tracker);
    }
}
