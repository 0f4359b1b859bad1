// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change-detection engine.
//!
//! A reducer looks at a freshly fetched API response, derives capability
//! values from it and compares them with the values currently published for
//! the device. The result is a [`Reduction`]: the capability updates to
//! publish and the triggers to fire.
//!
//! Comparison rules:
//!
//! - Only declared capabilities are derived.
//! - A capability without a published value is seeded silently.
//! - Temperatures are compared at one decimal, percentages as whole units.
//! - A block missing from the response skips the capabilities derived from
//!   it for this poll.
//!
//! # Examples
//!
//! ```
//! use tado_bridge::engine::{self, Reduction};
//! use tado_bridge::labels::Labels;
//! use tado_bridge::response::ZoneState;
//! use tado_bridge::state::PublishedState;
//! use tado_bridge::types::ZoneKind;
//! use tado_bridge::Capabilities;
//!
//! let state: ZoneState = serde_json::from_str(
//!     r#"{"setting": {"type": "HEATING", "power": "ON", "temperature": {"celsius": 20.0}},
//!         "sensorDataPoints": {"humidity": {"percentage": 51.4}}}"#,
//! ).unwrap();
//!
//! let mut published = PublishedState::new();
//! let caps = Capabilities::heating();
//! let first = engine::reduce_zone_state(ZoneKind::Heating, &caps, &published, &state, &Labels::default());
//! assert!(first.events.is_empty());
//!
//! for update in &first.updates {
//!     published.apply(update);
//! }
//! let again = engine::reduce_zone_state(ZoneKind::Heating, &caps, &published, &state, &Labels::default());
//! assert!(again.is_empty());
//! ```

mod battery;
mod presence;
mod weather;
mod zone;

pub use battery::{BatteryReport, battery_blink, reduce_battery, summarize_battery};
pub use presence::{
    MobileTracker, PersonLocationStatus, PersonRecord, presence_status, reduce_presence,
};
pub use weather::{WEATHER_CONDITIONS, humanize_condition, reduce_weather, weather_label};
pub use zone::{
    AirConditioningReducer, HeatingReducer, HotWaterReducer, ZoneReducer, mode_label,
    reduce_zone_state, reducer_for,
};

use serde::Serialize;

use crate::capabilities::{Capabilities, Capability};
use crate::event::EventNotification;
use crate::state::{CapabilityUpdate, PublishedState};
use crate::types::CapabilityValue;

/// Output of one reducer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reduction {
    /// Capability values to publish.
    pub updates: Vec<CapabilityUpdate>,
    /// Triggers to fire.
    pub events: Vec<EventNotification>,
}

impl Reduction {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.events.is_empty()
    }

    /// Returns the update of a capability, if any.
    #[must_use]
    pub fn update(&self, capability: Capability) -> Option<&CapabilityValue> {
        self.updates
            .iter()
            .find(|u| u.capability == capability)
            .map(|u| &u.value)
    }

    /// Appends another reduction.
    pub fn merge(&mut self, other: Reduction) {
        self.updates.extend(other.updates);
        self.events.extend(other.events);
    }
}

/// Outcome of comparing a derived value with the published one.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Not declared, or equal to the published value.
    Unchanged,
    /// First value for this capability; published without trigger.
    Seeded,
    /// The value differs from the published one.
    Changed {
        /// The value that was published before.
        previous: CapabilityValue,
    },
}

impl Change {
    /// Returns `true` for a transition that may fire a trigger.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Diff context handed to reducers.
///
/// Collects the updates and triggers of one reducer run. The published
/// values are only read; applying the result is up to the caller.
#[derive(Debug)]
pub struct Diff<'a> {
    capabilities: &'a Capabilities,
    published: &'a PublishedState,
    reduction: Reduction,
}

impl<'a> Diff<'a> {
    /// Starts a diff against the published values.
    #[must_use]
    pub fn new(capabilities: &'a Capabilities, published: &'a PublishedState) -> Self {
        Self {
            capabilities,
            published,
            reduction: Reduction::default(),
        }
    }

    /// Returns `true` if the capability is declared.
    #[must_use]
    pub fn declares(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Returns the published value of a capability.
    #[must_use]
    pub fn published(&self, capability: Capability) -> Option<&'a CapabilityValue> {
        self.published.get(capability)
    }

    /// Records a derived value and reports how it compares.
    pub fn set(&mut self, capability: Capability, value: impl Into<CapabilityValue>) -> Change {
        if !self.declares(capability) {
            return Change::Unchanged;
        }
        let value = value.into();
        let change = match self.published.get(capability) {
            Some(previous) if *previous == value => return Change::Unchanged,
            Some(previous) => Change::Changed {
                previous: previous.clone(),
            },
            None => Change::Seeded,
        };
        tracing::debug!(%capability, %value, "Capability changed");
        self.reduction
            .updates
            .push(CapabilityUpdate { capability, value });
        change
    }

    /// Queues a trigger.
    pub fn fire(&mut self, notification: EventNotification) {
        tracing::debug!(trigger = %notification.trigger, "Trigger fired");
        self.reduction.events.push(notification);
    }

    /// Ends the diff.
    #[must_use]
    pub fn finish(self) -> Reduction {
        self.reduction
    }
}
