// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Published capability values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capability;
use crate::types::CapabilityValue;

use super::CapabilityUpdate;

/// Capability values as currently shown by the host, plus availability.
///
/// A capability that was never published reads as `None`; the engine treats
/// that as "previously unset" and seeds it without firing a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedState {
    values: HashMap<Capability, CapabilityValue>,
    available: bool,
    unavailable_reason: Option<String>,
}

impl Default for PublishedState {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            available: true,
            unavailable_reason: None,
        }
    }
}

impl PublishedState {
    /// Creates an empty, available state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the published value of a capability.
    #[must_use]
    pub fn get(&self, capability: Capability) -> Option<&CapabilityValue> {
        self.values.get(&capability)
    }

    /// Returns a numeric value.
    #[must_use]
    pub fn get_f64(&self, capability: Capability) -> Option<f64> {
        self.get(capability).and_then(CapabilityValue::as_f64)
    }

    /// Returns a boolean value.
    #[must_use]
    pub fn get_bool(&self, capability: Capability) -> Option<bool> {
        self.get(capability).and_then(CapabilityValue::as_bool)
    }

    /// Returns a text value.
    #[must_use]
    pub fn get_str(&self, capability: Capability) -> Option<&str> {
        self.get(capability).and_then(CapabilityValue::as_str)
    }

    /// Returns `true` if the capability has been published.
    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        self.values.contains_key(&capability)
    }

    /// Returns the number of published capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Applies an update.
    ///
    /// Returns `true` if the stored value changed.
    pub fn apply(&mut self, update: &CapabilityUpdate) -> bool {
        if self.values.get(&update.capability) == Some(&update.value) {
            return false;
        }
        self.values.insert(update.capability, update.value.clone());
        true
    }

    /// Returns `true` unless the last poll failed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Returns the error of the failed poll while unavailable.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable_reason.as_deref()
    }

    /// Marks the device available.
    ///
    /// Returns `true` if it was unavailable before.
    pub fn set_available(&mut self) -> bool {
        let changed = !self.available;
        self.available = true;
        self.unavailable_reason = None;
        changed
    }

    /// Marks the device unavailable.
    ///
    /// Returns `true` if the availability or the reason changed.
    pub fn set_unavailable(&mut self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        let changed = self.available || self.unavailable_reason.as_deref() != Some(&reason);
        self.available = false;
        self.unavailable_reason = Some(reason);
        changed
    }
}
