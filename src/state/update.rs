// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability update representation.

use serde::{Deserialize, Serialize};

use crate::capabilities::Capability;
use crate::types::CapabilityValue;

/// A capability value to publish.
///
/// Produced by the engine for every capability whose derived value differs
/// from the published one, then applied to [`PublishedState`](super::PublishedState)
/// and handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityUpdate {
    /// Which capability.
    pub capability: Capability,
    /// The new value.
    pub value: CapabilityValue,
}

impl CapabilityUpdate {
    /// Creates an update.
    #[must_use]
    pub fn new(capability: Capability, value: impl Into<CapabilityValue>) -> Self {
        Self {
            capability,
            value: value.into(),
        }
    }
}
