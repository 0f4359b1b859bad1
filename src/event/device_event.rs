// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use serde::{Deserialize, Serialize};

use crate::capabilities::Capability;
use crate::types::CapabilityValue;

use super::{DeviceId, EventNotification};

/// Events broadcast on the [`EventBus`](super::EventBus).
///
/// # Examples
///
/// ```
/// use tado_bridge::Capability;
/// use tado_bridge::event::{DeviceEvent, DeviceId};
///
/// let id = DeviceId::new();
/// let event = DeviceEvent::capability_changed(id, Capability::MeasureTemperature, 20.5.into());
/// assert!(event.is_capability());
/// assert_eq!(event.device_id(), id);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// A device was added to the manager.
    DeviceAdded {
        /// The added device.
        device_id: DeviceId,
    },

    /// A device was removed and its timers cancelled.
    DeviceRemoved {
        /// The removed device.
        device_id: DeviceId,
    },

    /// The device became available or unavailable.
    AvailabilityChanged {
        /// The device.
        device_id: DeviceId,
        /// Whether the last poll succeeded.
        available: bool,
        /// Error message of the failed poll.
        error: Option<String>,
    },

    /// A capability value was published.
    CapabilityChanged {
        /// The device.
        device_id: DeviceId,
        /// Which capability.
        capability: Capability,
        /// The new value.
        value: CapabilityValue,
    },

    /// A trigger fired.
    Triggered {
        /// The device.
        device_id: DeviceId,
        /// Trigger with tokens and state.
        notification: EventNotification,
    },
}

impl DeviceEvent {
    /// Returns the device the event belongs to.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::AvailabilityChanged { device_id, .. }
            | Self::CapabilityChanged { device_id, .. }
            | Self::Triggered { device_id, .. } => *device_id,
        }
    }

    /// Returns `true` for added/removed events.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` for availability events.
    #[must_use]
    pub fn is_availability(&self) -> bool {
        matches!(self, Self::AvailabilityChanged { .. })
    }

    /// Returns `true` for capability updates.
    #[must_use]
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::CapabilityChanged { .. })
    }

    /// Returns `true` for fired triggers.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Triggered { .. })
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: DeviceId) -> Self {
        Self::DeviceAdded { device_id }
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(device_id: DeviceId) -> Self {
        Self::DeviceRemoved { device_id }
    }

    /// Creates an available event.
    #[must_use]
    pub fn available(device_id: DeviceId) -> Self {
        Self::AvailabilityChanged {
            device_id,
            available: true,
            error: None,
        }
    }

    /// Creates an unavailable event with the error text.
    #[must_use]
    pub fn unavailable(device_id: DeviceId, error: impl Into<String>) -> Self {
        Self::AvailabilityChanged {
            device_id,
            available: false,
            error: Some(error.into()),
        }
    }

    /// Creates a capability changed event.
    #[must_use]
    pub fn capability_changed(
        device_id: DeviceId,
        capability: Capability,
        value: CapabilityValue,
    ) -> Self {
        Self::CapabilityChanged {
            device_id,
            capability,
            value,
        }
    }

    /// Creates a trigger event.
    #[must_use]
    pub fn triggered(device_id: DeviceId, notification: EventNotification) -> Self {
        Self::Triggered {
            device_id,
            notification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Trigger;

    #[test]
    fn device_id_extraction() {
        let id = DeviceId::new();
        assert_eq!(DeviceEvent::device_added(id).device_id(), id);
        assert_eq!(DeviceEvent::unavailable(id, "boom").device_id(), id);
        assert_eq!(
            DeviceEvent::triggered(id, EventNotification::new(Trigger::Weather)).device_id(),
            id
        );
    }

    #[test]
    fn kind_predicates() {
        let id = DeviceId::new();
        assert!(DeviceEvent::device_removed(id).is_lifecycle());
        assert!(DeviceEvent::available(id).is_availability());
        assert!(!DeviceEvent::available(id).is_lifecycle());
        assert!(
            DeviceEvent::capability_changed(id, Capability::SmartHeating, true.into())
                .is_capability()
        );
    }

    #[test]
    fn unavailable_carries_error() {
        let id = DeviceId::new();
        match DeviceEvent::unavailable(id, "HTTP 503: Service Unavailable") {
            DeviceEvent::AvailabilityChanged {
                available, error, ..
            } => {
                assert!(!available);
                assert_eq!(error.as_deref(), Some("HTTP 503: Service Unavailable"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
