// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where capability updates and fired triggers go.
//!
//! The automation host implements [`NotificationSink`]. The crate ships an
//! implementation for [`EventBus`] that turns every call into a
//! [`DeviceEvent`].

use std::sync::Arc;

use crate::capabilities::Capability;
use crate::event::{DeviceEvent, DeviceId, EventBus, EventNotification};
use crate::types::CapabilityValue;

/// Receiver of everything a device publishes.
///
/// Calls are made after the device state lock has been released, in the
/// order the engine produced them: capability updates first, then triggers.
pub trait NotificationSink: Send + Sync {
    /// A capability got a new value.
    fn publish_capability(&self, device_id: DeviceId, capability: Capability, value: &CapabilityValue);

    /// A trigger fired.
    fn fire_event(&self, device_id: DeviceId, notification: &EventNotification);

    /// The device became available or unavailable.
    fn set_availability(&self, device_id: DeviceId, available: bool, reason: Option<&str>) {
        let _ = (device_id, available, reason);
    }

    /// The device was added to a manager.
    fn device_added(&self, device_id: DeviceId) {
        let _ = device_id;
    }

    /// The device was removed from its manager.
    fn device_removed(&self, device_id: DeviceId) {
        let _ = device_id;
    }
}

impl NotificationSink for EventBus {
    fn publish_capability(&self, device_id: DeviceId, capability: Capability, value: &CapabilityValue) {
        self.publish(DeviceEvent::capability_changed(
            device_id,
            capability,
            value.clone(),
        ));
    }

    fn fire_event(&self, device_id: DeviceId, notification: &EventNotification) {
        self.publish(DeviceEvent::triggered(device_id, notification.clone()));
    }

    fn set_availability(&self, device_id: DeviceId, available: bool, reason: Option<&str>) {
        let event = if available {
            DeviceEvent::available(device_id)
        } else {
            DeviceEvent::unavailable(device_id, reason.unwrap_or_default())
        };
        self.publish(event);
    }

    fn device_added(&self, device_id: DeviceId) {
        self.publish(DeviceEvent::device_added(device_id));
    }

    fn device_removed(&self, device_id: DeviceId) {
        self.publish(DeviceEvent::device_removed(device_id));
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn publish_capability(&self, device_id: DeviceId, capability: Capability, value: &CapabilityValue) {
        (**self).publish_capability(device_id, capability, value);
    }

    fn fire_event(&self, device_id: DeviceId, notification: &EventNotification) {
        (**self).fire_event(device_id, notification);
    }

    fn set_availability(&self, device_id: DeviceId, available: bool, reason: Option<&str>) {
        (**self).set_availability(device_id, available, reason);
    }

    fn device_added(&self, device_id: DeviceId) {
        (**self).device_added(device_id);
    }

    fn device_removed(&self, device_id: DeviceId) {
        (**self).device_removed(device_id);
    }
}
