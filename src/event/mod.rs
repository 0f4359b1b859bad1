// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device events and trigger notifications.
//!
//! Every transition the engine detects becomes an [`EventNotification`].
//! The [`EventBus`] broadcasts those, along with capability updates and
//! lifecycle changes, as [`DeviceEvent`]s to any number of subscribers.
//!
//! # Examples
//!
//! ```
//! use tado_bridge::event::{DeviceEvent, DeviceId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let device_id = DeviceId::new();
//! bus.publish(DeviceEvent::device_added(device_id));
//! ```

mod device_event;
mod device_id;
mod event_bus;
mod notification;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::EventBus;
pub use notification::{EventNotification, Trigger};
