// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager and poll scheduler.
//!
//! The [`DeviceManager`] creates [`ZoneDevice`](crate::device::ZoneDevice)s
//! from a [`DeviceConfig`], runs their first polls and then keeps one tokio
//! task per periodic poll:
//!
//! | Poll | Devices | Default period |
//! |---|---|---|
//! | [`PollKind::State`] | zones (state), home (presence) | 7 s |
//! | [`PollKind::ZoneInfo`] | zones with battery status | 60 s |
//! | [`PollKind::Weather`] | home | 60 s |
//! | [`PollKind::BatteryBlink`] | zones with battery percentage | 30 s |
//!
//! The tasks are independent: a failing poll marks the device unavailable
//! and the task tries again on its next tick. A tick that comes due while
//! the previous poll is still running is delayed rather than bunched.
//! Removing a device aborts its tasks.
//!
//! # Examples
//!
//! ## Event Subscription
//!
//! ```no_run
//! use std::sync::Arc;
//! use tado_bridge::event::DeviceEvent;
//! use tado_bridge::manager::{DeviceConfig, DeviceManager};
//! use tado_bridge::protocol::HttpConfig;
//!
//! # async fn example() -> tado_bridge::Result<()> {
//! let api = Arc::new(HttpConfig::new("client", "secret").into_client()?);
//! let manager = DeviceManager::new(api);
//! let mut events = manager.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             DeviceEvent::Triggered { device_id, notification } => {
//!                 println!("{device_id}: {}", notification.trigger);
//!             }
//!             DeviceEvent::AvailabilityChanged { device_id, available, error } => {
//!                 println!("{device_id} available: {available} {error:?}");
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! manager.add_device(DeviceConfig::home(12345)).await;
//! # Ok(())
//! # }
//! ```

mod device_config;
mod device_manager;
mod managed_device;

pub use device_config::{DeviceConfig, PollIntervals};
pub use device_manager::DeviceManager;
pub use managed_device::PollKind;
