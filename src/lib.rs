// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `tado_bridge` - keeps tado° zones in sync with a home-automation hub.
//!
//! The library polls the tado° cloud API, compares every response with the
//! values it last published and reports the differences: capability values
//! (temperatures, on/off, battery text, presence) and discrete triggers
//! (humidity changed, window opened, person arrived home).
//!
//! # Devices
//!
//! - **Heating**: radiator valves and wall thermostats
//! - **Hot water**: boilers with or without setpoint
//! - **Air conditioning**: Smart AC control with modes
//! - **Home**: virtual device with outside weather and presence
//!
//! # Quick Start
//!
//! ## Managed Devices
//!
//! ```no_run
//! use std::sync::Arc;
//! use tado_bridge::manager::{DeviceConfig, DeviceManager};
//! use tado_bridge::protocol::{HttpConfig, OAuthToken, TadoApi};
//! use tado_bridge::types::ZoneKind;
//!
//! #[tokio::main]
//! async fn main() -> tado_bridge::Result<()> {
//!     let api = HttpConfig::new("client-id", "client-secret")
//!         .with_token(OAuthToken::new("access").with_refresh_token("refresh"))
//!         .into_client()?;
//!     let home_id = api.get_me().await?.homes[0].id;
//!
//!     let manager = DeviceManager::new(Arc::new(api));
//!     let mut events = manager.subscribe();
//!
//!     manager.add_device(DeviceConfig::zone(home_id, 1, ZoneKind::Heating)).await;
//!     manager.add_device(DeviceConfig::home(home_id)).await;
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Change Detection Without I/O
//!
//! The engine is a set of pure functions over the published values:
//!
//! ```
//! use tado_bridge::engine;
//! use tado_bridge::labels::Labels;
//! use tado_bridge::response::ZoneState;
//! use tado_bridge::state::PublishedState;
//! use tado_bridge::types::ZoneKind;
//! use tado_bridge::{Capabilities, Capability};
//!
//! let state: ZoneState = serde_json::from_str(
//!     r#"{"sensorDataPoints": {"insideTemperature": {"celsius": 19.96}}}"#,
//! ).unwrap();
//! let reduction = engine::reduce_zone_state(
//!     ZoneKind::Heating,
//!     &Capabilities::heating(),
//!     &PublishedState::new(),
//!     &state,
//!     &Labels::default(),
//! );
//! assert_eq!(reduction.update(Capability::MeasureTemperature), Some(&20.0.into()));
//! assert!(reduction.events.is_empty());
//! ```

pub mod capabilities;
pub mod command;
pub mod condition;
pub mod device;
pub mod engine;
pub mod error;
pub mod event;
pub mod labels;
pub mod manager;
pub mod protocol;
pub mod response;
pub mod sink;
pub mod state;
pub mod store;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder, Capability};
pub use command::{OverlayCommand, Termination};
pub use device::{ZoneDevice, ZoneDeviceBuilder};
pub use engine::Reduction;
pub use error::{ApiError, Error, ParseError, Result, ValueError};
pub use event::{DeviceEvent, DeviceId, EventBus, EventNotification, Trigger};
pub use labels::Labels;
pub use manager::{DeviceConfig, DeviceManager, PollIntervals};
pub use protocol::{HttpClient, HttpConfig, OAuthToken, TadoApi};
pub use sink::NotificationSink;
pub use store::{DeviceStore, MemoryStore};
pub use types::{CapabilityValue, ZoneKind};
