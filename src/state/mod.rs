// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.
//!
//! Two records are kept per device:
//!
//! - [`DeviceSnapshot`]: the last processed API responses, replaced
//!   wholesale after every successful poll.
//! - [`PublishedState`]: the capability values the host currently shows.
//!   Diffs are computed against these, so a value is only written when it
//!   differs from what was published.
//!
//! # Examples
//!
//! ```
//! use tado_bridge::Capability;
//! use tado_bridge::state::{CapabilityUpdate, PublishedState};
//!
//! let mut published = PublishedState::new();
//! let update = CapabilityUpdate::new(Capability::MeasureTemperature, 20.5);
//!
//! assert!(published.apply(&update));
//! assert!(!published.apply(&update));
//! assert_eq!(published.get_f64(Capability::MeasureTemperature), Some(20.5));
//! ```

mod published;
mod snapshot;
mod update;

pub use published::PublishedState;
pub use snapshot::DeviceSnapshot;
pub use update::CapabilityUpdate;
