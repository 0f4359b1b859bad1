// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote client for the climate-control API.
//!
//! - [`TadoApi`]: the narrow interface the engine polls through
//! - [`HttpClient`]: bearer-authenticated implementation over `reqwest`
//! - [`oauth`]: token lifecycle and token listeners
//!
//! Every method that talks to the API requires a token. On HTTP 401 the
//! [`HttpClient`] obtains a new token once and retries the call; a second
//! failure propagates as [`ApiError::AuthFailed`](crate::error::ApiError).

mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod oauth;

pub use http::{HttpClient, HttpConfig};
pub use oauth::{Grant, ListenerId, OAuthToken};

use std::future::Future;

use crate::command::OverlayCommand;
use crate::error::Result;
use crate::response::{
    Home, Me, MobileDevice, Weather, Zone, ZoneCapabilities, ZoneControl, ZoneOverlay, ZoneState,
};

/// Access to the remote API.
///
/// Implemented by [`HttpClient`]; tests and hosts may provide their own.
/// The returned futures are `Send` so devices can poll from spawned tasks.
pub trait TadoApi {
    /// Returns the logged-in account with its homes.
    fn get_me(&self) -> impl Future<Output = Result<Me>> + Send;

    /// Returns details of a home.
    fn get_home(&self, home_id: u64) -> impl Future<Output = Result<Home>> + Send;

    /// Returns all zones of a home with their member hardware.
    fn get_zones(&self, home_id: u64) -> impl Future<Output = Result<Vec<Zone>>> + Send;

    /// Returns what a zone accepts as setting.
    fn get_zone_capabilities(
        &self,
        home_id: u64,
        zone_id: u32,
    ) -> impl Future<Output = Result<ZoneCapabilities>> + Send;

    /// Returns the outside weather at the home location.
    fn get_weather(&self, home_id: u64) -> impl Future<Output = Result<Weather>> + Send;

    /// Returns the current state of a zone.
    fn get_state(
        &self,
        home_id: u64,
        zone_id: u32,
    ) -> impl Future<Output = Result<ZoneState>> + Send;

    /// Returns the mobile devices registered for geofencing.
    fn get_mobile_devices(
        &self,
        home_id: u64,
    ) -> impl Future<Output = Result<Vec<MobileDevice>>> + Send;

    /// Returns zone control parameters.
    ///
    /// `variant` selects a sub-resource (`drivers` for air conditioning);
    /// a blank variant is ignored.
    fn get_zone_control(
        &self,
        home_id: u64,
        zone_id: u32,
        variant: Option<&str>,
    ) -> impl Future<Output = Result<ZoneControl>> + Send;

    /// Returns the active overlay of a zone.
    fn get_overlay(
        &self,
        home_id: u64,
        zone_id: u32,
    ) -> impl Future<Output = Result<ZoneOverlay>> + Send;

    /// Applies an overlay to a zone.
    fn set_overlay(
        &self,
        home_id: u64,
        zone_id: u32,
        overlay: &OverlayCommand,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Clears the overlay of a zone, resuming the schedule.
    fn unset_overlay(&self, home_id: u64, zone_id: u32)
    -> impl Future<Output = Result<()>> + Send;
}
