// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted [`TadoApi`] for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::TadoApi;
use crate::command::OverlayCommand;
use crate::error::{ApiError, Result};
use crate::response::{
    Home, Me, MobileDevice, Weather, Zone, ZoneCapabilities, ZoneControl, ZoneOverlay, ZoneState,
};

/// Answers every call from its fields; `fail` turns every call into a 503.
#[derive(Debug, Default)]
pub(crate) struct MockApi {
    pub state: Mutex<ZoneState>,
    pub zones: Mutex<Vec<Zone>>,
    pub weather: Mutex<Weather>,
    pub mobile_devices: Mutex<Vec<MobileDevice>>,
    pub zone_capabilities: Mutex<ZoneCapabilities>,
    pub zone_control: Mutex<ZoneControl>,
    pub overlays: Mutex<Vec<OverlayCommand>>,
    pub control_variants: Mutex<Vec<Option<String>>>,
    pub unset_calls: AtomicUsize,
    pub state_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockApi {
    pub fn set_state(&self, json: &str) {
        *self.state.lock() = serde_json::from_str(json).unwrap();
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl TadoApi for MockApi {
    async fn get_me(&self) -> Result<Me> {
        self.check()?;
        Ok(Me::default())
    }

    async fn get_home(&self, _home_id: u64) -> Result<Home> {
        self.check()?;
        Ok(Home::default())
    }

    async fn get_zones(&self, _home_id: u64) -> Result<Vec<Zone>> {
        self.check()?;
        Ok(self.zones.lock().clone())
    }

    async fn get_zone_capabilities(&self, _home_id: u64, _zone_id: u32) -> Result<ZoneCapabilities> {
        self.check()?;
        Ok(self.zone_capabilities.lock().clone())
    }

    async fn get_weather(&self, _home_id: u64) -> Result<Weather> {
        self.check()?;
        Ok(self.weather.lock().clone())
    }

    async fn get_state(&self, _home_id: u64, _zone_id: u32) -> Result<ZoneState> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.state.lock().clone())
    }

    async fn get_mobile_devices(&self, _home_id: u64) -> Result<Vec<MobileDevice>> {
        self.check()?;
        Ok(self.mobile_devices.lock().clone())
    }

    async fn get_zone_control(
        &self,
        _home_id: u64,
        _zone_id: u32,
        variant: Option<&str>,
    ) -> Result<ZoneControl> {
        self.check()?;
        self.control_variants.lock().push(variant.map(str::to_string));
        Ok(self.zone_control.lock().clone())
    }

    async fn get_overlay(&self, _home_id: u64, _zone_id: u32) -> Result<ZoneOverlay> {
        self.check()?;
        Ok(ZoneOverlay::default())
    }

    async fn set_overlay(&self, _home_id: u64, _zone_id: u32, overlay: &OverlayCommand) -> Result<()> {
        self.check()?;
        self.overlays.lock().push(overlay.clone());
        Ok(())
    }

    async fn unset_overlay(&self, _home_id: u64, _zone_id: u32) -> Result<()> {
        self.check()?;
        self.unset_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
