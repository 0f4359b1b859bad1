// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One zone (or the virtual home) kept in sync with the remote API.
//!
//! A [`ZoneDevice`] owns everything the change-detection engine compares
//! against: the last snapshot, the published capability values and the
//! mobile device records. Each poll fetches without holding any lock, then
//! reduces and applies the response in one critical section so two polls
//! never diff against the same state concurrently. A second per-device lock
//! spans reduce and the [`NotificationSink`] calls, so the sink sees
//! results in the order they were applied.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tado_bridge::device::ZoneDevice;
//! use tado_bridge::event::EventBus;
//! use tado_bridge::manager::DeviceConfig;
//! use tado_bridge::protocol::HttpConfig;
//! use tado_bridge::types::ZoneKind;
//!
//! # async fn example() -> tado_bridge::Result<()> {
//! let api = Arc::new(HttpConfig::new("client", "secret").into_client()?);
//! let bus = Arc::new(EventBus::new());
//! let mut events = bus.subscribe();
//!
//! let device = ZoneDevice::builder(DeviceConfig::zone(1, 1, ZoneKind::Heating), api, bus).build();
//! device.poll_state().await?;
//! device.set_target_temperature(21.0).await?;
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::ZoneDeviceBuilder;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::Mutex;

use crate::capabilities::{Capabilities, Capability};
use crate::command::{OverlayCommand, Termination};
use crate::engine::{self, MobileTracker, PersonRecord, Reduction};
use crate::error::{Error, Result, ValueError};
use crate::event::DeviceId;
use crate::labels::Labels;
use crate::manager::DeviceConfig;
use crate::protocol::TadoApi;
use crate::response::{Power, ZoneCapabilities, ZoneControl};
use crate::sink::NotificationSink;
use crate::state::{DeviceSnapshot, PublishedState};
use crate::store::{self, DeviceStore, HYSTERESIS_KEY, MIN_ON_OFF_TIME_KEY, MOBILE_DEVICES_KEY};
use crate::types::ZoneKind;

/// Control variant of air-conditioning zones.
const AC_CONTROL_VARIANT: &str = "drivers";

/// State compared and replaced by every poll.
#[derive(Debug)]
struct Tracked {
    snapshot: DeviceSnapshot,
    published: PublishedState,
    tracker: MobileTracker,
}

/// A zone or the virtual home device.
///
/// # Type Parameter
///
/// `A` is the remote API, [`HttpClient`](crate::protocol::HttpClient) in
/// production.
///
/// # Polls
///
/// | Poll | Kinds | Fetches |
/// |---|---|---|
/// | [`poll_state`](Self::poll_state) | zones | zone state |
/// | [`poll_state`](Self::poll_state) | home | mobile devices |
/// | [`poll_zone_info`](Self::poll_zone_info) | zones | zone list with battery levels |
/// | [`poll_weather`](Self::poll_weather) | home | outside weather |
///
/// A failed poll marks the device unavailable with the error text and
/// publishes nothing; the next successful poll restores availability.
/// After [`mark_removed`](Self::mark_removed) every poll and action returns
/// [`Error::DeviceRemoved`], including polls whose response arrives late.
pub struct ZoneDevice<A: TadoApi> {
    id: DeviceId,
    config: DeviceConfig,
    capabilities: Capabilities,
    api: Arc<A>,
    sink: Arc<dyn NotificationSink>,
    store: Arc<dyn DeviceStore>,
    labels: Labels,
    tracked: Mutex<Tracked>,
    /// Held from reduce until the sink has seen the result.
    publishing: Mutex<()>,
    zone_capabilities: Mutex<Option<ZoneCapabilities>>,
    removed: AtomicBool,
}

impl<A: TadoApi> ZoneDevice<A> {
    /// Creates a builder for a device.
    #[must_use]
    pub fn builder(
        config: DeviceConfig,
        api: Arc<A>,
        sink: Arc<dyn NotificationSink>,
    ) -> ZoneDeviceBuilder<A> {
        ZoneDeviceBuilder::new(config, api, sink)
    }

    pub(crate) fn new(
        id: DeviceId,
        config: DeviceConfig,
        api: Arc<A>,
        sink: Arc<dyn NotificationSink>,
        store: Arc<dyn DeviceStore>,
        labels: Labels,
        tracker: MobileTracker,
    ) -> Self {
        Self {
            id,
            capabilities: config.resolved_capabilities(),
            tracked: Mutex::new(Tracked {
                snapshot: DeviceSnapshot::new(config.zone_id, config.kind),
                published: PublishedState::new(),
                tracker,
            }),
            publishing: Mutex::new(()),
            config,
            api,
            sink,
            store,
            labels,
            zone_capabilities: Mutex::new(None),
            removed: AtomicBool::new(false),
        }
    }

    /// Returns the device id.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns the zone kind.
    #[must_use]
    pub fn kind(&self) -> ZoneKind {
        self.config.kind
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.config.display_name()
    }

    /// Returns the declared capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the display strings.
    #[must_use]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Returns the key-value store of the device.
    #[must_use]
    pub fn store(&self) -> &dyn DeviceStore {
        self.store.as_ref()
    }

    /// Returns a copy of the published capability values.
    #[must_use]
    pub fn published(&self) -> PublishedState {
        self.tracked.lock().published.clone()
    }

    /// Returns a copy of the last snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.tracked.lock().snapshot.clone()
    }

    /// Returns a copy of the mobile device records.
    #[must_use]
    pub fn tracker(&self) -> MobileTracker {
        self.tracked.lock().tracker.clone()
    }

    /// Returns `true` unless the last poll failed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.tracked.lock().published.is_available()
    }

    /// Returns `true` once the device has been removed.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    /// Marks the device removed.
    ///
    /// Responses of polls still in flight are discarded.
    pub fn mark_removed(&self) {
        if !self.removed.swap(true, Ordering::AcqRel) {
            tracing::debug!(device_id = %self.id, "Device marked removed");
        }
    }

    // ========== Polls ==========

    /// Polls the zone state, or the mobile devices for the home device.
    ///
    /// # Errors
    ///
    /// Returns the API error of a failed fetch, or [`Error::DeviceRemoved`].
    pub async fn poll_state(&self) -> Result<Reduction> {
        if self.config.kind == ZoneKind::Home {
            return self.poll_presence().await;
        }
        self.ensure_active()?;

        let fetched = self
            .api
            .get_state(self.config.home_id, self.config.zone_id)
            .await;
        self.settle(fetched, |tracked, state| {
            let reduction = engine::reduce_zone_state(
                self.config.kind,
                &self.capabilities,
                &tracked.published,
                &state,
                &self.labels,
            );
            tracked.snapshot = tracked.snapshot.with_zone_state(state);
            reduction
        })
    }

    /// Polls the zone list and publishes the battery text of this zone.
    ///
    /// A zone missing from the list is skipped for this poll.
    ///
    /// # Errors
    ///
    /// Returns the API error of a failed fetch, or [`Error::DeviceRemoved`].
    pub async fn poll_zone_info(&self) -> Result<Reduction> {
        self.ensure_active()?;
        if !self.config.kind.is_zone() {
            return Ok(Reduction::default());
        }

        let fetched = self.api.get_zones(self.config.home_id).await;
        self.settle(fetched, |tracked, zones| {
            let Some(zone) = zones.into_iter().find(|z| z.id == self.config.zone_id) else {
                tracing::warn!(
                    device_id = %self.id,
                    zone_id = self.config.zone_id,
                    "Zone missing from zone list"
                );
                return Reduction::default();
            };
            let reduction = engine::reduce_battery(
                &self.capabilities,
                &tracked.published,
                &zone.devices,
                &self.labels,
            );
            tracked.snapshot = tracked.snapshot.with_sub_devices(zone.devices);
            reduction
        })
    }

    /// Polls the outside weather.
    ///
    /// # Errors
    ///
    /// Returns the API error of a failed fetch, or [`Error::DeviceRemoved`].
    pub async fn poll_weather(&self) -> Result<Reduction> {
        self.ensure_active()?;

        let fetched = self.api.get_weather(self.config.home_id).await;
        self.settle(fetched, |tracked, weather| {
            let reduction = engine::reduce_weather(
                &self.capabilities,
                &tracked.published,
                &weather,
                &self.labels,
            );
            tracked.snapshot = tracked.snapshot.with_weather(weather);
            reduction
        })
    }

    /// Polls the mobile devices, fires the per-person triggers and
    /// publishes presence.
    ///
    /// The person records are written to the store afterwards.
    ///
    /// # Errors
    ///
    /// Returns the API error of a failed fetch, or [`Error::DeviceRemoved`].
    pub async fn poll_presence(&self) -> Result<Reduction> {
        self.ensure_active()?;

        let fetched = self.api.get_mobile_devices(self.config.home_id).await;
        let mut records: Vec<PersonRecord> = Vec::new();
        let reduction = self.settle(fetched, |tracked, devices| {
            let mut reduction = Reduction {
                updates: Vec::new(),
                events: tracked.tracker.update(&devices, Utc::now()),
            };
            reduction.merge(engine::reduce_presence(
                &self.capabilities,
                &tracked.published,
                &devices,
            ));
            records = tracked.tracker.records().to_vec();
            reduction
        })?;

        if let Err(e) = store::save(self.store.as_ref(), MOBILE_DEVICES_KEY, &records) {
            tracing::warn!(device_id = %self.id, error = %e, "Failed to store mobile device records");
        }
        Ok(reduction)
    }

    /// Advances the simulated battery percentage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceRemoved`] after removal.
    pub fn battery_blink(&self) -> Result<Reduction> {
        self.ensure_active()?;
        let _publishing = self.publishing.lock();
        let reduction = {
            let mut tracked = self.tracked.lock();
            let reduction = engine::battery_blink(&self.capabilities, &tracked.published);
            for update in &reduction.updates {
                tracked.published.apply(update);
            }
            reduction
        };
        self.publish(&reduction);
        Ok(reduction)
    }

    /// Runs every poll that applies to the kind of the device.
    ///
    /// Failures are logged and do not stop the remaining polls.
    pub async fn poll_all(&self) {
        let results = if self.config.kind == ZoneKind::Home {
            vec![
                ("weather", self.poll_weather().await),
                ("presence", self.poll_presence().await),
            ]
        } else {
            vec![
                ("state", self.poll_state().await),
                ("zone info", self.poll_zone_info().await),
            ]
        };
        for (poll, result) in results {
            if let Err(e) = result {
                tracing::debug!(device_id = %self.id, poll, error = %e, "Initial poll failed");
            }
        }
    }

    // ========== Zone Information ==========

    /// Returns what the zone accepts as setting.
    ///
    /// Fetched once and cached.
    ///
    /// # Errors
    ///
    /// Returns the API error of a failed fetch.
    pub async fn zone_capabilities(&self) -> Result<ZoneCapabilities> {
        let cached = self.zone_capabilities.lock().clone();
        if let Some(caps) = cached {
            return Ok(caps);
        }
        self.ensure_active()?;
        let caps = self
            .api
            .get_zone_capabilities(self.config.home_id, self.config.zone_id)
            .await?;
        *self.zone_capabilities.lock() = Some(caps.clone());
        Ok(caps)
    }

    /// Fetches the zone control parameters and stores hysteresis and
    /// minimum on/off time.
    ///
    /// Air-conditioning zones read the `drivers` variant.
    ///
    /// # Errors
    ///
    /// Returns the API error of a failed fetch.
    pub async fn refresh_zone_control(&self) -> Result<ZoneControl> {
        self.ensure_active()?;
        let variant = (self.config.kind == ZoneKind::AirConditioning).then_some(AC_CONTROL_VARIANT);
        let control = self
            .api
            .get_zone_control(self.config.home_id, self.config.zone_id, variant)
            .await?;

        if let Some(hysteresis) = control.hysteresis.as_ref() {
            store::save(self.store.as_ref(), HYSTERESIS_KEY, &hysteresis.celsius)?;
        }
        if let Some(seconds) = control.min_on_off_time_in_seconds {
            store::save(self.store.as_ref(), MIN_ON_OFF_TIME_KEY, &seconds)?;
        }
        tracing::debug!(device_id = %self.id, ?variant, "Zone control refreshed");
        Ok(control)
    }

    // ========== Actions ==========

    /// Clears the overlay so the zone follows its schedule again.
    ///
    /// # Errors
    ///
    /// Returns error if the zone has no overlays or the request fails.
    pub async fn resume_schedule(&self) -> Result<()> {
        self.ensure_overlays()?;
        tracing::info!(device_id = %self.id, "Resuming schedule");
        self.api
            .unset_overlay(self.config.home_id, self.config.zone_id)
            .await
    }

    /// Switches the zone on or off until `termination`.
    ///
    /// # Errors
    ///
    /// Returns error if the zone has no overlays or the request fails.
    pub async fn set_power(&self, on: bool, termination: Termination) -> Result<()> {
        self.ensure_overlays()?;
        let power = if on { Power::On } else { Power::Off };
        let overlay = OverlayCommand::new(self.config.kind, power).until(termination);
        self.send_overlay(&overlay).await
    }

    /// Sets a manual setpoint until `termination`.
    ///
    /// Hot water without a boiler setpoint only switches: `0` turns it off,
    /// any other value on. Air conditioning keeps its heating or cooling
    /// mode.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TemperatureOutOfRange`] if the zone rejects the
    /// setpoint, or error if the request fails.
    pub async fn set_temperature(&self, celsius: f64, termination: Termination) -> Result<()> {
        self.ensure_overlays()?;
        if self.config.kind == ZoneKind::AirConditioning {
            let mode = self.current_ac_mode();
            return self.set_ac(mode, celsius, termination).await;
        }

        let caps = self.zone_capabilities().await?;
        let overlay = if self.config.kind == ZoneKind::HotWater && !caps.supports_temperature() {
            let power = if celsius.abs() < f64::EPSILON {
                Power::Off
            } else {
                Power::On
            };
            OverlayCommand::new(self.config.kind, power).with_null_temperature()
        } else {
            check_range(&caps, None, celsius)?;
            OverlayCommand::power_on(self.config.kind).with_temperature(celsius)
        };
        self.send_overlay(&overlay.manual().until(termination)).await
    }

    /// Sets an air-conditioning mode and setpoint until `termination`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidMode`] for a malformed mode,
    /// [`ValueError::TemperatureOutOfRange`] if the mode rejects the
    /// setpoint, or error if the request fails.
    pub async fn set_ac(&self, mode: &str, celsius: f64, termination: Termination) -> Result<()> {
        if self.config.kind != ZoneKind::AirConditioning {
            return Err(Error::CapabilityNotSupported("air conditioning modes".to_string()));
        }
        if mode.is_empty() || !mode.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValueError::InvalidMode(mode.to_string()).into());
        }
        let caps = self.zone_capabilities().await?;
        check_range(&caps, Some(mode), celsius)?;

        let overlay = OverlayCommand::power_on(self.config.kind)
            .with_mode(mode)
            .with_temperature(celsius)
            .manual()
            .until(termination);
        self.send_overlay(&overlay).await
    }

    // ========== Capability Listeners ==========

    /// Handles a new target temperature from the hub, then re-polls.
    ///
    /// # Errors
    ///
    /// Returns error if the request or the poll fails.
    pub async fn set_target_temperature(&self, celsius: f64) -> Result<Reduction> {
        self.ensure_overlays()?;
        let mut overlay = OverlayCommand::power_on(self.config.kind).with_temperature(celsius);
        if self.config.kind == ZoneKind::AirConditioning {
            overlay = overlay.with_mode(self.current_ac_mode());
        }
        self.send_overlay(&overlay).await?;
        self.poll_state().await
    }

    /// Handles an on/off switch from the hub, then re-polls.
    ///
    /// # Errors
    ///
    /// Returns error if the request or the poll fails.
    pub async fn set_target_on_off(&self, on: bool) -> Result<Reduction> {
        self.ensure_overlays()?;
        let power = if on { Power::On } else { Power::Off };
        let overlay = OverlayCommand::new(self.config.kind, power).with_null_temperature();
        self.send_overlay(&overlay).await?;
        self.poll_state().await
    }

    /// Handles the smart-schedule switch from the hub, then re-polls.
    ///
    /// Switching on clears the overlay unless the schedule is already
    /// active. Switching off has no request of its own; setting any
    /// overlay leaves the schedule.
    ///
    /// # Errors
    ///
    /// Returns error if the request or the poll fails.
    pub async fn set_smart(&self, on: bool) -> Result<Reduction> {
        self.ensure_overlays()?;
        let active = self
            .tracked
            .lock()
            .published
            .get_bool(Capability::SmartHeating)
            .unwrap_or(false);
        if on && !active {
            self.resume_schedule().await?;
        }
        self.poll_state().await
    }

    // ========== Internals ==========

    fn ensure_active(&self) -> Result<()> {
        if self.is_removed() {
            return Err(Error::DeviceRemoved);
        }
        Ok(())
    }

    fn ensure_overlays(&self) -> Result<()> {
        self.ensure_active()?;
        if !self.config.kind.is_zone() {
            return Err(Error::CapabilityNotSupported("overlays".to_string()));
        }
        Ok(())
    }

    /// `HEAT` if the published mode label is the heating mode, else `COOL`.
    fn current_ac_mode(&self) -> &'static str {
        let heat = self.labels.mode("HEAT");
        let tracked = self.tracked.lock();
        let current = tracked
            .published
            .get_str(Capability::AircoMode)
            .and_then(|label| label.split(' ').next());
        if current == Some(heat.as_str()) {
            "HEAT"
        } else {
            "COOL"
        }
    }

    async fn send_overlay(&self, overlay: &OverlayCommand) -> Result<()> {
        tracing::debug!(device_id = %self.id, ?overlay, "Setting overlay");
        self.api
            .set_overlay(self.config.home_id, self.config.zone_id, overlay)
            .await
    }

    /// Reduces a fetched response and publishes the result.
    ///
    /// Reduce, apply and publish run as one unit per device, so the sink
    /// receives results in the order they were applied. The tracked state
    /// is unlocked while the sink runs.
    fn settle<T>(
        &self,
        fetched: Result<T>,
        reduce: impl FnOnce(&mut Tracked, T) -> Reduction,
    ) -> Result<Reduction> {
        let _publishing = self.publishing.lock();
        let value = match fetched {
            Ok(value) => value,
            Err(e) => return Err(self.fail(e)),
        };

        let (reduction, restored) = {
            let mut tracked = self.tracked.lock();
            if self.is_removed() {
                tracing::debug!(device_id = %self.id, "Discarding response of removed device");
                return Err(Error::DeviceRemoved);
            }
            let reduction = reduce(&mut tracked, value);
            for update in &reduction.updates {
                tracked.published.apply(update);
            }
            (reduction, tracked.published.set_available())
        };

        if restored {
            tracing::info!(device_id = %self.id, "Device available again");
            self.sink.set_availability(self.id, true, None);
        }
        self.publish(&reduction);
        Ok(reduction)
    }

    fn fail(&self, error: Error) -> Error {
        if self.is_removed() {
            return Error::DeviceRemoved;
        }
        let reason = error.to_string();
        let changed = self.tracked.lock().published.set_unavailable(reason.clone());
        tracing::warn!(device_id = %self.id, error = %reason, "Poll failed");
        if changed {
            self.sink.set_availability(self.id, false, Some(&reason));
        }
        error
    }

    fn publish(&self, reduction: &Reduction) {
        for update in &reduction.updates {
            tracing::debug!(
                device_id = %self.id,
                capability = %update.capability,
                value = ?update.value,
                "Capability changed"
            );
            self.sink
                .publish_capability(self.id, update.capability, &update.value);
        }
        for notification in &reduction.events {
            tracing::debug!(device_id = %self.id, trigger = notification.trigger.name(), "Trigger fired");
            self.sink.fire_event(self.id, notification);
        }
    }
}

fn check_range(caps: &ZoneCapabilities, mode: Option<&str>, celsius: f64) -> Result<()> {
    match caps.celsius_range(mode) {
        Some(range) if celsius < range.min || celsius > range.max => {
            Err(ValueError::TemperatureOutOfRange {
                min: range.min,
                max: range.max,
                actual: celsius,
            }
            .into())
        }
        _ => Ok(()),
    }
}

impl<A: TadoApi> std::fmt::Debug for ZoneDevice<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneDevice")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("removed", &self.is_removed())
            .finish_non_exhaustive()
    }
}
