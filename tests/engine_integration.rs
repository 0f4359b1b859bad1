// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for zone devices against a scripted API.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tado_bridge::command::{OverlayCommand, Setpoint, Termination};
use tado_bridge::device::ZoneDevice;
use tado_bridge::event::{DeviceId, EventNotification, Trigger};
use tado_bridge::labels::Labels;
use tado_bridge::manager::DeviceConfig;
use tado_bridge::protocol::TadoApi;
use tado_bridge::response::{
    Home, Me, MobileDevice, Power, Weather, Zone, ZoneCapabilities, ZoneControl, ZoneOverlay,
    ZoneState,
};
use tado_bridge::sink::NotificationSink;
use tado_bridge::store::{DeviceStore, MOBILE_DEVICES_KEY, MemoryStore};
use tado_bridge::types::{CapabilityValue, ZoneKind};
use tado_bridge::{ApiError, Capability, Error, Result};
use tokio::sync::Notify;

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct ScriptedApi {
    state: Mutex<ZoneState>,
    zones: Mutex<Vec<Zone>>,
    mobile_devices: Mutex<Vec<MobileDevice>>,
    zone_capabilities: Mutex<ZoneCapabilities>,
    overlays: Mutex<Vec<OverlayCommand>>,
    failing: Mutex<bool>,
    /// When set, `get_state` signals `entered` and waits for `release`.
    gated: Mutex<bool>,
    entered: Notify,
    release: Notify,
}

impl ScriptedApi {
    fn set_state(&self, json: &str) {
        *self.state.lock() = serde_json::from_str(json).unwrap();
    }

    fn set_mobile_devices(&self, json: &str) {
        *self.mobile_devices.lock() = serde_json::from_str(json).unwrap();
    }

    fn check(&self) -> Result<()> {
        if *self.failing.lock() {
            return Err(ApiError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl TadoApi for ScriptedApi {
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
        Ok(Weather::default())
    }

    async fn get_state(&self, _home_id: u64, _zone_id: u32) -> Result<ZoneState> {
        let gated = *self.gated.lock();
        if gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
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
        _variant: Option<&str>,
    ) -> Result<ZoneControl> {
        self.check()?;
        Ok(ZoneControl::default())
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
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Record {
    Value(Capability, CapabilityValue),
    Event(EventNotification),
    Availability(bool, Option<String>),
}

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<Record>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock())
    }

    fn events(records: &[Record]) -> Vec<&EventNotification> {
        records
            .iter()
            .filter_map(|r| match r {
                Record::Event(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn publish_capability(&self, _device_id: DeviceId, capability: Capability, value: &CapabilityValue) {
        self.records.lock().push(Record::Value(capability, value.clone()));
    }

    fn fire_event(&self, _device_id: DeviceId, notification: &EventNotification) {
        self.records.lock().push(Record::Event(notification.clone()));
    }

    fn set_availability(&self, _device_id: DeviceId, available: bool, reason: Option<&str>) {
        self.records
            .lock()
            .push(Record::Availability(available, reason.map(str::to_string)));
    }
}

/// Stalls the first temperature publish to let a second poll overtake it.
#[derive(Default)]
struct StallingSink {
    stalled: AtomicBool,
    stalling: AtomicBool,
    temperature: Mutex<Option<CapabilityValue>>,
}

impl NotificationSink for StallingSink {
    fn publish_capability(&self, _device_id: DeviceId, capability: Capability, value: &CapabilityValue) {
        if capability != Capability::MeasureTemperature {
            return;
        }
        if !self.stalled.swap(true, Ordering::SeqCst) {
            self.stalling.store(true, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(200));
        }
        *self.temperature.lock() = Some(value.clone());
    }

    fn fire_event(&self, _device_id: DeviceId, _notification: &EventNotification) {}
}

fn heating_at(celsius: f64) -> String {
    format!(
        r#"{{
            "setting": {{"type": "HEATING", "power": "ON", "temperature": {{"celsius": 20.0}}}},
            "sensorDataPoints": {{"insideTemperature": {{"celsius": {celsius:.1}}}}}
        }}"#
    )
}

fn device(
    kind: ZoneKind,
    api: &Arc<ScriptedApi>,
    sink: &Arc<RecordingSink>,
) -> Arc<ZoneDevice<ScriptedApi>> {
    let config = if kind == ZoneKind::Home {
        DeviceConfig::home(1)
    } else {
        DeviceConfig::zone(1, 3, kind)
    };
    Arc::new(ZoneDevice::builder(config, Arc::clone(api), Arc::clone(sink) as Arc<dyn NotificationSink>).build())
}

const HEATING: &str = r#"{
    "setting": {"type": "HEATING", "power": "ON", "temperature": {"celsius": 20.0}},
    "overlayType": null,
    "openWindow": null,
    "activityDataPoints": {"heatingPower": {"type": "PERCENTAGE", "percentage": 12.0}},
    "sensorDataPoints": {
        "insideTemperature": {"celsius": 19.84},
        "humidity": {"type": "PERCENTAGE", "percentage": 51.2}
    }
}"#;

const HEATING_WINDOW_OPEN: &str = r#"{
    "setting": {"type": "HEATING", "power": "ON", "temperature": {"celsius": 20.0}},
    "overlayType": null,
    "openWindow": {"detectedTime": "2024-03-01T08:00:00Z", "durationInSeconds": 900},
    "activityDataPoints": {"heatingPower": {"type": "PERCENTAGE", "percentage": 0.0}},
    "sensorDataPoints": {
        "insideTemperature": {"celsius": 18.9},
        "humidity": {"type": "PERCENTAGE", "percentage": 51.2}
    }
}"#;

fn ac_state(mode: &str, remaining: u64) -> String {
    format!(
        r#"{{
            "setting": {{"type": "AIR_CONDITIONING", "power": "ON", "mode": "{mode}",
                         "temperature": {{"celsius": 22.0}}}},
            "overlayType": "MANUAL",
            "overlay": {{"type": "MANUAL",
                         "termination": {{"type": "TIMER", "remainingTimeInSeconds": {remaining}}}}}
        }}"#
    )
}

fn phone(id: u64, at_home: bool) -> String {
    format!(
        r#"{{
            "id": {id}, "name": "Phone {id}",
            "settings": {{"geoTrackingEnabled": true}},
            "location": {{"stale": false, "atHome": {at_home},
                          "bearingFromHome": {{"degrees": 90.0, "radians": 1.5708}},
                          "relativeDistanceFromHomeFence": 0.4}}
        }}"#
    )
}

// ============================================================================
// Zone state
// ============================================================================

mod zone_state {
    use super::*;

    #[tokio::test]
    async fn first_poll_publishes_values_without_triggers() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(HEATING);
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);

        let reduction = device.poll_state().await.unwrap();

        assert!(reduction.events.is_empty());
        assert_eq!(reduction.update(Capability::MeasureTemperature), Some(&19.8.into()));
        assert_eq!(reduction.update(Capability::MeasureHumidity), Some(&51.0.into()));
        assert_eq!(reduction.update(Capability::TargetTemperature), Some(&20.0.into()));
        assert_eq!(reduction.update(Capability::SmartHeating), Some(&true.into()));

        let records = sink.take();
        assert!(RecordingSink::events(&records).is_empty());
        assert_eq!(records.len(), reduction.updates.len());
    }

    #[tokio::test]
    async fn identical_response_publishes_nothing() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(HEATING);
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);

        device.poll_state().await.unwrap();
        sink.take();

        let again = device.poll_state().await.unwrap();
        assert!(again.is_empty());
        assert!(sink.take().is_empty());
        assert_eq!(device.snapshot().zone_state(), Some(&*api.state.lock()));
    }

    #[tokio::test]
    async fn changes_fire_triggers_after_values() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(HEATING);
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);
        device.poll_state().await.unwrap();
        sink.take();

        api.set_state(HEATING_WINDOW_OPEN);
        device.poll_state().await.unwrap();

        let records = sink.take();
        let first_event = records
            .iter()
            .position(|r| matches!(r, Record::Event(_)))
            .unwrap();
        assert!(records[..first_event].iter().all(|r| matches!(r, Record::Value(..))));
        assert!(records[first_event..].iter().all(|r| matches!(r, Record::Event(_))));

        let triggers: Vec<Trigger> = RecordingSink::events(&records)
            .iter()
            .map(|n| n.trigger)
            .collect();
        assert!(triggers.contains(&Trigger::DetectOpenWindow));
        assert!(triggers.contains(&Trigger::HeatingPower));
        assert!(!triggers.contains(&Trigger::Humidity));
        assert_eq!(
            device.published().get_f64(Capability::MeasureTemperature),
            Some(18.9)
        );
    }

    #[tokio::test]
    async fn ac_mode_trigger_ignores_countdown() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(&ac_state("COOL", 600));
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::AirConditioning, &api, &sink);
        device.poll_state().await.unwrap();
        sink.take();

        api.set_state(&ac_state("COOL", 540));
        let countdown = device.poll_state().await.unwrap();
        assert!(countdown.update(Capability::AircoMode).is_some());
        assert!(countdown.events.is_empty());

        api.set_state(&ac_state("HEAT", 540));
        let switched = device.poll_state().await.unwrap();
        let events: Vec<&EventNotification> = switched
            .events
            .iter()
            .filter(|n| n.trigger == Trigger::AcModeChanged)
            .collect();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].state_value("mode"),
            Some(&serde_json::json!(Labels::default().mode("HEAT")))
        );
    }
}

// ============================================================================
// Battery
// ============================================================================

mod battery {
    use super::*;

    #[tokio::test]
    async fn two_normal_valves_read_both_ok() {
        let api = Arc::new(ScriptedApi::default());
        *api.zones.lock() = serde_json::from_str(
            r#"[{"id": 3, "name": "Living", "type": "HEATING", "devices": [
                {"serialNo": "VA1", "batteryState": "NORMAL"},
                {"serialNo": "VA2", "batteryState": "NORMAL"}
            ]}]"#,
        )
        .unwrap();
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);

        let reduction = device.poll_zone_info().await.unwrap();
        assert_eq!(
            reduction.update(Capability::BatteryState),
            Some(&"Both OK".into())
        );
        assert_eq!(device.snapshot().sub_devices().len(), 2);

        let blink = device.battery_blink().unwrap();
        assert_eq!(blink.update(Capability::MeasureBattery), Some(&100.0.into()));
    }

    #[tokio::test]
    async fn missing_zone_is_skipped() {
        let api = Arc::new(ScriptedApi::default());
        *api.zones.lock() = serde_json::from_str(r#"[{"id": 7, "devices": []}]"#).unwrap();
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);

        let reduction = device.poll_zone_info().await.unwrap();
        assert!(reduction.is_empty());
        assert!(device.is_available());
    }
}

// ============================================================================
// Presence
// ============================================================================

mod presence {
    use super::*;

    #[tokio::test]
    async fn nobody_tracked_means_home_occupied() {
        let api = Arc::new(ScriptedApi::default());
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Home, &api, &sink);

        let reduction = device.poll_state().await.unwrap();
        assert_eq!(reduction.update(Capability::PresenceStatus), Some(&true.into()));
        assert!(reduction.events.is_empty());
    }

    #[tokio::test]
    async fn everybody_away_flips_presence() {
        let api = Arc::new(ScriptedApi::default());
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Home, &api, &sink);
        device.poll_presence().await.unwrap();

        api.set_mobile_devices(&format!("[{}]", phone(1, false)));
        let reduction = device.poll_presence().await.unwrap();

        let presence: Vec<&EventNotification> = reduction
            .events
            .iter()
            .filter(|n| n.trigger == Trigger::PresenceStatus)
            .collect();
        assert_eq!(presence.len(), 1);
        assert_eq!(presence[0].token("presence"), Some(&serde_json::json!(false)));
    }

    #[tokio::test]
    async fn records_survive_a_restart() {
        let api = Arc::new(ScriptedApi::default());
        api.set_mobile_devices(&format!("[{}, {}]", phone(1, true), phone(2, false)));
        let sink = Arc::new(RecordingSink::default());
        let store: Arc<dyn DeviceStore> = Arc::new(MemoryStore::new());

        let first = Arc::new(
            ZoneDevice::builder(
                DeviceConfig::home(1),
                Arc::clone(&api),
                Arc::clone(&sink) as Arc<dyn NotificationSink>,
            )
            .with_store(Arc::clone(&store))
            .build(),
        );
        first.poll_presence().await.unwrap();

        let stored = store.get(MOBILE_DEVICES_KEY).unwrap();
        assert_eq!(stored.as_array().map(Vec::len), Some(2));

        let second = ZoneDevice::builder(
            DeviceConfig::home(1),
            Arc::clone(&api),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
        )
        .with_store(store)
        .build();
        assert_eq!(second.tracker().records().len(), 2);
        assert!(second.tracker().record(1).is_some());
    }
}

// ============================================================================
// Availability and removal
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn overlapping_polls_reach_sink_in_apply_order() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(&heating_at(21.0));
        let sink = Arc::new(StallingSink::default());
        let device = Arc::new(
            ZoneDevice::builder(
                DeviceConfig::zone(1, 3, ZoneKind::Heating),
                Arc::clone(&api),
                Arc::clone(&sink) as Arc<dyn NotificationSink>,
            )
            .build(),
        );

        let first = tokio::spawn({
            let device = Arc::clone(&device);
            async move { device.poll_state().await }
        });
        while !sink.stalling.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        api.set_state(&heating_at(22.0));
        let second = tokio::spawn({
            let device = Arc::clone(&device);
            async move { device.poll_state().await }
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let settled = device.poll_state().await.unwrap();
        assert!(settled.is_empty());

        let host = sink.temperature.lock().clone();
        assert_eq!(host, Some(CapabilityValue::Number(22.0)));
        assert_eq!(
            host.as_ref(),
            device.published().get(Capability::MeasureTemperature)
        );
    }

    #[tokio::test]
    async fn failure_marks_unavailable_until_next_success() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(HEATING);
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);
        device.poll_state().await.unwrap();
        sink.take();

        *api.failing.lock() = true;
        let err = device.poll_state().await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Status { status: 503, .. })));
        assert!(!device.is_available());
        assert!(device.poll_state().await.is_err());

        let records = sink.take();
        assert_eq!(records.len(), 1);
        assert!(matches!(&records[0], Record::Availability(false, Some(_))));

        *api.failing.lock() = false;
        let reduction = device.poll_state().await.unwrap();
        assert!(reduction.is_empty());
        assert!(device.is_available());
        assert_eq!(sink.take(), vec![Record::Availability(true, None)]);
    }

    #[tokio::test]
    async fn late_response_after_removal_is_discarded() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(HEATING);
        *api.gated.lock() = true;
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);

        let poll = tokio::spawn({
            let device = Arc::clone(&device);
            async move { device.poll_state().await }
        });
        api.entered.notified().await;
        device.mark_removed();
        api.release.notify_one();

        let result = poll.await.unwrap();
        assert!(matches!(result, Err(Error::DeviceRemoved)));
        assert!(sink.take().is_empty());
        assert!(device.published().is_empty());
    }

    #[tokio::test]
    async fn actions_after_removal_fail() {
        let api = Arc::new(ScriptedApi::default());
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);
        device.mark_removed();

        assert!(matches!(
            device.set_target_temperature(21.0).await,
            Err(Error::DeviceRemoved)
        ));
        assert!(api.overlays.lock().is_empty());
    }
}

// ============================================================================
// Actions
// ============================================================================

mod actions {
    use super::*;

    #[tokio::test]
    async fn hot_water_without_setpoint_switches() {
        let api = Arc::new(ScriptedApi::default());
        *api.zone_capabilities.lock() =
            serde_json::from_str(r#"{"type": "HOT_WATER", "canSetTemperature": false}"#).unwrap();
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::HotWater, &api, &sink);

        device.set_temperature(0.0, Termination::Manual).await.unwrap();
        device.set_temperature(55.0, Termination::TadoMode).await.unwrap();

        let overlays = api.overlays.lock().clone();
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[0].setting.power, Power::Off);
        assert_eq!(overlays[0].setting.temperature, Setpoint::Null);
        assert_eq!(overlays[1].setting.power, Power::On);
        assert_eq!(overlays[1].setting.temperature, Setpoint::Null);
        assert_eq!(overlays[1].termination, Termination::TadoMode);
    }

    #[tokio::test]
    async fn setpoint_outside_range_is_rejected() {
        let api = Arc::new(ScriptedApi::default());
        *api.zone_capabilities.lock() = serde_json::from_str(
            r#"{"type": "HEATING", "temperatures": {"celsius": {"min": 5, "max": 25, "step": 0.1}}}"#,
        )
        .unwrap();
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);

        let err = device
            .set_temperature(28.0, Termination::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Value(_)));
        assert!(api.overlays.lock().is_empty());

        device
            .set_temperature(21.5, Termination::timer("00:30").unwrap())
            .await
            .unwrap();
        let overlay = api.overlays.lock()[0].clone();
        assert_eq!(overlay.overlay_type.as_deref(), Some("MANUAL"));
        assert_eq!(overlay.setting.temperature, Setpoint::Celsius(21.5));
    }

    #[tokio::test]
    async fn target_temperature_repolls() {
        let api = Arc::new(ScriptedApi::default());
        api.set_state(HEATING);
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Heating, &api, &sink);

        let reduction = device.set_target_temperature(20.0).await.unwrap();
        assert_eq!(reduction.update(Capability::TargetTemperature), Some(&20.0.into()));
        assert_eq!(api.overlays.lock().len(), 1);
    }

    #[tokio::test]
    async fn home_has_no_overlays() {
        let api = Arc::new(ScriptedApi::default());
        let sink = Arc::new(RecordingSink::default());
        let device = device(ZoneKind::Home, &api, &sink);

        assert!(matches!(
            device.set_power(true, Termination::Manual).await,
            Err(Error::CapabilityNotSupported(_))
        ));
    }
}
