// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager for coordinating the zones of a home.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::capabilities::Capability;
use crate::device::ZoneDevice;
use crate::event::{DeviceEvent, DeviceId, EventBus, EventNotification};
use crate::labels::Labels;
use crate::protocol::TadoApi;
use crate::sink::NotificationSink;
use crate::store::DeviceStore;
use crate::types::{CapabilityValue, ZoneKind};

use super::device_config::DeviceConfig;
use super::managed_device::{ManagedDevice, PollKind};

/// Manager for the devices of one account.
///
/// The `DeviceManager` owns the poll tasks of every device it manages and
/// forwards everything the devices publish to its [`EventBus`] and, if
/// configured, to a host [`NotificationSink`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tado_bridge::manager::{DeviceConfig, DeviceManager};
/// use tado_bridge::protocol::HttpConfig;
/// use tado_bridge::types::ZoneKind;
///
/// #[tokio::main]
/// async fn main() -> tado_bridge::Result<()> {
///     let api = Arc::new(HttpConfig::new("client", "secret").into_client()?);
///     let manager = DeviceManager::new(api);
///
///     // Subscribe to events
///     let mut events = manager.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("Event: {:?}", event);
///         }
///     });
///
///     // Add a zone; it is polled right away and then periodically
///     let id = manager.add_device(DeviceConfig::zone(12345, 1, ZoneKind::Heating)).await;
///     if let Some(device) = manager.device(id).await {
///         device.set_target_temperature(21.0).await?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct DeviceManager<A: TadoApi> {
    api: Arc<A>,
    /// Managed devices, keyed by device ID.
    devices: Arc<RwLock<HashMap<DeviceId, ManagedDevice<A>>>>,
    /// Sink handed to every device.
    sink: Arc<Forward>,
    labels: Labels,
}

impl<A> DeviceManager<A>
where
    A: TadoApi + Send + Sync + 'static,
{
    /// Creates a new device manager polling through `api`.
    #[must_use]
    pub fn new(api: Arc<A>) -> Self {
        Self::with_capacity(api, EventBus::DEFAULT_CAPACITY)
    }

    /// Creates a new device manager with custom event bus capacity.
    #[must_use]
    pub fn with_capacity(api: Arc<A>, event_capacity: usize) -> Self {
        Self {
            api,
            devices: Arc::new(RwLock::new(HashMap::new())),
            sink: Arc::new(Forward {
                bus: EventBus::with_capacity(event_capacity),
                host: None,
            }),
            labels: Labels::default(),
        }
    }

    /// Forwards everything devices publish to `sink` as well.
    ///
    /// Applies to devices added afterwards.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Arc::new(Forward {
            bus: self.sink.bus.clone(),
            host: Some(sink),
        });
        self
    }

    /// Sets the display strings of devices added afterwards.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Returns the remote API.
    #[must_use]
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to device events.
    ///
    /// Returns a receiver that will receive all events for all managed devices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sink.bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sink.bus.subscriber_count()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Adds a device with an in-memory store.
    ///
    /// See [`add_device_with_store`](Self::add_device_with_store).
    pub async fn add_device(&self, config: DeviceConfig) -> DeviceId {
        self.insert(config, None).await
    }

    /// Adds a device whose records live in `store`.
    ///
    /// Every poll that applies to the kind of the device runs once before
    /// this returns; failures there mark the device unavailable but do not
    /// prevent adding it. The periodic poll tasks start afterwards.
    pub async fn add_device_with_store(
        &self,
        config: DeviceConfig,
        store: Arc<dyn DeviceStore>,
    ) -> DeviceId {
        self.insert(config, Some(store)).await
    }

    async fn insert(&self, config: DeviceConfig, store: Option<Arc<dyn DeviceStore>>) -> DeviceId {
        let sink: Arc<dyn NotificationSink> = self.sink.clone();
        let mut builder = ZoneDevice::builder(config, Arc::clone(&self.api), sink)
            .with_labels(self.labels.clone());
        if let Some(store) = store {
            builder = builder.with_store(store);
        }
        let device = Arc::new(builder.build());
        let device_id = device.id();

        tracing::info!(device_id = %device_id, name = %device.name(), kind = %device.kind(), "Adding device");
        device.poll_all().await;
        if device.kind() == ZoneKind::AirConditioning
            && let Err(e) = device.refresh_zone_control().await
        {
            tracing::warn!(device_id = %device_id, error = %e, "Failed to read zone control");
        }

        let managed = ManagedDevice::start(device);
        self.devices.write().await.insert(device_id, managed);
        self.sink.device_added(device_id);

        device_id
    }

    /// Removes a device from the manager.
    ///
    /// Its poll tasks are aborted and responses still in flight are
    /// discarded.
    ///
    /// # Returns
    ///
    /// Returns `true` if the device was found and removed, `false` otherwise.
    pub async fn remove_device(&self, device_id: DeviceId) -> bool {
        let Some(mut managed) = self.devices.write().await.remove(&device_id) else {
            return false;
        };
        managed.device.mark_removed();
        managed.stop();
        tracing::info!(device_id = %device_id, "Device removed");
        self.sink.device_removed(device_id);
        true
    }

    /// Returns a device.
    pub async fn device(&self, device_id: DeviceId) -> Option<Arc<ZoneDevice<A>>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|m| Arc::clone(&m.device))
    }

    /// Returns a list of all device IDs.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().copied().collect()
    }

    /// Returns the number of managed devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns the polls running for a device.
    pub async fn polls(&self, device_id: DeviceId) -> Option<Vec<PollKind>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(ManagedDevice::polls)
    }

    /// Removes every device.
    pub async fn shutdown(&self) {
        let ids = self.device_ids().await;
        for id in ids {
            self.remove_device(id).await;
        }
    }
}

impl<A: TadoApi> Clone for DeviceManager<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            devices: Arc::clone(&self.devices),
            sink: Arc::clone(&self.sink),
            labels: self.labels.clone(),
        }
    }
}

impl<A: TadoApi> std::fmt::Debug for DeviceManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("event_bus", &self.sink.bus)
            .field("host_sink", &self.sink.host.is_some())
            .finish_non_exhaustive()
    }
}

/// Sink given to managed devices: the event bus plus the host sink.
struct Forward {
    bus: EventBus,
    host: Option<Arc<dyn NotificationSink>>,
}

impl NotificationSink for Forward {
    fn publish_capability(&self, device_id: DeviceId, capability: Capability, value: &CapabilityValue) {
        self.bus.publish_capability(device_id, capability, value);
        if let Some(host) = &self.host {
            host.publish_capability(device_id, capability, value);
        }
    }

    fn fire_event(&self, device_id: DeviceId, notification: &EventNotification) {
        self.bus.fire_event(device_id, notification);
        if let Some(host) = &self.host {
            host.fire_event(device_id, notification);
        }
    }

    fn set_availability(&self, device_id: DeviceId, available: bool, reason: Option<&str>) {
        self.bus.set_availability(device_id, available, reason);
        if let Some(host) = &self.host {
            host.set_availability(device_id, available, reason);
        }
    }

    fn device_added(&self, device_id: DeviceId) {
        self.bus.device_added(device_id);
        if let Some(host) = &self.host {
            host.device_added(device_id);
        }
    }

    fn device_removed(&self, device_id: DeviceId) {
        self.bus.device_removed(device_id);
        if let Some(host) = &self.host {
            host.device_removed(device_id);
        }
    }
}
