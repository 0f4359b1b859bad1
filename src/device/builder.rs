// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone device builder.

use std::sync::Arc;

use crate::device::ZoneDevice;
use crate::engine::{MobileTracker, PersonRecord};
use crate::event::DeviceId;
use crate::labels::Labels;
use crate::manager::DeviceConfig;
use crate::protocol::TadoApi;
use crate::sink::NotificationSink;
use crate::store::{self, DeviceStore, MOBILE_DEVICES_KEY, MemoryStore};

/// Builder for creating a [`ZoneDevice`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tado_bridge::device::ZoneDevice;
/// use tado_bridge::event::EventBus;
/// use tado_bridge::labels::Labels;
/// use tado_bridge::manager::DeviceConfig;
/// use tado_bridge::protocol::HttpConfig;
/// use tado_bridge::types::ZoneKind;
///
/// # async fn example() -> tado_bridge::Result<()> {
/// let api = Arc::new(HttpConfig::new("client", "secret").into_client()?);
/// let bus = Arc::new(EventBus::new());
///
/// let device = ZoneDevice::builder(DeviceConfig::zone(1, 1, ZoneKind::Heating), api, bus)
///     .with_labels(Labels::dutch())
///     .build();
/// device.poll_state().await?;
/// # Ok(())
/// # }
/// ```
pub struct ZoneDeviceBuilder<A: TadoApi> {
    config: DeviceConfig,
    api: Arc<A>,
    sink: Arc<dyn NotificationSink>,
    id: Option<DeviceId>,
    store: Option<Arc<dyn DeviceStore>>,
    labels: Labels,
}

impl<A: TadoApi> ZoneDeviceBuilder<A> {
    pub(crate) fn new(config: DeviceConfig, api: Arc<A>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            api,
            sink,
            id: None,
            store: None,
            labels: Labels::default(),
        }
    }

    /// Uses a fixed device id instead of a random one.
    #[must_use]
    pub fn with_id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the key-value store of the device.
    ///
    /// Without one an in-memory store is used.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DeviceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the display strings.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Returns the configuration the device will be built with.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Builds the device.
    ///
    /// Mobile device records persisted by an earlier run are restored from
    /// the store; unreadable records are dropped.
    #[must_use]
    pub fn build(self) -> ZoneDevice<A> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn DeviceStore>);
        let id = self.id.unwrap_or_default();

        let tracker = match store::load::<Vec<PersonRecord>>(store.as_ref(), MOBILE_DEVICES_KEY) {
            Ok(Some(records)) => {
                tracing::debug!(device_id = %id, count = records.len(), "Restored mobile device records");
                MobileTracker::from_records(records)
            }
            Ok(None) => MobileTracker::new(),
            Err(e) => {
                tracing::warn!(device_id = %id, error = %e, "Discarding unreadable mobile device records");
                MobileTracker::new()
            }
        };

        ZoneDevice::new(
            id,
            self.config,
            self.api,
            self.sink,
            store,
            self.labels,
            tracker,
        )
    }
}

impl<A: TadoApi> std::fmt::Debug for ZoneDeviceBuilder<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneDeviceBuilder")
            .field("config", &self.config)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
