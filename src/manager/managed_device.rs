// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device wrapper for the device manager.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::capabilities::Capability;
use crate::device::ZoneDevice;
use crate::engine::Reduction;
use crate::error::{Error, Result};
use crate::protocol::TadoApi;
use crate::types::ZoneKind;

/// Periodic poll of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    /// Zone state, or presence for the home device.
    State,
    /// Zone list with battery levels.
    ZoneInfo,
    /// Outside weather.
    Weather,
    /// Simulated battery percentage.
    BatteryBlink,
}

impl PollKind {
    /// Returns the name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::ZoneInfo => "zone_info",
            Self::Weather => "weather",
            Self::BatteryBlink => "battery_blink",
        }
    }
}

/// A running poll task.
#[derive(Debug)]
struct PollTask {
    kind: PollKind,
    handle: JoinHandle<()>,
}

/// Internal representation of a device in the manager.
///
/// Dropping it aborts every poll task of the device.
pub(crate) struct ManagedDevice<A: TadoApi> {
    pub device: Arc<ZoneDevice<A>>,
    tasks: Vec<PollTask>,
}

impl<A> ManagedDevice<A>
where
    A: TadoApi + Send + Sync + 'static,
{
    /// Starts the poll tasks that apply to the device.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(device: Arc<ZoneDevice<A>>) -> Self {
        let intervals = device.config().intervals;
        let capabilities = device.capabilities().clone();
        let mut tasks = Vec::new();

        if device.kind() == ZoneKind::Home {
            tasks.push(spawn_poll(&device, PollKind::State, intervals.state, |d| async move {
                d.poll_presence().await
            }));
            tasks.push(spawn_poll(&device, PollKind::Weather, intervals.weather, |d| async move {
                d.poll_weather().await
            }));
        } else {
            tasks.push(spawn_poll(&device, PollKind::State, intervals.state, |d| async move {
                d.poll_state().await
            }));
            if capabilities.contains(Capability::BatteryState) {
                tasks.push(spawn_poll(
                    &device,
                    PollKind::ZoneInfo,
                    intervals.zone_info,
                    |d| async move { d.poll_zone_info().await },
                ));
            }
        }
        if capabilities.contains(Capability::MeasureBattery) {
            tasks.push(spawn_poll(
                &device,
                PollKind::BatteryBlink,
                intervals.battery_blink,
                |d| async move { d.battery_blink() },
            ));
        }

        tracing::debug!(device_id = %device.id(), tasks = tasks.len(), "Poll tasks started");
        Self { device, tasks }
    }

    /// Returns the polls running for the device.
    pub fn polls(&self) -> Vec<PollKind> {
        self.tasks.iter().map(|t| t.kind).collect()
    }

    /// Aborts all poll tasks.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.handle.abort();
        }
    }
}

impl<A: TadoApi> Drop for ManagedDevice<A> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.handle.abort();
        }
    }
}

/// Spawns a task running `poll` every `period`, starting one period from now.
///
/// Failures are logged and the task keeps running; it ends once the device
/// reports [`Error::DeviceRemoved`].
fn spawn_poll<A, F, Fut>(
    device: &Arc<ZoneDevice<A>>,
    kind: PollKind,
    period: Duration,
    poll: F,
) -> PollTask
where
    A: TadoApi + Send + Sync + 'static,
    F: Fn(Arc<ZoneDevice<A>>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Reduction>> + Send,
{
    let device = Arc::clone(device);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match poll(Arc::clone(&device)).await {
                Ok(reduction) => {
                    if !reduction.is_empty() {
                        tracing::debug!(
                            device_id = %device.id(),
                            poll = kind.name(),
                            updates = reduction.updates.len(),
                            events = reduction.events.len(),
                            "Poll applied"
                        );
                    }
                }
                Err(Error::DeviceRemoved) => break,
                Err(e) => {
                    tracing::debug!(device_id = %device.id(), poll = kind.name(), error = %e, "Poll failed, retrying next tick");
                }
            }
        }
        tracing::debug!(device_id = %device.id(), poll = kind.name(), "Poll task finished");
    });
    PollTask { kind, handle }
}
