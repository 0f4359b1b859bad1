// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone state reducers, one per zone kind.

use crate::capabilities::{Capabilities, Capability};
use crate::event::{EventNotification, Trigger};
use crate::labels::Labels;
use crate::response::{Power, TerminationKind, ZoneState};
use crate::state::PublishedState;
use crate::types::{ZoneKind, format_countdown, round_to};

use super::{Change, Diff, Reduction};

/// Derives capabilities from a zone state.
///
/// Each zone kind has its own implementation; [`reducer_for`] picks it.
pub trait ZoneReducer: Send + Sync {
    /// The zone kind this reducer handles.
    fn kind(&self) -> ZoneKind;

    /// Derives capability values from `state` into `diff`.
    fn reduce(&self, state: &ZoneState, labels: &Labels, diff: &mut Diff<'_>);
}

/// Radiator valves and wall thermostats.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatingReducer;

/// Domestic hot water.
#[derive(Debug, Clone, Copy, Default)]
pub struct HotWaterReducer;

/// Smart AC control.
#[derive(Debug, Clone, Copy, Default)]
pub struct AirConditioningReducer;

impl ZoneReducer for HeatingReducer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Heating
    }

    fn reduce(&self, state: &ZoneState, _labels: &Labels, diff: &mut Diff<'_>) {
        inside_temperature(state, diff);
        humidity(state, diff);
        heating_power(state, diff);
        open_window(state, diff);
        smart_heating(state, diff);
        target_temperature(self.kind(), state, diff);
    }
}

impl ZoneReducer for HotWaterReducer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::HotWater
    }

    fn reduce(&self, state: &ZoneState, _labels: &Labels, diff: &mut Diff<'_>) {
        smart_heating(state, diff);
        target_on_off(state, diff);
        target_temperature(self.kind(), state, diff);
    }
}

impl ZoneReducer for AirConditioningReducer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::AirConditioning
    }

    fn reduce(&self, state: &ZoneState, labels: &Labels, diff: &mut Diff<'_>) {
        inside_temperature(state, diff);
        humidity(state, diff);
        open_window(state, diff);
        smart_heating(state, diff);
        airco_mode(state, labels, diff);
        target_on_off(state, diff);
        target_temperature(self.kind(), state, diff);
    }
}

/// Returns the reducer for a zone kind; the virtual home has none.
#[must_use]
pub fn reducer_for(kind: ZoneKind) -> Option<&'static dyn ZoneReducer> {
    match kind {
        ZoneKind::Heating => Some(&HeatingReducer),
        ZoneKind::HotWater => Some(&HotWaterReducer),
        ZoneKind::AirConditioning => Some(&AirConditioningReducer),
        ZoneKind::Home => None,
    }
}

/// Runs the reducer of `kind` against the published values.
#[must_use]
pub fn reduce_zone_state(
    kind: ZoneKind,
    capabilities: &Capabilities,
    published: &PublishedState,
    state: &ZoneState,
    labels: &Labels,
) -> Reduction {
    let mut diff = Diff::new(capabilities, published);
    if let Some(reducer) = reducer_for(kind) {
        reducer.reduce(state, labels, &mut diff);
    }
    diff.finish()
}

fn inside_temperature(state: &ZoneState, diff: &mut Diff<'_>) {
    if let Some(celsius) = state.inside_temperature() {
        diff.set(Capability::MeasureTemperature, round_to(celsius, 1));
    }
}

fn humidity(state: &ZoneState, diff: &mut Diff<'_>) {
    let Some(percentage) = state.humidity() else {
        return;
    };
    let value = round_to(percentage, 0);
    if diff.set(Capability::MeasureHumidity, value).is_changed() {
        diff.fire(EventNotification::new(Trigger::Humidity).with_token("percentage", value));
    }
}

fn heating_power(state: &ZoneState, diff: &mut Diff<'_>) {
    let Some(percentage) = state.heating_power() else {
        return;
    };
    let value = round_to(percentage, 0);
    if diff.set(Capability::HeatingPower, value).is_changed() {
        diff.fire(EventNotification::new(Trigger::HeatingPower).with_token("percentage", value));
    }
}

fn open_window(state: &ZoneState, diff: &mut Diff<'_>) {
    let value = state.is_window_open();
    if diff.set(Capability::DetectOpenWindow, value).is_changed() {
        diff.fire(EventNotification::new(Trigger::DetectOpenWindow).with_token("detection", value));
    }
}

fn smart_heating(state: &ZoneState, diff: &mut Diff<'_>) {
    let value = state.is_smart_schedule();
    if diff.set(Capability::SmartHeating, value).is_changed() {
        diff.fire(EventNotification::new(Trigger::SmartHeating).with_token("detection", value));
    }
}

fn target_on_off(state: &ZoneState, diff: &mut Diff<'_>) {
    let Some(power) = state.power() else {
        return;
    };
    let value = power == Power::On;
    if diff.set(Capability::TargetOnOff, value).is_changed() {
        diff.fire(EventNotification::new(Trigger::TargetOnOff).with_token("is_on", value));
    }
}

fn target_temperature(kind: ZoneKind, state: &ZoneState, diff: &mut Diff<'_>) {
    let Some(setting) = state.setting.as_ref() else {
        return;
    };
    let value = if setting.power == Some(Power::Off) {
        setting.kind.unwrap_or(kind).off_temperature()
    } else {
        setting.temperature.as_ref().map(|t| round_to(t.celsius, 1))
    };
    if let Some(value) = value {
        diff.set(Capability::TargetTemperature, value);
    }
}

fn airco_mode(state: &ZoneState, labels: &Labels, diff: &mut Diff<'_>) {
    let Some(label) = mode_label(state, labels) else {
        return;
    };
    let mode = leading_token(&label).to_string();
    if let Change::Changed { previous } = diff.set(Capability::AircoMode, label) {
        let previous_mode = previous.as_str().map_or("-", leading_token);
        if previous_mode != mode {
            diff.fire(EventNotification::new(Trigger::AcModeChanged).with_state("mode", mode));
        }
    }
}

fn leading_token(label: &str) -> &str {
    label.split(' ').next().unwrap_or(label)
}

/// Builds the air-conditioning mode label.
///
/// The base is the translated mode (or "Off" when powered off), followed by
/// the overlay annotation: `(manual)`, the remaining timer as `H:MM:SS`, or
/// the until-schedule text.
///
/// # Examples
///
/// ```
/// use tado_bridge::engine::mode_label;
/// use tado_bridge::labels::Labels;
/// use tado_bridge::response::ZoneState;
///
/// let state: ZoneState = serde_json::from_str(r#"{
///     "setting": {"type": "AIR_CONDITIONING", "power": "ON", "mode": "COOL"},
///     "overlay": {"termination": {"type": "TIMER", "remainingTimeInSeconds": 298}}
/// }"#).unwrap();
/// assert_eq!(mode_label(&state, &Labels::default()).unwrap(), "Cool 0:05:00");
/// ```
#[must_use]
pub fn mode_label(state: &ZoneState, labels: &Labels) -> Option<String> {
    let setting = state.setting.as_ref()?;
    let raw = match setting.power? {
        Power::On => setting.mode.as_deref()?,
        Power::Off => "OFF",
        Power::Unknown => return None,
    };
    let base = labels.mode(raw);

    let Some(overlay) = state.overlay.as_ref() else {
        return Some(base);
    };
    let label = match overlay.termination.as_ref().map(|t| (t.kind, t)) {
        Some((TerminationKind::Manual, _)) => format!("{base} ({})", labels.manual),
        Some((TerminationKind::Timer, t)) => {
            format!(
                "{base} {}",
                format_countdown(t.remaining_time_in_seconds.unwrap_or(0))
            )
        }
        Some((TerminationKind::TadoMode, _)) => format!("{base} {}", labels.until_schedule),
        Some((TerminationKind::Unknown, _)) | None => base,
    };
    Some(label)
}
