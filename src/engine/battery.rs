// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery status of the hardware in a zone.
//!
//! Wall thermostats (serial prefix `RU`) and radiator valves (`VA`) report
//! their battery level separately. The zone shows one text combining both
//! classes, for example `"OK"`, `"Both Low"`, `"1 Valve: Low"` or
//! `"Therm:Low, Valves:Low"`.

use std::collections::HashMap;

use serde::Serialize;

use crate::capabilities::{Capabilities, Capability};
use crate::event::{EventNotification, Trigger};
use crate::labels::{Labels, capitalize};
use crate::response::SubDevice;
use crate::state::PublishedState;

use super::{Diff, Reduction};

const NORMAL: &str = "NORMAL";
const OK: &str = "OK";
const THERMOSTAT_PREFIX: &str = "RU";
const VALVE_PREFIX: &str = "VA";

/// Battery summary of one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatteryReport {
    /// Combined status text.
    pub text: String,
    /// No battery is below normal.
    pub all_ok: bool,
    /// Serials with a normal battery, `"A, B and C"`.
    pub ok_serials: String,
    /// Serials with a battery below normal.
    pub not_ok_serials: String,
    /// Number of battery powered devices.
    pub with_battery: usize,
    /// Number of devices with a battery below normal.
    pub not_normal: usize,
}

fn join_serials(serials: &[&str], and: &str) -> String {
    let joined = serials.join(", ");
    match joined.rfind(',') {
        Some(pos) if pos > 0 => format!("{} {and}{}", &joined[..pos], &joined[pos + 1..]),
        _ => joined,
    }
}

fn class_status(status: Option<&String>) -> String {
    match status.map(String::as_str) {
        None => String::new(),
        Some(NORMAL) => OK.to_string(),
        Some(level) => capitalize(level),
    }
}

/// Combines the battery levels of a zone's hardware.
///
/// Per class the status is `OK` when every member is normal, otherwise the
/// last abnormal level seen. Devices without a battery are ignored.
///
/// # Examples
///
/// ```
/// use tado_bridge::engine::summarize_battery;
/// use tado_bridge::labels::Labels;
/// use tado_bridge::response::SubDevice;
///
/// let valve = |serial: &str, level: &str| SubDevice {
///     serial_no: serial.to_string(),
///     battery_state: Some(level.to_string()),
///     ..SubDevice::default()
/// };
/// let devices = [valve("VA1", "NORMAL"), valve("VA2", "LOW"), valve("VA3", "NORMAL")];
/// let report = summarize_battery(&devices, &Labels::default());
/// assert_eq!(report.text, "1 Valve: Low");
/// assert_eq!(report.ok_serials, "VA1 and VA3");
/// assert!(!report.all_ok);
/// ```
#[must_use]
pub fn summarize_battery(devices: &[SubDevice], labels: &Labels) -> BatteryReport {
    let mut status: HashMap<&str, String> = HashMap::new();
    let mut ok: Vec<&str> = Vec::new();
    let mut not_ok: Vec<&str> = Vec::new();
    let mut with_battery = 0usize;

    for device in devices {
        let Some(level) = device.battery_state.as_deref() else {
            continue;
        };
        with_battery += 1;
        let class = status
            .entry(device.type_prefix())
            .or_insert_with(|| NORMAL.to_string());
        if level == NORMAL {
            ok.push(&device.serial_no);
        } else {
            *class = level.to_string();
            not_ok.push(&device.serial_no);
        }
    }

    let not_normal = not_ok.len();
    let therm = class_status(status.get(THERMOSTAT_PREFIX));
    let valve = class_status(status.get(VALVE_PREFIX));

    let txt1 = match (therm.is_empty(), valve.is_empty()) {
        (true, _) => String::new(),
        (false, true) => therm.clone(),
        (false, false) if valve == OK => format!("{}: {therm}", labels.thermostat),
        (false, false) => format!("{}:{therm}", labels.therm),
    };

    let valve_word = |plural: bool| {
        if plural {
            labels.valves.as_str()
        } else {
            labels.valve.as_str()
        }
    };
    let txt2 = if valve.is_empty() {
        String::new()
    } else if !therm.is_empty() {
        if therm == OK {
            format!("{}: {valve}", valve_word(not_normal > 1))
        } else {
            format!("{}:{valve}", valve_word(not_normal > 2))
        }
    } else if with_battery > 1 && not_normal == 1 {
        format!("1 {}: {valve}", labels.valve)
    } else if with_battery == 2 && (not_normal == 2 || not_normal == 0) {
        format!("{} {valve}", labels.both)
    } else if with_battery > 2 && (not_normal == with_battery || not_normal == 0) {
        format!("{} {valve}", labels.all)
    } else if with_battery > 2 && not_normal < with_battery {
        format!("{not_normal} {} {valve}", labels.valves)
    } else {
        valve.clone()
    };

    let text = if therm == OK && valve != OK && !valve.is_empty() {
        txt2
    } else if therm != OK && !therm.is_empty() && valve == OK {
        txt1
    } else if therm == valve && !therm.is_empty() {
        let quantifier = if with_battery == 2 {
            &labels.both
        } else {
            &labels.all
        };
        format!("{quantifier} {therm}")
    } else if !therm.is_empty() && !valve.is_empty() {
        format!("{txt1}, {txt2}")
    } else {
        format!("{txt1}{txt2}")
    };

    BatteryReport {
        text,
        all_ok: not_ok.is_empty(),
        ok_serials: join_serials(&ok, &labels.and),
        not_ok_serials: join_serials(&not_ok, &labels.and),
        with_battery,
        not_normal,
    }
}

/// Publishes the battery text of a zone.
///
/// Fires `battery_state_changed` with `state` (all ok), `isOk` and
/// `isNotOk` (serial lists) when the text differs from the published one.
#[must_use]
pub fn reduce_battery(
    capabilities: &Capabilities,
    published: &PublishedState,
    devices: &[SubDevice],
    labels: &Labels,
) -> Reduction {
    let mut diff = Diff::new(capabilities, published);
    if !diff.declares(Capability::BatteryState) {
        return diff.finish();
    }

    let report = summarize_battery(devices, labels);
    if diff
        .set(Capability::BatteryState, report.text.as_str())
        .is_changed()
    {
        diff.fire(
            EventNotification::new(Trigger::BatteryStateChanged)
                .with_token("state", report.all_ok)
                .with_token("isOk", report.ok_serials)
                .with_token("isNotOk", report.not_ok_serials),
        );
    }
    diff.finish()
}

/// Advances the simulated battery percentage.
///
/// While the battery text mentions a low level the percentage alternates
/// between 0 and 30, otherwise it is 100.
#[must_use]
pub fn battery_blink(capabilities: &Capabilities, published: &PublishedState) -> Reduction {
    let mut diff = Diff::new(capabilities, published);
    if !diff.declares(Capability::BatteryState) {
        return diff.finish();
    }
    let Some(text) = published.get_str(Capability::BatteryState) else {
        return diff.finish();
    };

    let value = if text.to_lowercase().contains("low") {
        match published.get_f64(Capability::MeasureBattery) {
            Some(current) if current == 0.0 => 30.0,
            _ => 0.0,
        }
    } else {
        100.0
    };
    diff.set(Capability::MeasureBattery, value);
    diff.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CapabilityUpdate;
    use crate::types::CapabilityValue;

    fn device(serial: &str, level: Option<&str>) -> SubDevice {
        SubDevice {
            serial_no: serial.to_string(),
            battery_state: level.map(str::to_string),
            ..SubDevice::default()
        }
    }

    fn text(devices: &[SubDevice]) -> String {
        summarize_battery(devices, &Labels::default()).text
    }

    #[test]
    fn two_valves_share_status() {
        let ok = [device("VA1", Some("NORMAL")), device("VA2", Some("NORMAL"))];
        assert_eq!(text(&ok), "Both OK");

        let low = [device("VA1", Some("LOW")), device("VA2", Some("LOW"))];
        assert_eq!(text(&low), "Both Low");
    }

    #[test]
    fn one_of_three_valves_low() {
        let devices = [
            device("VA1", Some("NORMAL")),
            device("VA2", Some("LOW")),
            device("VA3", Some("NORMAL")),
        ];
        assert_eq!(text(&devices), "1 Valve: Low");
    }

    #[test]
    fn valve_quantifiers() {
        let single = [device("VA1", Some("LOW"))];
        assert_eq!(text(&single), "Low");

        let all = [
            device("VA1", Some("NORMAL")),
            device("VA2", Some("NORMAL")),
            device("VA3", Some("NORMAL")),
        ];
        assert_eq!(text(&all), "All OK");

        let partial = [
            device("VA1", Some("LOW")),
            device("VA2", Some("LOW")),
            device("VA3", Some("NORMAL")),
            device("VA4", Some("NORMAL")),
        ];
        assert_eq!(text(&partial), "2 Valves Low");
    }

    #[test]
    fn thermostat_with_valves() {
        let valve_low = [
            device("RU1", Some("NORMAL")),
            device("VA1", Some("LOW")),
            device("VA2", Some("NORMAL")),
        ];
        assert_eq!(text(&valve_low), "Valve: Low");

        let two_valves_low = [
            device("RU1", Some("NORMAL")),
            device("VA1", Some("LOW")),
            device("VA2", Some("LOW")),
        ];
        assert_eq!(text(&two_valves_low), "Valves: Low");

        let therm_low = [device("RU1", Some("LOW")), device("VA1", Some("NORMAL"))];
        assert_eq!(text(&therm_low), "Thermostat: Low");

        let both_low = [device("RU1", Some("LOW")), device("VA1", Some("LOW"))];
        assert_eq!(text(&both_low), "Both Low");

        let all_ok = [
            device("RU1", Some("NORMAL")),
            device("VA1", Some("NORMAL")),
            device("VA2", Some("NORMAL")),
        ];
        assert_eq!(text(&all_ok), "All OK");
    }

    #[test]
    fn distinct_abnormal_levels_concatenate() {
        let devices = [device("RU1", Some("LOW")), device("VA1", Some("CRITICAL"))];
        assert_eq!(text(&devices), "Therm:Low, Valve:Critical");
    }

    #[test]
    fn thermostat_only_and_mains_powered() {
        let therm = [device("RU1", Some("NORMAL")), device("BR1", None)];
        let report = summarize_battery(&therm, &Labels::default());
        assert_eq!(report.text, "OK");
        assert_eq!(report.with_battery, 1);

        let none = [device("BR1", None)];
        assert_eq!(text(&none), "");
    }

    #[test]
    fn serial_lists_use_conjunction() {
        let devices = [
            device("VA1", Some("LOW")),
            device("VA2", Some("LOW")),
            device("VA3", Some("LOW")),
        ];
        let report = summarize_battery(&devices, &Labels::dutch());
        assert_eq!(report.not_ok_serials, "VA1, VA2 en VA3");
        assert_eq!(report.ok_serials, "");
        assert_eq!(report.text, "Alle Low");
    }

    #[test]
    fn reduce_fires_only_on_text_change() {
        let caps = Capabilities::heating();
        let mut published = PublishedState::new();
        let ok = [device("VA1", Some("NORMAL")), device("VA2", Some("NORMAL"))];
        let low = [device("VA1", Some("NORMAL")), device("VA2", Some("LOW"))];

        let seeded = reduce_battery(&caps, &published, &ok, &Labels::default());
        assert!(seeded.events.is_empty());
        for update in &seeded.updates {
            published.apply(update);
        }

        let changed = reduce_battery(&caps, &published, &low, &Labels::default());
        assert_eq!(changed.events.len(), 1);
        let event = &changed.events[0];
        assert_eq!(event.token("state"), Some(&serde_json::json!(false)));
        assert_eq!(event.token("isOk"), Some(&serde_json::json!("VA1")));
        assert_eq!(event.token("isNotOk"), Some(&serde_json::json!("VA2")));
        for update in &changed.updates {
            published.apply(update);
        }

        assert!(reduce_battery(&caps, &published, &low, &Labels::default()).is_empty());
    }

    #[test]
    fn blink_alternates_while_low() {
        let caps = Capabilities::heating();
        let mut published = PublishedState::new();
        published.apply(&CapabilityUpdate::new(Capability::BatteryState, "1 Valve: Low"));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let reduction = battery_blink(&caps, &published);
            for update in &reduction.updates {
                published.apply(update);
            }
            seen.push(published.get_f64(Capability::MeasureBattery).unwrap());
        }
        assert_eq!(seen, vec![0.0, 30.0, 0.0]);

        published.apply(&CapabilityUpdate::new(Capability::BatteryState, "Both OK"));
        let reduction = battery_blink(&caps, &published);
        assert_eq!(
            reduction.update(Capability::MeasureBattery),
            Some(&CapabilityValue::Number(100.0))
        );
    }

    #[test]
    fn blink_waits_for_battery_text() {
        let caps = Capabilities::heating();
        assert!(battery_blink(&caps, &PublishedState::new()).is_empty());
    }
}
