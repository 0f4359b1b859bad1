// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display strings used in derived capability values.
//!
//! Mode labels, battery texts and weather conditions are shown to users, so
//! their words come from a [`Labels`] table. English is the default and a
//! Dutch table is bundled; hosts can load any other language from JSON.
//!
//! ```
//! use tado_bridge::labels::Labels;
//!
//! let labels: Labels = serde_json::from_str(r#"{"manual": "manuell"}"#).unwrap();
//! assert_eq!(labels.manual, "manuell");
//! // Missing entries fall back to English
//! assert_eq!(labels.mode("COOL"), "Cool");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Localizable words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Suffix of a manual overlay, shown in parentheses.
    pub manual: String,
    /// Suffix of an overlay that ends with the next schedule block.
    pub until_schedule: String,
    /// Conjunction before the last serial number of a list.
    pub and: String,
    /// Two devices share a status.
    pub both: String,
    /// More than two devices share a status.
    pub all: String,
    /// Wall thermostat, long form.
    pub thermostat: String,
    /// Wall thermostat, short form.
    pub therm: String,
    /// One radiator valve.
    pub valve: String,
    /// Several radiator valves.
    pub valves: String,
    /// Air-conditioning modes keyed by lowercase vendor id (`off`, `cool`).
    pub modes: BTreeMap<String, String>,
    /// Weather conditions keyed by lowercase vendor id (`sun`, `rain`).
    pub weather: BTreeMap<String, String>,
}

impl Default for Labels {
    fn default() -> Self {
        Self::english()
    }
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl Labels {
    /// English labels.
    #[must_use]
    pub fn english() -> Self {
        Self {
            manual: "manual".to_string(),
            until_schedule: "(until schedule)".to_string(),
            and: "and".to_string(),
            both: "Both".to_string(),
            all: "All".to_string(),
            thermostat: "Thermostat".to_string(),
            therm: "Therm".to_string(),
            valve: "Valve".to_string(),
            valves: "Valves".to_string(),
            modes: table(&[
                ("off", "Off"),
                ("cool", "Cool"),
                ("heat", "Heat"),
                ("dry", "Dry"),
                ("fan", "Fan"),
                ("auto", "Auto"),
            ]),
            weather: table(&[
                ("sun", "Sun"),
                ("cloudy_partly", "Partly cloudy"),
                ("cloudy_mostly", "Mostly cloudy"),
                ("cloudy", "Cloudy"),
                ("foggy", "Foggy"),
                ("drizzle", "Drizzle"),
                ("scattered_rain", "Scattered rain"),
                ("rain", "Rain"),
                ("rain_hail", "Rain and hail"),
                ("hail", "Hail"),
                ("scattered_rain_snow", "Scattered rain and snow"),
                ("rain_snow", "Rain and snow"),
                ("scattered_snow", "Scattered snow"),
                ("snow", "Snow"),
                ("freezing", "Freezing"),
                ("windy", "Windy"),
                ("thunderstorm", "Thunderstorm"),
                ("night_clear", "Clear night"),
                ("night_cloudy", "Cloudy night"),
            ]),
        }
    }

    /// Dutch labels.
    #[must_use]
    pub fn dutch() -> Self {
        Self {
            manual: "handmatig".to_string(),
            until_schedule: "(tot schema)".to_string(),
            and: "en".to_string(),
            both: "Beide".to_string(),
            all: "Alle".to_string(),
            thermostat: "Thermostaat".to_string(),
            therm: "Therm".to_string(),
            valve: "Klep".to_string(),
            valves: "Kleppen".to_string(),
            modes: table(&[
                ("off", "Uit"),
                ("cool", "Koelen"),
                ("heat", "Verwarmen"),
                ("dry", "Drogen"),
                ("fan", "Ventilator"),
                ("auto", "Auto"),
            ]),
            weather: table(&[
                ("sun", "Zon"),
                ("cloudy_partly", "Half bewolkt"),
                ("cloudy_mostly", "Overwegend bewolkt"),
                ("cloudy", "Bewolkt"),
                ("foggy", "Mistig"),
                ("drizzle", "Motregen"),
                ("scattered_rain", "Verspreide regen"),
                ("rain", "Regen"),
                ("rain_hail", "Regen en hagel"),
                ("hail", "Hagel"),
                ("scattered_rain_snow", "Verspreide regen en sneeuw"),
                ("rain_snow", "Regen en sneeuw"),
                ("scattered_snow", "Verspreide sneeuw"),
                ("snow", "Sneeuw"),
                ("freezing", "Vorst"),
                ("windy", "Winderig"),
                ("thunderstorm", "Onweer"),
                ("night_clear", "Heldere nacht"),
                ("night_cloudy", "Bewolkte nacht"),
            ]),
        }
    }

    /// Returns the display name of an air-conditioning mode.
    ///
    /// Unknown modes are capitalized (`"TURBO"` becomes `"Turbo"`).
    #[must_use]
    pub fn mode(&self, raw: &str) -> String {
        let key = raw.to_lowercase();
        self.modes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| capitalize(raw))
    }

    /// Returns the translated weather condition, if any.
    #[must_use]
    pub fn weather_condition(&self, id: &str) -> Option<&str> {
        self.weather.get(id).map(String::as_str)
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("LOW"), "Low");
        assert_eq!(capitalize("cool"), "Cool");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn modes_translate_case_insensitively() {
        let nl = Labels::dutch();
        assert_eq!(nl.mode("COOL"), "Koelen");
        assert_eq!(nl.mode("off"), "Uit");
        assert_eq!(nl.mode("TURBO"), "Turbo");
    }

    #[test]
    fn tables_cover_the_same_conditions() {
        let en = Labels::english();
        let nl = Labels::dutch();
        assert_eq!(
            en.weather.keys().collect::<Vec<_>>(),
            nl.weather.keys().collect::<Vec<_>>()
        );
        assert_eq!(en.weather_condition("night_clear"), Some("Clear night"));
        assert_eq!(en.weather_condition("volcano"), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let labels: Labels = serde_json::from_str(r#"{"and": "und", "both": "Beide"}"#).unwrap();
        assert_eq!(labels.and, "und");
        assert_eq!(labels.valves, "Valves");
        assert_eq!(labels.weather_condition("sun"), Some("Sun"));
    }
}
