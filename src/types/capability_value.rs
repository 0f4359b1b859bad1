// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed capability values and the rounding used before comparing them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value published for a capability.
///
/// Numbers are rounded before they are stored (see [`round_to`]), so two
/// values compare equal exactly when they would display the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    /// Boolean capability (on/off, detected/not detected).
    Bool(bool),
    /// Numeric capability (temperatures, percentages).
    Number(f64),
    /// Text capability (mode label, battery status, weather).
    Text(String),
}

impl CapabilityValue {
    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric value, if this is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text value, if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CapabilityValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for CapabilityValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CapabilityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<CapabilityValue> for serde_json::Value {
    fn from(value: CapabilityValue) -> Self {
        match value {
            CapabilityValue::Bool(b) => Self::Bool(b),
            CapabilityValue::Number(n) => serde_json::json!(n),
            CapabilityValue::Text(s) => Self::String(s),
        }
    }
}

/// Rounds `value` to `decimals` decimal places, half away from zero.
///
/// # Examples
///
/// ```
/// use tado_bridge::types::round_to;
///
/// assert_eq!(round_to(19.96, 1), 20.0);
/// assert_eq!(round_to(54.5, 0), 55.0);
/// ```
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_resolution() {
        assert!((round_to(21.04, 1) - 21.0).abs() < f64::EPSILON);
        assert!((round_to(21.05, 1) - 21.1).abs() < 1e-9);
        assert!((round_to(63.4, 0) - 63.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accessors() {
        assert_eq!(CapabilityValue::from(true).as_bool(), Some(true));
        assert_eq!(CapabilityValue::from(20.5).as_f64(), Some(20.5));
        assert_eq!(CapabilityValue::from("Cool").as_str(), Some("Cool"));
        assert_eq!(CapabilityValue::from("Cool").as_bool(), None);
    }

    #[test]
    fn json_conversion() {
        let value: serde_json::Value = CapabilityValue::from(19.5).into();
        assert_eq!(value, serde_json::json!(19.5));
        let value: serde_json::Value = CapabilityValue::from(false).into();
        assert_eq!(value, serde_json::json!(false));
    }
}
