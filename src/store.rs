// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device key-value store.
//!
//! Devices keep a few values across restarts: the mobile person records,
//! the air-conditioning switching parameters and the OAuth token. Hosts
//! implement [`DeviceStore`] over their own persistence; [`MemoryStore`]
//! keeps everything in memory.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ParseError;

/// Key under which the mobile person records are stored.
pub const MOBILE_DEVICES_KEY: &str = "mobileDevices";
/// Key of the air-conditioning switching hysteresis in °C.
pub const HYSTERESIS_KEY: &str = "hysteresis";
/// Key of the air-conditioning minimum on/off time in seconds.
pub const MIN_ON_OFF_TIME_KEY: &str = "minOnOffTimeInSeconds";
/// Key of the persisted OAuth token.
pub const TOKEN_KEY: &str = "token";

/// Key-value storage owned by one device.
pub trait DeviceStore: Send + Sync {
    /// Returns a stored value.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores a value, replacing any previous one.
    fn set(&self, key: &str, value: Value);

    /// Removes a value and returns it.
    fn remove(&self, key: &str) -> Option<Value>;
}

/// Reads and deserializes a stored value.
///
/// # Errors
///
/// Returns [`ParseError::Json`] if the stored value has the wrong shape.
pub fn load<T: DeserializeOwned>(
    store: &dyn DeviceStore,
    key: &str,
) -> Result<Option<T>, ParseError> {
    store
        .get(key)
        .map(serde_json::from_value)
        .transpose()
        .map_err(ParseError::from)
}

/// Serializes and stores a value.
///
/// # Errors
///
/// Returns [`ParseError::Json`] if the value cannot be serialized.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn DeviceStore,
    key: &str,
    value: &T,
) -> Result<(), ParseError> {
    store.set(key, serde_json::to_value(value)?);
    Ok(())
}

/// In-memory [`DeviceStore`].
///
/// # Examples
///
/// ```
/// use tado_bridge::store::{DeviceStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("hysteresis", serde_json::json!(0.5));
/// assert_eq!(store.get("hysteresis"), Some(serde_json::json!(0.5)));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl DeviceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.values.lock().remove(key)
    }
}
