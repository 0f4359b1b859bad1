// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Account and home payloads (`GET /me`, `GET /homes/{home}`).

use serde::{Deserialize, Serialize};

/// The logged-in account.
///
/// # Examples
///
/// ```
/// use tado_bridge::response::Me;
///
/// let json = r#"{"name": "Jane", "email": "jane@example.com",
///                "homes": [{"id": 12345, "name": "Home"}]}"#;
/// let me: Me = serde_json::from_str(json).unwrap();
/// assert_eq!(me.homes[0].id, 12345);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    /// Account name.
    pub name: Option<String>,
    /// Account e-mail.
    pub email: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Homes the account has access to.
    #[serde(default)]
    pub homes: Vec<HomeRef>,
}

/// Reference to a home from the account listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HomeRef {
    /// Home identifier.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Home details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    /// Home identifier.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Temperature unit configured for the home.
    pub temperature_unit: Option<String>,
    /// Radius of the home geofence.
    pub away_radius_in_meters: Option<f64>,
}
