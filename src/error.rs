// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `tado_bridge` library.
//!
//! The hierarchy separates failures of the remote API ([`ApiError`]),
//! malformed or unexpected payloads ([`ParseError`]), invalid user input
//! ([`ValueError`]) and device lifecycle problems.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error returned while talking to the remote API.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// A response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A supplied value was rejected.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Device was not found in the manager.
    #[error("device not found")]
    DeviceNotFound,

    /// The device was removed while a request was in flight.
    ///
    /// Results observed after teardown are discarded with this error.
    #[error("device has been removed")]
    DeviceRemoved,

    /// The zone kind does not support the requested operation.
    #[error("zone does not support {0}")]
    CapabilityNotSupported(String),
}

impl Error {
    /// Returns `true` if the credentials are no longer usable and the user
    /// has to pair the device again.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::AuthFailed(_) | ApiError::NotLoggedIn)
        )
    }
}

/// Errors raised by the remote client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The access token was rejected (HTTP 401).
    ///
    /// The HTTP client handles this internally by refreshing the token and
    /// retrying once; callers only see it from custom [`TadoApi`] impls.
    ///
    /// [`TadoApi`]: crate::protocol::TadoApi
    #[error("access token expired")]
    AuthExpired,

    /// Authentication is no longer possible without re-pairing.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No token has been configured yet.
    #[error("not logged in")]
    NotLoggedIn,

    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error code from the body, or the canonical reason.
        message: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl ApiError {
    /// Returns the HTTP status code if the error carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::AuthExpired => Some(401),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors related to interpreting API payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A timer argument was not in `HH:MM` form.
    #[error("invalid timer '{0}', expected HH:MM")]
    InvalidTimer(String),

    /// A temperature is outside the range the zone accepts.
    #[error("temperature {actual} is out of range [{min}, {max}]")]
    TemperatureOutOfRange {
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The value that was provided.
        actual: f64,
    },

    /// An unknown air-conditioning mode was supplied.
    #[error("invalid air conditioning mode: {0}")]
    InvalidMode(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
