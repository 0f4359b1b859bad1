// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OAuth token lifecycle.
//!
//! - [`OAuthToken`] - Token pair as returned by the token endpoint
//! - [`Grant`] - How a new token is obtained after a 401
//! - [`ListenerId`] / [`TokenListeners`] - Callbacks notified when the token
//!   is replaced, so the host can persist it

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Token pair returned by the token endpoint.
///
/// # Examples
///
/// ```
/// use tado_bridge::protocol::OAuthToken;
///
/// let json = r#"{"access_token": "abc", "refresh_token": "def",
///                "token_type": "bearer", "expires_in": 599}"#;
/// let token: OAuthToken = serde_json::from_str(json).unwrap();
/// assert_eq!(token.access_token, "abc");
/// assert_eq!(token.refresh_token.as_deref(), Some("def"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Bearer token sent with every API request.
    pub access_token: String,
    /// Token used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type, normally `bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Lifetime in seconds from `obtained_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// When the token was received.
    #[serde(default = "Utc::now")]
    pub obtained_at: DateTime<Utc>,
}

impl OAuthToken {
    /// Creates a token from an access token alone.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: Some("bearer".to_string()),
            expires_in: None,
            scope: None,
            obtained_at: Utc::now(),
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Returns when the access token expires, if the lifetime is known.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|secs| self.obtained_at + chrono::Duration::seconds(secs))
    }

    /// Returns `true` if the lifetime is known and has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| at <= Utc::now())
    }
}

/// How the client obtains a new access token after a 401.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// Exchange the stored refresh token.
    RefreshToken,
    /// Log in again with username and password (legacy accounts).
    Password {
        /// Account username.
        username: String,
        /// Account password.
        password: String,
    },
}

impl std::fmt::Debug for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RefreshToken => f.write_str("RefreshToken"),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Error body of the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenErrorBody {
    pub(crate) fn message(self) -> Option<String> {
        self.error.or(self.error_description)
    }
}

/// Identifier returned when registering a token listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

type TokenCallback = Arc<dyn Fn(&OAuthToken) + Send + Sync>;

/// Callbacks notified whenever the client replaces its token.
#[derive(Default)]
pub struct TokenListeners {
    next_id: AtomicU64,
    callbacks: RwLock<HashMap<ListenerId, TokenCallback>>,
}

impl TokenListeners {
    /// Registers a callback.
    pub fn add<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&OAuthToken) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback. Returns `true` if it was registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        self.callbacks.write().remove(&id).is_some()
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Calls every registered callback with `token`.
    pub fn dispatch(&self, token: &OAuthToken) {
        // Clone out so callbacks may register or remove listeners.
        let callbacks: Vec<TokenCallback> = self.callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(token);
        }
    }
}

impl std::fmt::Debug for TokenListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenListeners")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn token_expiry() {
        let mut token = OAuthToken::new("abc");
        assert!(!token.is_expired());
        token.expires_in = Some(600);
        assert!(!token.is_expired());
        token.obtained_at = Utc::now() - chrono::Duration::seconds(601);
        assert!(token.is_expired());
    }

    #[test]
    fn token_roundtrips_through_store_format() {
        let token = OAuthToken::new("abc").with_refresh_token("def");
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["refresh_token"], "def");
        let back: OAuthToken = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn password_is_not_logged() {
        let grant = Grant::Password {
            username: "jane".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{grant:?}");
        assert!(debug.contains("jane"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn listeners_dispatch_and_remove() {
        let listeners = TokenListeners::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = listeners.add(move |token| {
            assert_eq!(token.access_token, "new");
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.dispatch(&OAuthToken::new("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.dispatch(&OAuthToken::new("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }
}
