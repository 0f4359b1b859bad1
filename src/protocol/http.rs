// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of the remote client.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::command::OverlayCommand;
use crate::error::{ApiError, ParseError, Result};
use crate::protocol::TadoApi;
use crate::protocol::oauth::{Grant, ListenerId, OAuthToken, TokenErrorBody, TokenListeners};
use crate::response::{
    Home, Me, MobileDevice, Weather, Zone, ZoneCapabilities, ZoneControl, ZoneOverlay, ZoneState,
};

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use tado_bridge::protocol::{HttpConfig, OAuthToken};
/// use std::time::Duration;
///
/// let config = HttpConfig::new("client-id", "client-secret")
///     .with_token(OAuthToken::new("access").with_refresh_token("refresh"))
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), HttpConfig::DEFAULT_BASE_URL);
/// ```
#[derive(Clone)]
pub struct HttpConfig {
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    grant: Grant,
    token: Option<OAuthToken>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://my.tado.com/api/v2";
    /// Default OAuth token endpoint.
    pub const DEFAULT_TOKEN_URL: &'static str = "https://auth.tado.com/oauth/token";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Client id of the web app, used with the password grant.
    pub const LEGACY_CLIENT_ID: &'static str = "tado-web-app";
    /// Public client secret of the web app, used with the password grant.
    pub const LEGACY_CLIENT_SECRET: &'static str =
        "wZaRN7rpjn3FoNyF5IFuxg9uMzYJcvOoQ8QWiIqS3hfk6gLhVlG57j5YNoZL2Rtc";

    /// Creates a configuration using the refresh-token grant.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant: Grant::RefreshToken,
            token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Switches to the legacy password grant with the web app client.
    #[must_use]
    pub fn with_password_grant(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.grant = Grant::Password {
            username: username.into(),
            password: password.into(),
        };
        Self::LEGACY_CLIENT_ID.clone_into(&mut self.client_id);
        Self::LEGACY_CLIENT_SECRET.clone_into(&mut self.client_secret);
        self
    }

    /// Sets the API base URL. A trailing slash is removed.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the OAuth token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Sets the initial token (for example one restored from the store).
    #[must_use]
    pub fn with_token(mut self, token: OAuthToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns the OAuth client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the grant used after a 401.
    #[must_use]
    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an [`HttpClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is malformed or the HTTP client cannot be
    /// created.
    pub fn into_client(self) -> std::result::Result<HttpClient, ApiError> {
        for url in [&self.base_url, &self.token_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ApiError::InvalidAddress(url.clone()));
            }
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(HttpClient {
            inner: Arc::new(Inner {
                client,
                base_url: self.base_url,
                token_url: self.token_url,
                client_id: self.client_id,
                client_secret: self.client_secret,
                grant: self.grant,
                token: RwLock::new(self.token),
                listeners: TokenListeners::default(),
            }),
        })
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("grant", &self.grant)
            .field("has_token", &self.token.is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// Bearer-authenticated client for the remote API.
///
/// Cloning is cheap; clones share the token and the token listeners.
///
/// # Examples
///
/// ```no_run
/// use tado_bridge::protocol::{HttpConfig, OAuthToken, TadoApi};
///
/// # async fn example() -> tado_bridge::Result<()> {
/// let client = HttpConfig::new("client-id", "client-secret")
///     .with_token(OAuthToken::new("access").with_refresh_token("refresh"))
///     .into_client()?;
/// client.on_token_changed(|token| println!("persist {}", token.access_token));
/// let me = client.get_me().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    grant: Grant,
    token: RwLock<Option<OAuthToken>>,
    listeners: TokenListeners,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .field("grant", &self.inner.grant)
            .field("listeners", &self.inner.listeners)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the current token.
    #[must_use]
    pub fn token(&self) -> Option<OAuthToken> {
        self.inner.token.read().clone()
    }

    /// Replaces the token without notifying listeners.
    pub fn set_token(&self, token: OAuthToken) {
        *self.inner.token.write() = Some(token);
    }

    /// Registers a callback invoked whenever the client obtains a new token.
    pub fn on_token_changed<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&OAuthToken) + Send + Sync + 'static,
    {
        self.inner.listeners.add(callback)
    }

    /// Removes a token callback. Returns `true` if it was registered.
    pub fn remove_token_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Obtains a new token with the configured grant and stores it.
    ///
    /// Listeners are notified on success.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthFailed`] if the token endpoint rejects the
    /// grant, or [`ApiError::NotLoggedIn`] if a refresh is needed but no
    /// refresh token is known.
    pub async fn renew_token(&self) -> std::result::Result<OAuthToken, ApiError> {
        let inner = &self.inner;
        let mut params: Vec<(&str, String)> = vec![
            ("client_id", inner.client_id.clone()),
            ("client_secret", inner.client_secret.clone()),
        ];

        let request = match &inner.grant {
            Grant::Password { username, password } => {
                params.push(("grant_type", "password".to_string()));
                params.push(("scope", "home.user".to_string()));
                params.push(("username", username.clone()));
                params.push(("password", password.clone()));
                inner
                    .client
                    .post(&inner.token_url)
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(encode_params(&params))
            }
            Grant::RefreshToken => {
                let refresh_token = self
                    .token()
                    .and_then(|t| t.refresh_token)
                    .ok_or(ApiError::NotLoggedIn)?;
                params.push(("grant_type", "refresh_token".to_string()));
                params.push(("refresh_token", refresh_token));
                let url = format!("{}?{}", inner.token_url, encode_params(&params));
                inner.client.post(url)
            }
        };

        tracing::debug!(url = %inner.token_url, grant = ?inner.grant, "Requesting token");

        let response = request.send().await.map_err(ApiError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Http)?;

        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorBody>(&body)
                .ok()
                .and_then(TokenErrorBody::message)
                .unwrap_or_else(|| format!("token endpoint returned HTTP {}", status.as_u16()));
            return Err(ApiError::AuthFailed(message));
        }

        let token: OAuthToken = serde_json::from_str(&body)
            .map_err(|e| ApiError::AuthFailed(format!("invalid token response: {e}")))?;

        self.set_token(token.clone());
        tracing::info!("Access token renewed");
        inner.listeners.dispatch(&token);
        Ok(token)
    }

    /// Sends a request, renewing the token and retrying once on HTTP 401.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> std::result::Result<String, ApiError> {
        match self.send(method.clone(), path, body).await {
            Err(ApiError::AuthExpired) => {
                tracing::debug!(path, "Access token rejected, renewing");
                self.renew_token().await?;
                match self.send(method, path, body).await {
                    Err(ApiError::AuthExpired) => Err(ApiError::AuthFailed(
                        "access token rejected after renewal".to_string(),
                    )),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> std::result::Result<String, ApiError> {
        let access_token = self
            .inner
            .token
            .read()
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(ApiError::NotLoggedIn)?;

        let url = format!("{}{path}", self.inner.base_url);
        tracing::debug!(%method, url = %url, "Sending API request");

        let mut request = self
            .inner
            .client
            .request(method, &url)
            .bearer_auth(access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Http)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthExpired);
        }

        let text = response.text().await.map_err(ApiError::Http)?;

        if !status.is_success() {
            let message = error_code(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string()
            });
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(url = %url, body = %text, "Received API response");
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.call(Method::GET, path, None).await?;
        serde_json::from_str(&body).map_err(|e| ParseError::Json(e).into())
    }
}

/// Extracts `errors[0].code` from an API error body.
fn error_code(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("errors")?
        .get(0)?
        .get("code")?
        .as_str()
        .map(str::to_string)
}

fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn zone_path(home_id: u64, zone_id: u32, resource: &str) -> String {
    format!("/homes/{home_id}/zones/{zone_id}/{resource}")
}

fn control_path(home_id: u64, zone_id: u32, variant: Option<&str>) -> String {
    match variant.map(str::trim).filter(|v| !v.is_empty()) {
        Some(variant) => zone_path(
            home_id,
            zone_id,
            &format!("control/{}", urlencoding::encode(variant)),
        ),
        None => zone_path(home_id, zone_id, "control"),
    }
}

impl TadoApi for HttpClient {
    async fn get_me(&self) -> Result<Me> {
        self.get_json("/me").await
    }

    async fn get_home(&self, home_id: u64) -> Result<Home> {
        self.get_json(&format!("/homes/{home_id}")).await
    }

    async fn get_zones(&self, home_id: u64) -> Result<Vec<Zone>> {
        self.get_json(&format!("/homes/{home_id}/zones")).await
    }

    async fn get_zone_capabilities(&self, home_id: u64, zone_id: u32) -> Result<ZoneCapabilities> {
        self.get_json(&zone_path(home_id, zone_id, "capabilities"))
            .await
    }

    async fn get_weather(&self, home_id: u64) -> Result<Weather> {
        self.get_json(&format!("/homes/{home_id}/weather")).await
    }

    async fn get_state(&self, home_id: u64, zone_id: u32) -> Result<ZoneState> {
        self.get_json(&zone_path(home_id, zone_id, "state")).await
    }

    async fn get_mobile_devices(&self, home_id: u64) -> Result<Vec<MobileDevice>> {
        self.get_json(&format!("/homes/{home_id}/mobileDevices"))
            .await
    }

    async fn get_zone_control(
        &self,
        home_id: u64,
        zone_id: u32,
        variant: Option<&str>,
    ) -> Result<ZoneControl> {
        self.get_json(&control_path(home_id, zone_id, variant))
            .await
    }

    async fn get_overlay(&self, home_id: u64, zone_id: u32) -> Result<ZoneOverlay> {
        self.get_json(&zone_path(home_id, zone_id, "overlay")).await
    }

    async fn set_overlay(
        &self,
        home_id: u64,
        zone_id: u32,
        overlay: &OverlayCommand,
    ) -> Result<()> {
        let body = serde_json::to_value(overlay).map_err(ParseError::Json)?;
        self.call(
            Method::PUT,
            &zone_path(home_id, zone_id, "overlay"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn unset_overlay(&self, home_id: u64, zone_id: u32) -> Result<()> {
        self.call(
            Method::DELETE,
            &zone_path(home_id, zone_id, "overlay"),
            None,
        )
        .await?;
        Ok(())
    }
}
