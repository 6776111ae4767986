// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the Connexa REST API.
//!
//! Handles:
//! - Base URL, timeout and default headers
//! - Attaching the session token as a bearer credential
//! - Normalizing failures to the server's `message` or a fallback
//! - Clearing the session when the server rejects the token (401)

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::Ack;
use crate::session::SessionContext;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Connexa API client shared by every service.
///
/// Cheap to clone: the inner [`reqwest::Client`] and session are `Arc`-based.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Build the client from configuration.
    pub fn new(config: &Config, session: SessionContext) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(concat!("connexa-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request without credentials (login, registration, password reset).
    pub fn public(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "API request");
        self.http.request(method, self.url(path))
    }

    /// Request carrying the session token.
    ///
    /// Fails with `NotAuthenticated` before anything is sent when the session
    /// gate is closed.
    pub fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.session.require_token()?;
        tracing::debug!(%method, path, "API request");
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    /// Send a request and decode its JSON body.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let response = self.send(request, fallback).await?;

        response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to decode API response");
            ClientError::Request(fallback.to_string())
        })
    }

    /// Send a request that only confirms an action.
    ///
    /// An empty or non-JSON success body yields an empty [`Ack`].
    pub async fn execute_ack(&self, request: RequestBuilder, fallback: &str) -> Result<Ack> {
        let response = self.send(request, fallback).await?;
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<reqwest::Response> {
        let (http, request) = request.build_split();
        let request = request.map_err(|e| {
            tracing::warn!(error = %e, "Failed to build API request");
            ClientError::Request(fallback.to_string())
        })?;
        let credentialed = request.headers().contains_key(AUTHORIZATION);

        let response = http.execute(request).await.map_err(|e| {
            tracing::warn!(error = %e, "API request failed");
            ClientError::Request(fallback.to_string())
        })?;

        self.check_response(response, credentialed, fallback).await
    }

    /// Check response status and return the normalized error if not successful.
    ///
    /// A 401 only ends the session when the request carried the token.
    async fn check_response(
        &self,
        response: reqwest::Response,
        credentialed: bool,
        fallback: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        if status == StatusCode::UNAUTHORIZED && credentialed {
            tracing::warn!("API rejected the session token (401); clearing session");
            if let Err(e) = self.session.clear() {
                tracing::error!(error = %e, "Failed to clear rejected session");
            }
            return Err(ClientError::SessionExpired(message));
        }

        tracing::debug!(status = status.as_u16(), %message, "API error response");
        Err(ClientError::Request(message))
    }
}

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
