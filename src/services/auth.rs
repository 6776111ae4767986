// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, registration, logout and start-up session verification.

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::user::{AuthResponse, LoginRequest};
use crate::models::{Ack, RegisterRequest};
use crate::session::Session;
use reqwest::Method;

/// Authentication operations.
#[derive(Clone, Debug)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Log in and persist the new session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response: AuthResponse = self
            .api
            .execute(
                self.api.public(Method::POST, "/auth/login").json(&body),
                "Failed to log in",
            )
            .await?;

        self.start_session(response)
    }

    /// Create an account and persist the resulting session.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session> {
        let response: AuthResponse = self
            .api
            .execute(
                self.api.public(Method::POST, "/usuarios/cadastro").json(request),
                "Failed to register",
            )
            .await?;

        self.start_session(response)
    }

    fn start_session(&self, response: AuthResponse) -> Result<Session> {
        let session = Session {
            token: response.token,
            user: response.user,
        };
        self.api.session().establish(&session)?;
        Ok(session)
    }

    /// End the session. No request is made.
    pub fn logout(&self) -> Result<()> {
        tracing::info!("Logging out");
        self.api.session().clear()
    }

    /// Ask the server whether the stored token is still valid.
    pub async fn verify_token(&self) -> Result<Ack> {
        let request = self.api.authed(Method::GET, "/auth/verify-token")?;
        self.api.execute_ack(request, "Invalid token").await
    }

    /// Single start-up check of a cached session.
    ///
    /// Returns the session when the server accepts it. Any failure clears
    /// the session; there is no retry.
    pub async fn restore(&self) -> Result<Option<Session>> {
        let Some(session) = self.api.session().current() else {
            if self.api.session().token().is_some() {
                // Token with a missing or unreadable profile: drop it.
                self.api.session().clear()?;
            }
            return Ok(None);
        };

        match self.verify_token().await {
            Ok(_) => {
                tracing::info!(user_id = session.user.id, "Stored session verified");
                Ok(Some(session))
            }
            Err(e) => {
                tracing::info!(error = %e, "Stored session rejected; clearing");
                self.api.session().clear()?;
                Ok(None)
            }
        }
    }

    /// Request a password reset email.
    pub async fn reset_password(&self, email: &str) -> Result<Ack> {
        let body = serde_json::json!({ "email": email.trim() });
        self.api
            .execute_ack(
                self.api
                    .public(Method::POST, "/auth/reset-password")
                    .json(&body),
                "Failed to send recovery email",
            )
            .await
    }

    /// Set a new password using the token from the reset email.
    pub async fn confirm_reset_password(&self, token: &str, new_password: &str) -> Result<Ack> {
        crate::validation::password_strength(new_password)
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let body = serde_json::json!({ "token": token, "nova_senha": new_password });
        self.api
            .execute_ack(
                self.api
                    .public(Method::POST, "/auth/confirm-reset-password")
                    .json(&body),
                "Failed to change password",
            )
            .await
    }
}
