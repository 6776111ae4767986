// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with a flat, display-oriented shape.
//!
//! Every failure at the HTTP boundary collapses to "the operation failed
//! with this message". The only condition callers branch on is
//! [`ClientError::SessionExpired`], which means the session has already been
//! cleared and the user must log in again.

use serde::{Deserialize, Serialize};

/// Error returned by every client operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("User is not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    SessionExpired(String),

    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    Validation(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Message shown to the user as-is.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// True when the server rejected the session token.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired(_))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(crate::validation::first_message(&errors))
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Normalized `{success, data | error}` outcome.
///
/// Serializes to exactly the shape the web client handed to its views, which
/// makes it convenient for the CLI's `--json` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Convert back into a `Result`, treating any failure as a request error.
    pub fn into_result(self) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ClientError::Request(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            )),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(err) => Outcome::failed(err.message()),
        }
    }
}
