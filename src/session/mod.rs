// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate: the token and cached profile of the signed-in user.
//!
//! A [`SessionContext`] is created once with [`SessionContext::init`] and a
//! clone of it is handed to the API client and every service. It mirrors two
//! storage keys, `token` and `user`, which are always written and cleared
//! together. At most one session exists per storage location.

pub mod storage;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};

use crate::error::{ClientError, Result};
use crate::models::UserProfile;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Storage key holding the session token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialized user profile.
pub const USER_KEY: &str = "user";

/// An authenticated session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    /// A `user` key exists in storage, parseable or not
    user_stored: bool,
    user: Option<UserProfile>,
}

/// Shared handle to the current session.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    /// Load whatever session the storage currently holds.
    pub fn init(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let token = storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let raw_user = storage.get(USER_KEY)?.filter(|u| !u.is_empty());

        let user = raw_user.as_deref().and_then(|raw| {
            serde_json::from_str::<UserProfile>(raw)
                .map_err(|e| tracing::warn!(error = %e, "Stored user profile is unreadable"))
                .ok()
        });

        tracing::debug!(
            has_token = token.is_some(),
            has_user = user.is_some(),
            "Session loaded from storage"
        );

        Ok(Self {
            storage,
            state: Arc::new(RwLock::new(SessionState {
                token,
                user_stored: raw_user.is_some(),
                user,
            })),
        })
    }

    /// Session backed by process memory only.
    pub fn in_memory() -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Persist a new session, replacing any previous one.
    pub fn establish(&self, session: &Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.user)
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        self.storage.set(TOKEN_KEY, &session.token)?;
        self.storage.set(USER_KEY, &user_json)?;

        let mut state = self.write();
        state.token = Some(session.token.clone());
        state.user_stored = true;
        state.user = Some(session.user.clone());

        tracing::info!(user_id = session.user.id, "Session established");
        Ok(())
    }

    /// Invalidate the session in memory and in storage.
    pub fn clear(&self) -> Result<()> {
        *self.write() = SessionState::default();

        let token_result = self.storage.remove(TOKEN_KEY);
        let user_result = self.storage.remove(USER_KEY);
        token_result.and(user_result)
    }

    /// Replace the cached profile after a successful profile update.
    pub fn update_user(&self, user: &UserProfile) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }

        let user_json =
            serde_json::to_string(user).map_err(|e| ClientError::Storage(e.to_string()))?;
        self.storage.set(USER_KEY, &user_json)?;

        let mut state = self.write();
        state.user_stored = true;
        state.user = Some(user.clone());
        Ok(())
    }

    /// True iff both a token and a profile are stored.
    pub fn is_authenticated(&self) -> bool {
        let state = self.read();
        state.token.is_some() && state.user_stored
    }

    /// Gate for background and feature calls: authenticated with a readable profile.
    pub fn should_make_requests(&self) -> bool {
        let state = self.read();
        state.token.is_some() && state.user_stored && state.user.is_some()
    }

    /// Token to attach to a request, or `NotAuthenticated` when the gate is closed.
    pub fn require_token(&self) -> Result<String> {
        let state = self.read();
        match (&state.token, &state.user) {
            (Some(token), Some(_)) if state.user_stored => Ok(token.clone()),
            _ => Err(ClientError::NotAuthenticated),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn current(&self) -> Option<Session> {
        let state = self.read();
        match (&state.token, &state.user) {
            (Some(token), Some(user)) => Some(Session {
                token: token.clone(),
                user: user.clone(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
