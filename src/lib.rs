// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Connexa: study group coordination for university students.
//!
//! This crate is the client side of the Connexa REST API: a session gate
//! that decides whether requests may be sent, one configured HTTP client,
//! typed services for groups, messages, notifications and profiles, and the
//! view-model stores the front ends render.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod query;
pub mod services;
pub mod session;
pub mod state;
pub mod time_utils;
pub mod validation;

use api::ApiClient;
use config::Config;
use error::Result;
use services::{AuthService, GroupService, MessageService, NotificationService, UserService};
use session::{SessionContext, SessionStorage};
use state::{ChatStore, GroupsStore, NotificationsStore};
use std::sync::Arc;

/// Shared client state: one session, one HTTP client, every service.
#[derive(Clone)]
pub struct Connexa {
    pub config: Config,
    pub session: SessionContext,
    pub api: ApiClient,
    pub auth: AuthService,
    pub groups: GroupService,
    pub messages: MessageService,
    pub notifications: NotificationService,
    pub users: UserService,
}

impl Connexa {
    /// Load the session from `storage` and wire up every service around it.
    pub fn new(config: Config, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let session = SessionContext::init(storage)?;
        let api = ApiClient::new(&config, session.clone())?;

        Ok(Self {
            auth: AuthService::new(api.clone()),
            groups: GroupService::new(api.clone()),
            messages: MessageService::new(api.clone()),
            notifications: NotificationService::new(api.clone()),
            users: UserService::new(api.clone()),
            config,
            session,
            api,
        })
    }

    pub fn groups_store(&self) -> GroupsStore {
        GroupsStore::new(self.groups.clone())
    }

    pub fn notifications_store(&self) -> NotificationsStore {
        NotificationsStore::new(self.notifications.clone(), self.session.clone())
    }

    pub fn chat(&self, group_id: u64) -> ChatStore {
        ChatStore::new(self.messages.clone(), group_id)
    }
}
