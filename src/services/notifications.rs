// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification listing and read-state management.

use super::{Invalidation, Mutation};
use crate::api::{segment, ApiClient};
use crate::error::Result;
use crate::models::notification::{NotificationPage, StatsEnvelope};
use crate::models::{Ack, NotificationFilters, NotificationKind, NotificationStats};
use reqwest::Method;

#[derive(Clone, Debug)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, filters: &NotificationFilters) -> Result<NotificationPage> {
        let request = self
            .api
            .authed(Method::GET, "/notificacoes")?
            .query(&filters.to_query());
        self.api
            .execute(request, "Failed to load notifications")
            .await
    }

    /// Notifications of a single kind.
    pub async fn by_type(
        &self,
        kind: NotificationKind,
        filters: &NotificationFilters,
    ) -> Result<NotificationPage> {
        let request = self
            .api
            .authed(
                Method::GET,
                &format!("/notificacoes/por-tipo/{}", segment(kind.as_str())),
            )?
            .query(&filters.to_query());
        self.api
            .execute(request, "Failed to load notifications by type")
            .await
    }

    pub async fn mark_read(&self, id: u64) -> Result<Mutation<Ack>> {
        let request = self
            .api
            .authed(Method::PUT, &format!("/notificacoes/{}/lida", id))?;
        let ack = self
            .api
            .execute_ack(request, "Failed to mark notification")
            .await?;
        Ok(Mutation::new(ack, [Invalidation::Notifications]))
    }

    pub async fn mark_all_read(&self) -> Result<Mutation<Ack>> {
        let request = self
            .api
            .authed(Method::PUT, "/notificacoes/marcar-todas-lidas")?;
        let ack = self
            .api
            .execute_ack(request, "Failed to mark notifications")
            .await?;
        Ok(Mutation::new(ack, [Invalidation::Notifications]))
    }

    pub async fn delete(&self, id: u64) -> Result<Mutation<Ack>> {
        let request = self
            .api
            .authed(Method::DELETE, &format!("/notificacoes/{}", id))?;
        let ack = self
            .api
            .execute_ack(request, "Failed to delete notification")
            .await?;
        Ok(Mutation::new(ack, [Invalidation::Notifications]))
    }

    /// Delete every notification of the caller.
    pub async fn clear_all(&self) -> Result<Mutation<Ack>> {
        let request = self
            .api
            .authed(Method::DELETE, "/notificacoes/limpar-todas")?;
        let ack = self
            .api
            .execute_ack(request, "Failed to clear notifications")
            .await?;
        Ok(Mutation::new(ack, [Invalidation::Notifications]))
    }

    pub async fn statistics(&self) -> Result<NotificationStats> {
        let request = self.api.authed(Method::GET, "/notificacoes/estatisticas")?;
        let envelope: StatsEnvelope = self
            .api
            .execute(request, "Failed to load statistics")
            .await?;
        Ok(envelope.stats)
    }
}
