// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification list and unread counter.

use super::sequence::RequestSequencer;
use crate::error::{ClientError, Result};
use crate::models::{Notification, NotificationFilters, NotificationKind, Pagination};
use crate::services::NotificationService;
use crate::session::SessionContext;
use std::sync::{Arc, Mutex, MutexGuard};

const LIST_VIEW: &str = "notifications.list";

#[derive(Debug, Clone, Default)]
pub struct NotificationsSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub pagination: Pagination,
}

impl NotificationsSnapshot {
    /// Mark one item read; the counter drops by one, never below zero.
    pub(crate) fn mark_read(&mut self, id: u64) {
        for notification in self.notifications.iter_mut().filter(|n| n.id == id) {
            notification.read = true;
        }
        self.unread_count = self.unread_count.saturating_sub(1);
    }

    pub(crate) fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
        }
        self.unread_count = 0;
    }

    /// Remove one item; the counter drops only if it was unread.
    pub(crate) fn remove(&mut self, id: u64) {
        let was_unread = self
            .notifications
            .iter()
            .any(|n| n.id == id && !n.read);
        self.notifications.retain(|n| n.id != id);
        if was_unread {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
    }
}

/// Notifications of the signed-in user.
#[derive(Clone)]
pub struct NotificationsStore {
    service: NotificationService,
    session: SessionContext,
    state: Arc<Mutex<NotificationsSnapshot>>,
    sequencer: RequestSequencer,
}

impl NotificationsStore {
    pub fn new(service: NotificationService, session: SessionContext) -> Self {
        Self {
            service,
            session,
            state: Arc::new(Mutex::new(NotificationsSnapshot::default())),
            sequencer: RequestSequencer::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, NotificationsSnapshot> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> NotificationsSnapshot {
        self.state().clone()
    }

    pub fn unread_count(&self) -> u64 {
        self.state().unread_count
    }

    /// Reload the list. Skipped entirely while logged out, in which case the
    /// store is emptied.
    pub async fn refresh(&self, filters: &NotificationFilters) -> Result<Pagination> {
        if !self.session.should_make_requests() {
            self.reset();
            return Err(ClientError::NotAuthenticated);
        }

        let ticket = self.sequencer.begin(LIST_VIEW);
        let page = self.service.list(filters).await?;

        if self.sequencer.is_current(ticket) {
            let mut state = self.state();
            state.unread_count = page.stats.map(|s| s.unread).unwrap_or(0);
            state.notifications = page.notifications;
            state.pagination = page.pagination.clone();
        } else {
            tracing::debug!(seq = ticket.seq(), "Discarding stale notifications response");
        }
        Ok(page.pagination)
    }

    /// Replace the list with notifications of one kind; the counter is kept.
    pub async fn show_kind(
        &self,
        kind: NotificationKind,
        filters: &NotificationFilters,
    ) -> Result<Pagination> {
        let ticket = self.sequencer.begin(LIST_VIEW);
        let page = self.service.by_type(kind, filters).await?;

        if self.sequencer.is_current(ticket) {
            let mut state = self.state();
            state.notifications = page.notifications;
            state.pagination = page.pagination.clone();
        }
        Ok(page.pagination)
    }

    // Read-state mutations are applied locally in place of the refetch they ask for.

    pub async fn mark_read(&self, id: u64) -> Result<()> {
        let _ = self.service.mark_read(id).await?;
        self.state().mark_read(id);
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        let _ = self.service.mark_all_read().await?;
        self.state().mark_all_read();
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let _ = self.service.delete(id).await?;
        self.state().remove(id);
        Ok(())
    }

    pub async fn clear_all(&self) -> Result<()> {
        let _ = self.service.clear_all().await?;
        self.sequencer.cancel(LIST_VIEW);
        *self.state() = NotificationsSnapshot::default();
        Ok(())
    }

    /// Forget everything (on logout).
    pub fn reset(&self) {
        self.sequencer.cancel(LIST_VIEW);
        *self.state() = NotificationsSnapshot::default();
    }
}
