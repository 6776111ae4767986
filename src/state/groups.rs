// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Search results, "my groups" and the group being viewed.

use super::sequence::{RequestSequencer, Ticket};
use crate::error::Result;
use crate::models::{GroupDetails, GroupFilters, NewGroup, Pagination, StudyGroup};
use crate::services::{GroupService, Invalidation};
use std::sync::{Arc, Mutex, MutexGuard};

const SEARCH_VIEW: &str = "groups.search";
const MINE_VIEW: &str = "groups.mine";
const CURRENT_VIEW: &str = "groups.current";

/// Everything the group screens render.
#[derive(Debug, Clone, Default)]
pub struct GroupsSnapshot {
    pub groups: Vec<StudyGroup>,
    pub my_groups: Vec<StudyGroup>,
    pub current: Option<GroupDetails>,
    pub pagination: Pagination,
    pub filters: GroupFilters,
}

/// Group lists kept in sync with the server by explicit refetches.
#[derive(Clone)]
pub struct GroupsStore {
    service: GroupService,
    state: Arc<Mutex<GroupsSnapshot>>,
    sequencer: RequestSequencer,
}

impl GroupsStore {
    pub fn new(service: GroupService) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(GroupsSnapshot::default())),
            sequencer: RequestSequencer::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, GroupsSnapshot> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> GroupsSnapshot {
        self.state().clone()
    }

    pub fn groups(&self) -> Vec<StudyGroup> {
        self.state().groups.clone()
    }

    pub fn my_groups(&self) -> Vec<StudyGroup> {
        self.state().my_groups.clone()
    }

    /// Run a search and keep its filters for later refreshes.
    pub async fn search(&self, filters: GroupFilters) -> Result<Pagination> {
        let ticket = self.sequencer.begin(SEARCH_VIEW);
        let page = self.service.search(&filters).await?;
        self.apply_search(ticket, filters, page.groups, page.pagination.clone());
        Ok(page.pagination)
    }

    /// Repeat the last search.
    pub async fn refresh_search(&self) -> Result<Pagination> {
        let filters = self.state().filters.clone();
        self.search(filters).await
    }

    fn apply_search(
        &self,
        ticket: Ticket,
        filters: GroupFilters,
        groups: Vec<StudyGroup>,
        pagination: Pagination,
    ) -> bool {
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(seq = ticket.seq(), "Discarding stale search response");
            return false;
        }
        let mut state = self.state();
        state.groups = groups;
        state.pagination = pagination;
        state.filters = filters;
        true
    }

    pub async fn load_my_groups(&self) -> Result<()> {
        let ticket = self.sequencer.begin(MINE_VIEW);
        let groups = self.service.my_groups().await?;
        if self.sequencer.is_current(ticket) {
            self.state().my_groups = groups;
        } else {
            tracing::debug!(seq = ticket.seq(), "Discarding stale my-groups response");
        }
        Ok(())
    }

    /// Load a group and make it the current one.
    pub async fn open(&self, id: u64) -> Result<GroupDetails> {
        let ticket = self.sequencer.begin(CURRENT_VIEW);
        let details = self.service.get(id).await?;
        if self.sequencer.is_current(ticket) {
            self.state().current = Some(details.clone());
        }
        Ok(details)
    }

    pub async fn create(&self, group: &NewGroup) -> Result<StudyGroup> {
        crate::validation::check(group)?;

        let mutation = self.service.create(group).await?;
        self.state().my_groups.insert(0, mutation.value.clone());

        // "My groups" was updated in place above.
        let pending: Vec<_> = mutation
            .invalidates
            .iter()
            .copied()
            .filter(|view| *view != Invalidation::MyGroups)
            .collect();
        self.refetch(&pending).await;
        Ok(mutation.value)
    }

    /// Join a group, refusing locally when a known record shows it full.
    pub async fn join(&self, id: u64) -> Result<()> {
        let known = self.find(id);
        let mutation = match known {
            Some(group) => self.service.join_checked(&group).await?,
            None => self.service.join(id).await?,
        };
        self.refetch(&mutation.invalidates).await;
        Ok(())
    }

    pub async fn leave(&self, id: u64) -> Result<()> {
        let mutation = self.service.leave(id).await?;
        self.state().my_groups.retain(|g| g.id != id);

        let pending: Vec<_> = mutation
            .invalidates
            .iter()
            .copied()
            .filter(|view| *view != Invalidation::MyGroups)
            .collect();
        self.refetch(&pending).await;
        Ok(())
    }

    /// Delete a group and drop it from every local list without refetching.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let mutation = self.service.delete(id).await?;
        self.remove_local(id);
        self.refetch(&mutation.invalidates).await;
        Ok(())
    }

    fn remove_local(&self, id: u64) {
        let mut state = self.state();
        state.groups.retain(|g| g.id != id);
        state.my_groups.retain(|g| g.id != id);
        if state.current.as_ref().is_some_and(|c| c.group.id == id) {
            state.current = None;
        }
    }

    fn find(&self, id: u64) -> Option<StudyGroup> {
        let state = self.state();
        state
            .current
            .as_ref()
            .map(|c| &c.group)
            .filter(|g| g.id == id)
            .or_else(|| state.groups.iter().find(|g| g.id == id))
            .or_else(|| state.my_groups.iter().find(|g| g.id == id))
            .cloned()
    }

    /// Refetch invalidated views. Failures are logged, not returned: the
    /// mutation that caused them already succeeded.
    pub async fn refetch(&self, invalidations: &[Invalidation]) {
        for view in invalidations {
            let result = match *view {
                Invalidation::GroupSearch => self.refresh_search().await.map(|_| ()),
                Invalidation::MyGroups => self.load_my_groups().await,
                Invalidation::Group(id) => {
                    let is_open = self
                        .state()
                        .current
                        .as_ref()
                        .is_some_and(|c| c.group.id == id);
                    if is_open {
                        self.open(id).await.map(|_| ())
                    } else {
                        Ok(())
                    }
                }
                _ => Ok(()),
            };
            if let Err(e) = result {
                tracing::warn!(view = ?view, error = %e, "Refetch failed");
            }
        }
    }

    /// Forget everything (on logout).
    pub fn reset(&self) {
        for view in [SEARCH_VIEW, MINE_VIEW, CURRENT_VIEW] {
            self.sequencer.cancel(view);
        }
        *self.state() = GroupsSnapshot::default();
    }
}
