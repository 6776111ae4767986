// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Study group search, membership and administration.

use super::{Invalidation, Mutation};
use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::group::{CreatedGroup, GroupList, GroupPage, ParticipantList};
use crate::models::{Ack, GroupDetails, GroupFilters, NewGroup, Participant, StudyGroup};
use reqwest::Method;

/// Message returned when a join is refused because the group is at capacity.
pub const GROUP_FULL: &str = "Group is full";

#[derive(Clone, Debug)]
pub struct GroupService {
    api: ApiClient,
}

impl GroupService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Search groups; unset filters are omitted from the query.
    pub async fn search(&self, filters: &GroupFilters) -> Result<GroupPage> {
        let request = self
            .api
            .authed(Method::GET, "/grupos/buscar")?
            .query(&filters.to_query());
        self.api.execute(request, "Failed to search groups").await
    }

    /// Group record with its participants.
    pub async fn get(&self, id: u64) -> Result<GroupDetails> {
        let request = self.api.authed(Method::GET, &format!("/grupos/{}", id))?;
        self.api.execute(request, "Failed to load group").await
    }

    /// Create a group; the creator joins it as admin.
    pub async fn create(&self, group: &NewGroup) -> Result<Mutation<StudyGroup>> {
        let request = self.api.authed(Method::POST, "/grupos")?.json(group);
        let created: CreatedGroup = self.api.execute(request, "Failed to create group").await?;

        tracing::info!(group_id = created.group.id, "Group created");
        Ok(Mutation::new(
            created.group,
            [Invalidation::MyGroups, Invalidation::GroupSearch],
        ))
    }

    /// Join a group by id; a full group is refused by the server.
    pub async fn join(&self, id: u64) -> Result<Mutation<Ack>> {
        let request = self
            .api
            .authed(Method::POST, &format!("/grupos/{}/entrar", id))?;
        let ack = self.api.execute_ack(request, "Failed to join group").await?;

        Ok(Mutation::new(
            ack,
            [
                Invalidation::GroupSearch,
                Invalidation::MyGroups,
                Invalidation::Group(id),
            ],
        ))
    }

    /// Join a group whose record the caller already holds.
    ///
    /// Refused without a request when the record shows no open seats.
    pub async fn join_checked(&self, group: &StudyGroup) -> Result<Mutation<Ack>> {
        if group.is_full() {
            tracing::debug!(group_id = group.id, "Refusing to join full group");
            return Err(ClientError::Request(GROUP_FULL.to_string()));
        }
        self.join(group.id).await
    }

    pub async fn leave(&self, id: u64) -> Result<Mutation<Ack>> {
        let request = self
            .api
            .authed(Method::DELETE, &format!("/grupos/{}/sair", id))?;
        let ack = self.api.execute_ack(request, "Failed to leave group").await?;

        Ok(Mutation::new(
            ack,
            [
                Invalidation::GroupSearch,
                Invalidation::MyGroups,
                Invalidation::Group(id),
            ],
        ))
    }

    /// Delete a group (admin only). Participants are removed server-side.
    ///
    /// Nothing needs refetching: callers drop the group from their lists.
    pub async fn delete(&self, id: u64) -> Result<Mutation<Ack>> {
        let request = self.api.authed(Method::DELETE, &format!("/grupos/{}", id))?;
        let ack = self.api.execute_ack(request, "Failed to delete group").await?;

        tracing::info!(group_id = id, "Group deleted");
        Ok(Mutation::new(ack, Vec::new()))
    }

    /// Groups the signed-in user participates in.
    pub async fn my_groups(&self) -> Result<Vec<StudyGroup>> {
        let request = self.api.authed(Method::GET, "/usuarios/grupos")?;
        let list: GroupList = self
            .api
            .execute(request, "Failed to load your groups")
            .await?;
        Ok(list.groups)
    }

    pub async fn participants(&self, id: u64) -> Result<Vec<Participant>> {
        let request = self
            .api
            .authed(Method::GET, &format!("/grupos/{}/participantes", id))?;
        let list: ParticipantList = self
            .api
            .execute(request, "Failed to load participants")
            .await?;
        Ok(list.into_vec())
    }
}
