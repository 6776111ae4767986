// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile of the signed-in user and account deletion.

use super::{Invalidation, Mutation};
use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::group::GroupList;
use crate::models::user::{AvatarList, ProfileResponse};
use crate::models::{Ack, Avatar, ProfileUpdate, StudyGroup, UserProfile};
use reqwest::Method;

#[derive(Clone, Debug)]
pub struct UserService {
    api: ApiClient,
}

/// Profile endpoint body; wrapped in `usuario` or bare.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Wrapped(ProfileResponse),
    Bare(UserProfile),
}

impl From<ProfileBody> for UserProfile {
    fn from(body: ProfileBody) -> Self {
        match body {
            ProfileBody::Wrapped(response) => response.user,
            ProfileBody::Bare(user) => user,
        }
    }
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        let request = self.api.authed(Method::GET, "/usuarios/perfil")?;
        let body: ProfileBody = self.api.execute(request, "Failed to load profile").await?;
        Ok(body.into())
    }

    /// Update the profile and refresh the cached copy in the session.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Mutation<UserProfile>> {
        if update.is_empty() {
            return Err(ClientError::Validation("Nothing to update".to_string()));
        }

        let request = self.api.authed(Method::PUT, "/usuarios/perfil")?.json(update);
        let body: ProfileBody = self
            .api
            .execute(request, "Failed to update profile")
            .await?;
        let profile: UserProfile = body.into();

        self.api.session().update_user(&profile)?;
        Ok(Mutation::new(profile, [Invalidation::Profile]))
    }

    pub async fn my_groups(&self) -> Result<Vec<StudyGroup>> {
        let request = self.api.authed(Method::GET, "/usuarios/grupos")?;
        let list: GroupList = self.api.execute(request, "Failed to load groups").await?;
        Ok(list.groups)
    }

    /// Predefined avatars the profile may use.
    pub async fn avatars(&self) -> Result<Vec<Avatar>> {
        let request = self.api.authed(Method::GET, "/usuarios/avatares")?;
        let list: AvatarList = self.api.execute(request, "Failed to load avatars").await?;
        Ok(list.into_vec())
    }

    /// Delete the account after password confirmation; ends the session.
    pub async fn delete_account(&self, password: &str) -> Result<Ack> {
        let request = self
            .api
            .authed(Method::DELETE, "/usuarios/conta")?
            .json(&serde_json::json!({ "senha": password }));
        let ack = self
            .api
            .execute_ack(request, "Failed to delete account")
            .await?;

        tracing::info!("Account deleted; clearing session");
        if let Err(e) = self.api.session().clear() {
            tracing::error!(error = %e, "Failed to clear session of deleted account");
        }
        Ok(ack)
    }
}
