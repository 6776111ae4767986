// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group chat messages.

use super::{Invalidation, Mutation};
use crate::api::ApiClient;
use crate::config::{LATEST_MESSAGES, MESSAGES_PER_PAGE};
use crate::error::Result;
use crate::models::message::{MessagePage, NewMessage, SentMessage};
use crate::models::{Ack, Message};
use reqwest::Method;

#[derive(Clone, Debug)]
pub struct MessageService {
    api: ApiClient,
}

/// Latest-messages listing; wrapped or bare.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum LatestMessages {
    Wrapped {
        #[serde(rename = "mensagens")]
        messages: Vec<Message>,
    },
    Bare(Vec<Message>),
}

impl MessageService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// One page of a group's messages (1-indexed, 50 per page by default).
    pub async fn list(
        &self,
        group_id: u64,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<MessagePage> {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let per_page = per_page.filter(|p| *p > 0).unwrap_or(MESSAGES_PER_PAGE);

        let request = self
            .api
            .authed(Method::GET, &format!("/grupos/{}/mensagens", group_id))?
            .query(&[("pagina", page), ("limite", per_page)]);
        self.api.execute(request, "Failed to load messages").await
    }

    /// Post a message; content is trimmed and bounded to 1000 characters.
    pub async fn send(&self, group_id: u64, content: &str) -> Result<Mutation<Message>> {
        let content = crate::validation::message_content(content)?;

        let request = self
            .api
            .authed(Method::POST, &format!("/grupos/{}/mensagens", group_id))?
            .json(&NewMessage { content });
        let sent: SentMessage = self.api.execute(request, "Failed to send message").await?;

        Ok(Mutation::new(
            sent.message,
            [Invalidation::Messages(group_id)],
        ))
    }

    /// Most recent messages of a group.
    pub async fn latest(&self, group_id: u64, limit: Option<u32>) -> Result<Vec<Message>> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(LATEST_MESSAGES);

        let request = self
            .api
            .authed(
                Method::GET,
                &format!("/grupos/{}/mensagens/ultimas", group_id),
            )?
            .query(&[("limite", limit)]);
        let latest: LatestMessages = self.api.execute(request, "Failed to load messages").await?;

        Ok(match latest {
            LatestMessages::Wrapped { messages } => messages,
            LatestMessages::Bare(messages) => messages,
        })
    }

    /// Delete one of the caller's messages.
    pub async fn delete(&self, group_id: u64, message_id: u64) -> Result<Mutation<Ack>> {
        let request = self.api.authed(
            Method::DELETE,
            &format!("/grupos/{}/mensagens/{}", group_id, message_id),
        )?;
        let ack = self
            .api
            .execute_ack(request, "Failed to delete message")
            .await?;

        Ok(Mutation::new(ack, [Invalidation::Messages(group_id)]))
    }
}
