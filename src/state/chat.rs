// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transcript of one group's chat.

use super::sequence::RequestSequencer;
use crate::error::Result;
use crate::models::Message;
use crate::services::MessageService;
use std::sync::{Arc, Mutex, MutexGuard};

const TRANSCRIPT_VIEW: &str = "chat.transcript";

#[derive(Clone)]
pub struct ChatStore {
    group_id: u64,
    service: MessageService,
    messages: Arc<Mutex<Vec<Message>>>,
    sequencer: RequestSequencer,
}

impl ChatStore {
    pub fn new(service: MessageService, group_id: u64) -> Self {
        Self {
            group_id,
            service,
            messages: Arc::new(Mutex::new(Vec::new())),
            sequencer: RequestSequencer::new(),
        }
    }

    fn messages_mut(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn group_id(&self) -> u64 {
        self.group_id
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages_mut().clone()
    }

    /// Replace the transcript with the first page from the server.
    ///
    /// Returns how many messages were not present before, which is what a
    /// poll loop reports as new.
    pub async fn load(&self) -> Result<usize> {
        let ticket = self.sequencer.begin(TRANSCRIPT_VIEW);
        let page = self.service.list(self.group_id, None, None).await?;

        if !self.sequencer.is_current(ticket) {
            tracing::debug!(seq = ticket.seq(), "Discarding stale chat response");
            return Ok(0);
        }

        let mut messages = self.messages_mut();
        let fresh = page
            .messages
            .iter()
            .filter(|m| !messages.iter().any(|known| known.id == m.id))
            .count();
        *messages = page.messages;
        Ok(fresh)
    }

    /// Send a message and append the server's copy to the transcript.
    pub async fn send(&self, content: &str) -> Result<Message> {
        let mutation = self.service.send(self.group_id, content).await?;

        // A poll that started before the send would drop this message.
        self.sequencer.cancel(TRANSCRIPT_VIEW);
        let mut messages = self.messages_mut();
        if !messages.iter().any(|m| m.id == mutation.value.id) {
            messages.push(mutation.value.clone());
        }
        Ok(mutation.value)
    }

    pub async fn delete(&self, message_id: u64) -> Result<()> {
        let _ = self.service.delete(self.group_id, message_id).await?;
        self.messages_mut().retain(|m| m.id != message_id);
        Ok(())
    }
}
