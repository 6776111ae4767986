// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wire models for the Connexa REST API.
//!
//! Field names on the wire are the backend's Portuguese names; the Rust
//! names are mapped with serde renames.

pub mod group;
pub mod message;
pub mod notification;
pub mod pagination;
pub mod user;

use serde::{Deserialize, Serialize};

pub use group::{
    GroupDetails, GroupFilters, GroupLocation, GroupStatus, NewGroup, Participant,
    ParticipantRole, StudyGroup,
};
pub use message::Message;
pub use notification::{Notification, NotificationFilters, NotificationKind, NotificationStats};
pub use pagination::Pagination;
pub use user::{Avatar, ProfileUpdate, RegisterRequest, UserProfile};

/// Body of responses that only confirm an action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
