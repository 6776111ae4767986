// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feature services over the Connexa REST API.
//!
//! Every service holds a clone of the shared [`crate::api::ApiClient`] and
//! resolves each operation to `Ok(data)` or a [`crate::error::ClientError`]
//! carrying a display message. Mutating operations return a [`Mutation`]
//! naming the lists the caller must refetch.

pub mod auth;
pub mod groups;
pub mod messages;
pub mod notifications;
pub mod users;

pub use auth::AuthService;
pub use groups::GroupService;
pub use messages::MessageService;
pub use notifications::NotificationService;
pub use users::UserService;

/// A cached view that a mutation made stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// Group search results
    GroupSearch,
    /// The caller's own groups
    MyGroups,
    /// Details and participants of one group
    Group(u64),
    /// Message transcript of one group
    Messages(u64),
    /// Notification list and counters
    Notifications,
    /// The signed-in user's profile
    Profile,
}

/// Result of a mutating call plus the views it invalidated.
///
/// There is no push channel: the caller owns the obligation to refetch
/// everything in `invalidates`.
#[must_use = "mutations list views that must be refetched"]
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub invalidates: Vec<Invalidation>,
}

impl<T> Mutation<T> {
    pub fn new(value: T, invalidates: impl Into<Vec<Invalidation>>) -> Self {
        Self {
            value,
            invalidates: invalidates.into(),
        }
    }

    pub fn invalidates(&self, view: Invalidation) -> bool {
        self.invalidates.contains(&view)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
