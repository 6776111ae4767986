// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View-model stores.
//!
//! Each store owns the lists one screen renders and updates them from
//! service calls, applying the optimistic local edits and refetches that
//! each mutation calls for. Responses are stamped with per-view tickets so
//! out-of-order arrivals are discarded.

pub mod chat;
pub mod groups;
pub mod notifications;
pub mod sequence;

pub use chat::ChatStore;
pub use groups::{GroupsSnapshot, GroupsStore};
pub use notifications::{NotificationsSnapshot, NotificationsStore};
pub use sequence::{RequestSequencer, Ticket};
