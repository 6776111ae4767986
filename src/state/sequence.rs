// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-view request sequencing.
//!
//! Each logical view stamps its requests with a monotonically increasing
//! number. A response is applied only if its ticket is still the newest for
//! that view, so a slow response can never overwrite a newer one.

use dashmap::DashMap;
use std::sync::Arc;

/// Sequence number issued for one request of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    view: &'static str,
    seq: u64,
}

impl Ticket {
    pub fn view(&self) -> &'static str {
        self.view
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Shared counters, one per view name.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: Arc<DashMap<&'static str, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `view`, superseding all earlier ones.
    pub fn begin(&self, view: &'static str) -> Ticket {
        let mut entry = self.latest.entry(view).or_insert(0);
        *entry += 1;
        Ticket { view, seq: *entry }
    }

    /// True if no newer request for the same view has started.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest
            .get(ticket.view)
            .map(|latest| *latest == ticket.seq)
            .unwrap_or(false)
    }

    /// Invalidate every outstanding ticket of `view`.
    pub fn cancel(&self, view: &'static str) {
        self.begin(view);
    }
}
