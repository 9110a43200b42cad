// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Swipe model: one user's like/dislike decision about another.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored swipe record (document ID is `swipe_key(actor_id, target_id)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    /// User who swiped
    pub actor_id: String,
    /// User who was swiped on
    pub target_id: String,
    /// The decision
    pub liked: bool,
    /// When this decision was recorded
    pub created_at: DateTime<Utc>,
}

impl Swipe {
    pub fn new(actor_id: &str, target_id: &str, liked: bool) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            liked,
            created_at: Utc::now(),
        }
    }

    /// Document key for this swipe.
    pub fn key(&self) -> String {
        super::swipe_key(&self.actor_id, &self.target_id)
    }
}
