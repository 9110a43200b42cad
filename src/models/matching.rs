// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Match model and match detection outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::{canonical_pair, match_key};

/// A confirmed mutual like, stored once per unordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Canonical pair key (also used as document ID)
    pub key: String,
    /// Lexicographically smaller participant
    pub user_a_id: String,
    /// Lexicographically larger participant
    pub user_b_id: String,
    /// Both participants, for "matches of user X" queries
    pub participants: Vec<String>,
    /// When the match was confirmed
    pub matched_at: DateTime<Utc>,
    /// False once a participant unmatches
    pub active: bool,
    /// Last time `active` changed
    pub updated_at: DateTime<Utc>,
    /// Participant who unmatched; only they can restore the match
    #[serde(default)]
    pub unmatched_by: Option<String>,
}

impl Match {
    /// Build a new active match for the pair, in canonical order.
    pub fn new(u: &str, v: &str) -> Self {
        let (a, b) = canonical_pair(u, v);
        let now = Utc::now();
        Self {
            key: match_key(a, b),
            user_a_id: a.to_string(),
            user_b_id: b.to_string(),
            participants: vec![a.to_string(), b.to_string()],
            matched_at: now,
            active: true,
            updated_at: now,
            unmatched_by: None,
        }
    }

    /// Whether `user_id` may see this match. An unmatched pair stays
    /// visible only to the participant who unmatched it.
    pub fn visible_to(&self, user_id: &str) -> bool {
        self.involves(user_id) && (self.active || self.unmatched_by.as_deref() == Some(user_id))
    }

    /// Apply an unmatch or restore requested by `user_id`.
    ///
    /// Returns whether the record changed. Unmatching an inactive match keeps
    /// the original `unmatched_by`. Restoring is reserved for the participant
    /// who unmatched; anyone else gets `NotFound`, the same as for a pair that
    /// never matched.
    pub fn set_active_by(&mut self, active: bool, user_id: &str) -> Result<bool> {
        if !self.visible_to(user_id) {
            return Err(AppError::NotFound(format!("Match {} not found", self.key)));
        }
        if self.active == active {
            return Ok(false);
        }

        self.active = active;
        self.unmatched_by = if active {
            None
        } else {
            Some(user_id.to_string())
        };
        self.updated_at = Utc::now();
        Ok(true)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    /// The participant that is not `user_id`.
    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        if self.user_a_id == user_id {
            Some(&self.user_b_id)
        } else if self.user_b_id == user_id {
            Some(&self.user_a_id)
        } else {
            None
        }
    }
}

/// Outcome of the store's atomic create-if-absent.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(Match),
    AlreadyExists(Match),
}

/// Outcome of evaluating a swipe for a mutual match.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    NoMatch,
    NewMatch(Match),
    AlreadyMatched(Match),
}

impl MatchResult {
    /// Short machine-readable label used in API responses and logs.
    pub fn label(&self) -> &'static str {
        match self {
            MatchResult::NoMatch => "no_match",
            MatchResult::NewMatch(_) => "new_match",
            MatchResult::AlreadyMatched(_) => "already_matched",
        }
    }

    pub fn matched(&self) -> Option<&Match> {
        match self {
            MatchResult::NoMatch => None,
            MatchResult::NewMatch(m) | MatchResult::AlreadyMatched(m) => Some(m),
        }
    }
}

/// Matching state of an unordered pair, derived from stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    /// No like from either side, only dislikes, or the pair was unmatched
    Unmatched,
    /// One side liked the other and no match exists yet. Also reported when
    /// both sides liked but match detection failed before the match was
    /// created; the next evaluation of either swipe creates it.
    PendingOneSided,
    /// An active match exists
    Matched,
}

impl PairState {
    /// Derive the pair state from the two directional decisions and the match record.
    pub fn derive(u_likes_v: bool, v_likes_u: bool, existing: Option<&Match>) -> Self {
        match existing {
            Some(m) if m.active => PairState::Matched,
            Some(_) => PairState::Unmatched,
            None if u_likes_v != v_likes_u => PairState::PendingOneSided,
            // Both liked but no record yet: a failed detection left the pair
            // waiting for the next evaluation to create the match.
            None if u_likes_v => PairState::PendingOneSided,
            None => PairState::Unmatched,
        }
    }
}
