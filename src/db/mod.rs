//! Database layer.
//!
//! The store traits are the seam between match detection and persistence.
//! `FirestoreDb` is the production backend; `MemoryDb` backs local runs and tests.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::{AppError, Result};
use crate::models::{validate_user_id, CreateOutcome, Match, PushToken, Swipe};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const SWIPES: &str = "swipes";
    pub const MATCHES: &str = "matches";
    pub const PUSH_TOKENS: &str = "push_tokens";
}

/// Persistence for one-directional swipe decisions.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    /// Record `actor`'s decision about `target`, superseding any earlier one.
    ///
    /// Repeating the stored decision returns the stored record unchanged.
    async fn upsert_swipe(&self, actor_id: &str, target_id: &str, liked: bool) -> Result<Swipe>;

    /// Point lookup of `actor`'s decision about `target`.
    async fn get_swipe(&self, actor_id: &str, target_id: &str) -> Result<Option<Swipe>>;
}

/// Persistence for confirmed mutual matches.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Create the match for the pair unless one already exists.
    ///
    /// Must be a single atomic conditional write at the storage layer.
    async fn create_match_if_absent(
        &self,
        key: &str,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<CreateOutcome>;

    async fn get_match(&self, key: &str) -> Result<Option<Match>>;

    /// Matches involving `user_id`, newest first. Active only unless `include_inactive`.
    async fn list_matches_for(&self, user_id: &str, include_inactive: bool) -> Result<Vec<Match>>;

    /// Unmatch or restore on behalf of participant `user_id`.
    ///
    /// `NotFound` if the pair never matched, or if `user_id` tries to restore
    /// a match the other participant unmatched.
    async fn set_match_active(&self, key: &str, active: bool, user_id: &str) -> Result<Match>;
}

/// Push tokens registered by user devices.
#[async_trait]
pub trait PushTokenStore: Send + Sync {
    async fn get_push_token(&self, user_id: &str) -> Result<Option<PushToken>>;

    async fn set_push_token(&self, token: &PushToken) -> Result<()>;
}

/// Everything the service needs from a backend.
pub trait Store: SwipeStore + MatchStore + PushTokenStore {}

impl<T: SwipeStore + MatchStore + PushTokenStore> Store for T {}

/// Reject malformed or self-directed swipes before any write.
pub(crate) fn validate_swipe(actor_id: &str, target_id: &str) -> Result<()> {
    validate_user_id("actor_id", actor_id)?;
    validate_user_id("target_id", target_id)?;
    if actor_id == target_id {
        return Err(AppError::InvalidArgument(
            "actor_id and target_id must differ".to_string(),
        ));
    }
    Ok(())
}

/// Build the match record for a create-if-absent call, checking the key.
pub(crate) fn new_match_for(key: &str, user_a_id: &str, user_b_id: &str) -> Result<Match> {
    validate_swipe(user_a_id, user_b_id)?;
    let candidate = Match::new(user_a_id, user_b_id);
    if candidate.key != key {
        return Err(AppError::InvalidArgument(format!(
            "match key {:?} does not belong to pair ({}, {})",
            key, user_a_id, user_b_id
        )));
    }
    Ok(candidate)
}

/// Newest match first.
pub(crate) fn sort_newest_first(matches: &mut [Match]) {
    matches.sort_by(|a, b| b.matched_at.cmp(&a.matched_at).then(a.key.cmp(&b.key)));
}
