// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.
//!
//! Conditional creates go through the `DashMap` entry API, which holds the
//! shard lock for the whole check-and-insert. Fault injection hooks let tests
//! simulate transient store failures and slow calls.

use crate::db::{
    new_match_for, sort_newest_first, validate_swipe, MatchStore, PushTokenStore, SwipeStore,
};
use crate::error::{AppError, Result};
use crate::models::{swipe_key, CreateOutcome, Match, PushToken, Swipe};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    swipes: Arc<DashMap<String, Swipe>>,
    matches: Arc<DashMap<String, Match>>,
    push_tokens: Arc<DashMap<String, PushToken>>,
    faults: Arc<Faults>,
}

#[derive(Default)]
struct Faults {
    /// Remaining `create_match_if_absent` calls that fail as transient.
    creates: AtomicU32,
    /// Remaining `get_swipe` calls that fail as transient.
    lookups: AtomicU32,
    /// Delay (ms) applied before every `create_match_if_absent`.
    create_delay_ms: AtomicU64,
}

/// Consume one injected fault, if any remain.
fn take_fault(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` conditional creates fail with a transient error.
    pub fn fail_next_creates(&self, count: u32) {
        self.faults.creates.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` swipe lookups fail with a transient error.
    pub fn fail_next_lookups(&self, count: u32) {
        self.faults.lookups.store(count, Ordering::SeqCst);
    }

    /// Delay every conditional create, e.g. to trip the caller's timeout.
    pub fn set_create_delay(&self, delay: Duration) {
        self.faults
            .create_delay_ms
            .store(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), Ordering::SeqCst);
    }

    pub fn swipe_count(&self) -> usize {
        self.swipes.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

#[async_trait]
impl SwipeStore for MemoryDb {
    async fn upsert_swipe(&self, actor_id: &str, target_id: &str, liked: bool) -> Result<Swipe> {
        validate_swipe(actor_id, target_id)?;

        let stored = match self.swipes.entry(swipe_key(actor_id, target_id)) {
            Entry::Occupied(entry) if entry.get().liked == liked => entry.get().clone(),
            Entry::Occupied(mut entry) => {
                let swipe = Swipe::new(actor_id, target_id, liked);
                entry.insert(swipe.clone());
                swipe
            }
            Entry::Vacant(entry) => entry
                .insert(Swipe::new(actor_id, target_id, liked))
                .value()
                .clone(),
        };

        Ok(stored)
    }

    async fn get_swipe(&self, actor_id: &str, target_id: &str) -> Result<Option<Swipe>> {
        if take_fault(&self.faults.lookups) {
            return Err(AppError::TransientStoreFailure(
                "injected lookup fault".to_string(),
            ));
        }

        Ok(self
            .swipes
            .get(&swipe_key(actor_id, target_id))
            .map(|s| s.value().clone()))
    }
}

#[async_trait]
impl MatchStore for MemoryDb {
    async fn create_match_if_absent(
        &self,
        key: &str,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<CreateOutcome> {
        let candidate = new_match_for(key, user_a_id, user_b_id)?;

        let delay_ms = self.faults.create_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if take_fault(&self.faults.creates) {
            return Err(AppError::TransientStoreFailure(
                "injected create fault".to_string(),
            ));
        }

        let outcome = match self.matches.entry(candidate.key.clone()) {
            Entry::Occupied(entry) => CreateOutcome::AlreadyExists(entry.get().clone()),
            Entry::Vacant(entry) => CreateOutcome::Created(entry.insert(candidate).value().clone()),
        };

        Ok(outcome)
    }

    async fn get_match(&self, key: &str) -> Result<Option<Match>> {
        Ok(self.matches.get(key).map(|m| m.value().clone()))
    }

    async fn list_matches_for(&self, user_id: &str, include_inactive: bool) -> Result<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .matches
            .iter()
            .filter(|m| m.involves(user_id) && (include_inactive || m.active))
            .map(|m| m.value().clone())
            .collect();

        sort_newest_first(&mut matches);
        Ok(matches)
    }

    async fn set_match_active(&self, key: &str, active: bool, user_id: &str) -> Result<Match> {
        let mut entry = self
            .matches
            .get_mut(key)
            .ok_or_else(|| AppError::NotFound(format!("Match {} not found", key)))?;

        entry.set_active_by(active, user_id)?;
        Ok(entry.value().clone())
    }
}

#[async_trait]
impl PushTokenStore for MemoryDb {
    async fn get_push_token(&self, user_id: &str) -> Result<Option<PushToken>> {
        Ok(self.push_tokens.get(user_id).map(|t| t.value().clone()))
    }

    async fn set_push_token(&self, token: &PushToken) -> Result<()> {
        self.push_tokens.insert(token.user_id.clone(), token.clone());
        Ok(())
    }
}
