// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mutual-match detection.
//!
//! For each swipe:
//! 1. A dislike never creates (or removes) a match
//! 2. Look up the reverse swipe
//! 3. If the reverse swipe is a like, create the match with the store's
//!    atomic create-if-absent under the canonical pair key
//!
//! Losing the create race is the normal outcome of two people liking each
//! other at the same moment and is reported as `AlreadyMatched`.

use crate::db::{validate_swipe, MatchStore, Store, SwipeStore};
use crate::error::{AppError, Result};
use crate::models::{match_key, CreateOutcome, MatchResult, PairState, Swipe};
use crate::services::bounded_store_call;
use crate::services::notify::NotificationEmitter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Evaluates swipes against the store. Holds no state between calls.
#[derive(Clone)]
pub struct MatchDetector {
    store: Arc<dyn Store>,
    emitter: NotificationEmitter,
    store_timeout: Duration,
    retry_backoff: Duration,
}

impl MatchDetector {
    pub fn new(
        store: Arc<dyn Store>,
        emitter: NotificationEmitter,
        store_timeout: Duration,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            store,
            emitter,
            store_timeout,
            retry_backoff,
        }
    }

    /// Decide whether `swipe` completes a mutual match.
    ///
    /// Store failures are retried once when transient; anything that still
    /// fails is reported as `MatchDetectionFailed`. The swipe record itself is
    /// never touched here.
    pub async fn evaluate(&self, swipe: &Swipe) -> Result<MatchResult> {
        let actor_id = swipe.actor_id.as_str();
        let target_id = swipe.target_id.as_str();
        validate_swipe(actor_id, target_id)?;

        if !swipe.liked {
            tracing::debug!(actor_id, target_id, "Dislike, no match");
            return Ok(MatchResult::NoMatch);
        }

        let reverse = self
            .with_retry("reverse_lookup", || self.store.get_swipe(target_id, actor_id))
            .await
            .map_err(|e| detection_failed(swipe, e))?;

        if !reverse.is_some_and(|r| r.liked) {
            tracing::debug!(actor_id, target_id, "One-sided like, no match yet");
            return Ok(MatchResult::NoMatch);
        }

        let key = match_key(actor_id, target_id);
        let outcome = self
            .with_retry("create_match", || {
                self.store.create_match_if_absent(&key, actor_id, target_id)
            })
            .await
            .map_err(|e| detection_failed(swipe, e))?;

        match outcome {
            CreateOutcome::Created(matched) => {
                tracing::info!(
                    actor_id,
                    target_id,
                    match_key = %matched.key,
                    "New mutual match"
                );
                self.emitter.emit_match(&matched);
                Ok(MatchResult::NewMatch(matched))
            }
            CreateOutcome::AlreadyExists(matched) if !matched.active => {
                // Unmatched pairs stay unmatched until the participant who
                // unmatched restores them; a like must not reveal the record.
                tracing::debug!(
                    actor_id,
                    target_id,
                    match_key = %matched.key,
                    "Pair was unmatched, no match"
                );
                Ok(MatchResult::NoMatch)
            }
            CreateOutcome::AlreadyExists(matched) => {
                tracing::debug!(
                    actor_id,
                    target_id,
                    match_key = %matched.key,
                    "Pair already matched"
                );
                Ok(MatchResult::AlreadyMatched(matched))
            }
        }
    }

    /// Current matching state of the pair, read from the store.
    pub async fn pair_state(&self, u: &str, v: &str) -> Result<PairState> {
        validate_swipe(u, v)?;

        let key = match_key(u, v);
        let (u_to_v, v_to_u, existing) = tokio::try_join!(
            self.bounded(self.store.get_swipe(u, v)),
            self.bounded(self.store.get_swipe(v, u)),
            self.bounded(self.store.get_match(&key)),
        )?;

        Ok(PairState::derive(
            u_to_v.is_some_and(|s| s.liked),
            v_to_u.is_some_and(|s| s.liked),
            existing.as_ref(),
        ))
    }

    /// Run a store call with the timeout, retrying once after the backoff
    /// when the first attempt fails transiently.
    async fn with_retry<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.bounded(call()).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(op, error = %e, backoff = ?self.retry_backoff, "Retrying store call");
                tokio::time::sleep(self.retry_backoff).await;
                self.bounded(call()).await
            }
            other => other,
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        bounded_store_call(self.store_timeout, call).await
    }
}

fn detection_failed(swipe: &Swipe, err: AppError) -> AppError {
    match err {
        AppError::InvalidArgument(_) => err,
        other => {
            tracing::error!(
                actor_id = %swipe.actor_id,
                target_id = %swipe.target_id,
                error = %other,
                "Match detection failed, swipe left recorded"
            );
            AppError::MatchDetectionFailed(other.to_string())
        }
    }
}
