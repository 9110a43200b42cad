// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swipe workflow: record the decision, then look for a mutual match.
//!
//! The swipe write and match detection are decoupled. Once the swipe is
//! stored it stays stored, even when detection fails afterwards.

use crate::db::{Store, SwipeStore};
use crate::error::Result;
use crate::models::{MatchResult, Swipe};
use crate::services::bounded_store_call;
use crate::services::matching::MatchDetector;
use std::sync::Arc;
use std::time::Duration;

/// Records swipes and runs match detection on them.
#[derive(Clone)]
pub struct SwipeService {
    store: Arc<dyn Store>,
    detector: MatchDetector,
    store_timeout: Duration,
}

/// Result of recording a swipe.
#[derive(Debug)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    pub result: MatchResult,
}

impl SwipeService {
    pub fn new(store: Arc<dyn Store>, detector: MatchDetector, store_timeout: Duration) -> Self {
        Self {
            store,
            detector,
            store_timeout,
        }
    }

    pub fn detector(&self) -> &MatchDetector {
        &self.detector
    }

    /// Record `actor`'s decision on `target` and evaluate it.
    ///
    /// Errors:
    /// - `InvalidArgument` before anything is written
    /// - store errors from the swipe write itself
    /// - `MatchDetectionFailed` after the swipe was written
    pub async fn record_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        liked: bool,
    ) -> Result<SwipeOutcome> {
        tracing::info!(actor_id, target_id, liked, "Recording swipe");

        let swipe = bounded_store_call(
            self.store_timeout,
            self.store.upsert_swipe(actor_id, target_id, liked),
        )
        .await?;

        let result = self.detector.evaluate(&swipe).await?;

        tracing::info!(
            actor_id,
            target_id,
            result = result.label(),
            "Swipe evaluated"
        );

        Ok(SwipeOutcome { swipe, result })
    }
}
