// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod matching;
pub mod notify;
pub mod swipe;

pub use matching::MatchDetector;
pub use notify::{ExpoPushNotifier, LogNotifier, NotificationEmitter, Notifier};
pub use swipe::{SwipeOutcome, SwipeService};

use crate::error::{AppError, Result};
use std::future::Future;
use std::time::Duration;

/// Bound a store call by `timeout`; a timeout is a transient store failure.
pub(crate) async fn bounded_store_call<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or_else(|_| {
            Err(AppError::TransientStoreFailure(format!(
                "store call timed out after {:?}",
                timeout
            )))
        })
}
