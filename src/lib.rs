// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mutual-match: swipe recording and mutual-match detection
//!
//! This crate provides the backend API behind a dating app's swipe deck:
//! it records like/dislike decisions, creates each mutual match exactly once,
//! and notifies both participants.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{MatchDetector, NotificationEmitter, Notifier, SwipeService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub swipe_service: SwipeService,
}

impl AppState {
    /// Wire the services over an explicitly constructed store and notifier.
    pub fn new(config: Config, store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        let emitter = NotificationEmitter::new(notifier, config.notify_timeout);
        let detector = MatchDetector::new(
            store.clone(),
            emitter,
            config.store_timeout,
            config.match_retry_backoff,
        );
        let swipe_service = SwipeService::new(store.clone(), detector, config.store_timeout);

        Self {
            config,
            store,
            swipe_service,
        }
    }
}
