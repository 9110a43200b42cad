// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod keys;
pub mod matching;
pub mod push_token;
pub mod swipe;

pub use keys::{canonical_pair, match_key, swipe_key, validate_user_id};
pub use matching::{CreateOutcome, Match, MatchResult, PairState};
pub use push_token::PushToken;
pub use swipe::Swipe;
