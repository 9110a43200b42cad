// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Document keys and user identifier validation.
//!
//! Identifiers come from the identity provider and are opaque strings.
//! Every key part is percent-encoded, so the `:` separator can never occur
//! inside a part and keys never contain `/` (illegal in Firestore document IDs).

use crate::error::{AppError, Result};

/// Longest user identifier accepted, in bytes.
pub const MAX_USER_ID_LEN: usize = 128;

const KEY_SEPARATOR: char = ':';

/// Validate a user identifier supplied by a caller.
pub fn validate_user_id(field: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!("{} is missing", field)));
    }
    if id.len() > MAX_USER_ID_LEN {
        return Err(AppError::InvalidArgument(format!(
            "{} exceeds {} bytes",
            field, MAX_USER_ID_LEN
        )));
    }
    if id.chars().any(char::is_control) {
        return Err(AppError::InvalidArgument(format!(
            "{} contains control characters",
            field
        )));
    }
    Ok(())
}

fn join_key(first: &str, second: &str) -> String {
    format!(
        "{}{}{}",
        urlencoding::encode(first),
        KEY_SEPARATOR,
        urlencoding::encode(second)
    )
}

/// Document key for the directional swipe `actor -> target`.
pub fn swipe_key(actor_id: &str, target_id: &str) -> String {
    join_key(actor_id, target_id)
}

/// Order two user IDs lexicographically.
pub fn canonical_pair<'a>(u: &'a str, v: &'a str) -> (&'a str, &'a str) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Canonical pair key: the same for `(u, v)` and `(v, u)`.
pub fn match_key(u: &str, v: &str) -> String {
    let (a, b) = canonical_pair(u, v);
    join_key(a, b)
}
