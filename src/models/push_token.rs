// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Push token registered by a device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Expo push token for a user (document ID is the user ID).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushToken {
    pub user_id: String,
    /// e.g. "ExponentPushToken[xxxxxxxx]"
    pub token: String,
    pub updated_at: DateTime<Utc>,
}
