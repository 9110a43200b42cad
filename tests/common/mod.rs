// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mutual_match::config::Config;
use mutual_match::db::{FirestoreDb, MemoryDb};
use mutual_match::error::Result;
use mutual_match::models::Match;
use mutual_match::routes::create_router;
use mutual_match::services::Notifier;
use mutual_match::AppState;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique user ID for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_user_id(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Notifier that records every delivery instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    /// `(user_id, match_key)` pairs delivered so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_match(&self, user_id: &str, matched: &Match) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id.to_string(), matched.key.clone()));
        Ok(())
    }
}

/// Test app over a fresh in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: MemoryDb,
    pub notifier: Arc<RecordingNotifier>,
}

/// Create a test app with the default test config.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(Config::test_default())
}

/// Create a test app with a custom config.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> TestApp {
    let db = MemoryDb::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let state = Arc::new(AppState::new(
        config,
        Arc::new(db.clone()),
        notifier.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        notifier,
    }
}

/// Create a test JWT for `user_id`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, secret: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

/// Wait for background notification tasks to run.
#[allow(dead_code)]
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}
