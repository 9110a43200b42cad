// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Swipes (one document per actor/target pair)
//! - Matches (one document per canonical pair, created with a conditional write)
//! - Push tokens (one document per user)

use crate::db::{
    collections, new_match_for, sort_newest_first, validate_swipe, MatchStore, PushTokenStore,
    SwipeStore,
};
use crate::error::{AppError, Result};
use crate::models::{swipe_key, CreateOutcome, Match, PushToken, Swipe};
use async_trait::async_trait;
use firestore::errors::FirestoreError;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // The emulator rejects real credentials, so connect unauthenticated.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

// ─── Swipe Operations ────────────────────────────────────────

#[async_trait]
impl SwipeStore for FirestoreDb {
    async fn upsert_swipe(&self, actor_id: &str, target_id: &str, liked: bool) -> Result<Swipe> {
        validate_swipe(actor_id, target_id)?;

        // Repeating the stored decision must not rewrite the record.
        if let Some(existing) = self.get_swipe(actor_id, target_id).await? {
            if existing.liked == liked {
                tracing::debug!(actor_id, target_id, liked, "Swipe unchanged");
                return Ok(existing);
            }
        }

        let swipe = Swipe::new(actor_id, target_id, liked);
        let stored: Swipe = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SWIPES)
            .document_id(swipe.key())
            .object(&swipe)
            .execute()
            .await
            .map_err(AppError::from_firestore)?;

        tracing::debug!(actor_id, target_id, liked, "Swipe recorded");
        Ok(stored)
    }

    async fn get_swipe(&self, actor_id: &str, target_id: &str) -> Result<Option<Swipe>> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SWIPES)
            .obj()
            .one(&swipe_key(actor_id, target_id))
            .await
            .map_err(AppError::from_firestore)
    }
}

// ─── Match Operations ────────────────────────────────────────

#[async_trait]
impl MatchStore for FirestoreDb {
    /// Firestore `create` fails with ALREADY_EXISTS when the document exists,
    /// so exactly one concurrent caller wins for a given pair key.
    async fn create_match_if_absent(
        &self,
        key: &str,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<CreateOutcome> {
        let candidate = new_match_for(key, user_a_id, user_b_id)?;

        let created: std::result::Result<Match, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::MATCHES)
            .document_id(&candidate.key)
            .object(&candidate)
            .execute()
            .await;

        match created {
            Ok(stored) => {
                tracing::info!(match_key = %stored.key, "Match created");
                Ok(CreateOutcome::Created(stored))
            }
            Err(FirestoreError::DataConflictError(_)) => {
                let existing = self.get_match(key).await?.ok_or_else(|| {
                    AppError::Database(format!(
                        "Match {} reported as existing but could not be read",
                        key
                    ))
                })?;
                tracing::debug!(match_key = %key, "Match already exists");
                Ok(CreateOutcome::AlreadyExists(existing))
            }
            Err(e) => Err(AppError::from_firestore(e)),
        }
    }

    async fn get_match(&self, key: &str) -> Result<Option<Match>> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MATCHES)
            .obj()
            .one(key)
            .await
            .map_err(AppError::from_firestore)
    }

    async fn list_matches_for(&self, user_id: &str, include_inactive: bool) -> Result<Vec<Match>> {
        let user_id = user_id.to_string();

        let mut matches: Vec<Match> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MATCHES)
            .filter(move |q| {
                q.for_all([
                    q.field("participants").array_contains(user_id.clone()),
                    if include_inactive {
                        None
                    } else {
                        q.field("active").eq(true)
                    },
                ])
            })
            .obj()
            .query()
            .await
            .map_err(AppError::from_firestore)?;

        // Timestamps are stored as RFC3339 strings; order in memory instead of
        // relying on their lexicographic order.
        sort_newest_first(&mut matches);
        Ok(matches)
    }

    async fn set_match_active(&self, key: &str, active: bool, user_id: &str) -> Result<Match> {
        let mut existing = self
            .get_match(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Match {} not found", key)))?;

        if !existing.set_active_by(active, user_id)? {
            return Ok(existing);
        }

        let stored: Match = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MATCHES)
            .document_id(key)
            .object(&existing)
            .execute()
            .await
            .map_err(AppError::from_firestore)?;

        tracing::info!(match_key = %key, active, user_id, "Match visibility changed");
        Ok(stored)
    }
}

// ─── Push Token Operations ───────────────────────────────────

#[async_trait]
impl PushTokenStore for FirestoreDb {
    async fn get_push_token(&self, user_id: &str) -> Result<Option<PushToken>> {
        let doc_id = urlencoding::encode(user_id).into_owned();
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PUSH_TOKENS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(AppError::from_firestore)
    }

    async fn set_push_token(&self, token: &PushToken) -> Result<()> {
        let _: PushToken = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PUSH_TOKENS)
            .document_id(urlencoding::encode(&token.user_id))
            .object(token)
            .execute()
            .await
            .map_err(AppError::from_firestore)?;
        Ok(())
    }
}
