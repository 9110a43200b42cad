// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db::{validate_swipe, MatchStore, PushTokenStore, SwipeStore};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{match_key, Match, PairState, PushToken, Swipe};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/swipes", post(create_swipe))
        .route("/api/swipes/{target_id}", get(get_swipe))
        .route("/api/matches", get(list_matches))
        .route(
            "/api/matches/{other_user_id}",
            get(get_match).patch(update_match).delete(unmatch),
        )
        .route("/api/matches/{other_user_id}/state", get(get_pair_state))
        .route("/api/push-token", put(register_push_token))
}

// ─── Swipes ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(length(min = 1, max = 128))]
    pub target_id: String,
    pub liked: bool,
}

/// Swipe as returned to its author.
#[derive(Serialize)]
pub struct SwipeView {
    pub target_id: String,
    pub liked: bool,
    pub created_at: String,
}

impl From<Swipe> for SwipeView {
    fn from(swipe: Swipe) -> Self {
        Self {
            target_id: swipe.target_id,
            liked: swipe.liked,
            created_at: format_utc_rfc3339(swipe.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct SwipeResponse {
    pub swipe: SwipeView,
    /// "no_match", "new_match" or "already_matched"
    pub result: &'static str,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchView>,
}

/// Record a like/dislike and report whether it completed a match.
async fn create_swipe(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SwipeRequest>,
) -> Result<Json<SwipeResponse>> {
    req.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let outcome = state
        .swipe_service
        .record_swipe(&user.user_id, &req.target_id, req.liked)
        .await?;

    let matched = outcome
        .result
        .matched()
        .map(|m| MatchView::for_user(m, &user.user_id));

    Ok(Json(SwipeResponse {
        result: outcome.result.label(),
        swipe: outcome.swipe.into(),
        matched,
    }))
}

/// Get the caller's own decision about a target.
async fn get_swipe(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target_id): Path<String>,
) -> Result<Json<SwipeView>> {
    validate_swipe(&user.user_id, &target_id)?;

    let swipe = state
        .store
        .get_swipe(&user.user_id, &target_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No swipe on {}", target_id)))?;

    Ok(Json(swipe.into()))
}

// ─── Matches ─────────────────────────────────────────────────

/// Match as seen by one participant.
#[derive(Serialize)]
pub struct MatchView {
    pub match_key: String,
    pub other_user_id: String,
    pub matched_at: String,
    pub active: bool,
}

impl MatchView {
    fn for_user(matched: &Match, user_id: &str) -> Self {
        Self {
            match_key: matched.key.clone(),
            other_user_id: matched
                .other_participant(user_id)
                .unwrap_or_default()
                .to_string(),
            matched_at: format_utc_rfc3339(matched.matched_at),
            active: matched.active,
        }
    }
}

#[derive(Deserialize)]
struct MatchesQuery {
    /// Also return matches that were unmatched
    #[serde(default)]
    include_inactive: bool,
}

#[derive(Serialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchView>,
}

/// List the caller's matches, newest first. Inactive matches are only
/// listed for the participant who unmatched.
async fn list_matches(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<MatchesQuery>,
) -> Result<Json<MatchesResponse>> {
    tracing::debug!(
        user_id = %user.user_id,
        include_inactive = params.include_inactive,
        "Listing matches"
    );

    let matches: Vec<MatchView> = state
        .store
        .list_matches_for(&user.user_id, params.include_inactive)
        .await?
        .iter()
        .filter(|m| m.visible_to(&user.user_id))
        .map(|m| MatchView::for_user(m, &user.user_id))
        .collect();

    Ok(Json(MatchesResponse { matches }))
}

/// Get the caller's match with another user.
async fn get_match(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(other_user_id): Path<String>,
) -> Result<Json<MatchView>> {
    validate_swipe(&user.user_id, &other_user_id)?;

    let matched = state
        .store
        .get_match(&match_key(&user.user_id, &other_user_id))
        .await?
        .filter(|m| m.visible_to(&user.user_id))
        .ok_or_else(|| AppError::NotFound(format!("No match with {}", other_user_id)))?;

    Ok(Json(MatchView::for_user(&matched, &user.user_id)))
}

#[derive(Deserialize)]
pub struct UpdateMatchRequest {
    pub active: bool,
}

/// Unmatch or restore a match. The key is derived from the caller, so only a
/// participant can change it, and only the one who unmatched can restore it.
async fn update_match(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(other_user_id): Path<String>,
    Json(req): Json<UpdateMatchRequest>,
) -> Result<Json<MatchView>> {
    set_active(&state, &user, &other_user_id, req.active).await
}

/// Unmatch: keep the record, mark it inactive.
async fn unmatch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(other_user_id): Path<String>,
) -> Result<Json<MatchView>> {
    set_active(&state, &user, &other_user_id, false).await
}

async fn set_active(
    state: &AppState,
    user: &AuthUser,
    other_user_id: &str,
    active: bool,
) -> Result<Json<MatchView>> {
    validate_swipe(&user.user_id, other_user_id)?;

    tracing::info!(
        user_id = %user.user_id,
        other_user_id,
        active,
        "Changing match visibility"
    );

    let matched = state
        .store
        .set_match_active(
            &match_key(&user.user_id, other_user_id),
            active,
            &user.user_id,
        )
        .await?;

    Ok(Json(MatchView::for_user(&matched, &user.user_id)))
}

#[derive(Serialize)]
pub struct PairStateResponse {
    pub state: PairState,
}

/// Matching state between the caller and another user.
async fn get_pair_state(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(other_user_id): Path<String>,
) -> Result<Json<PairStateResponse>> {
    let pair_state = state
        .swipe_service
        .detector()
        .pair_state(&user.user_id, &other_user_id)
        .await?;

    Ok(Json(PairStateResponse { state: pair_state }))
}

// ─── Push Tokens ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct PushTokenRequest {
    #[validate(length(min = 1, max = 256))]
    pub token: String,
}

#[derive(Serialize)]
pub struct PushTokenResponse {
    pub success: bool,
}

/// Register the caller's device for match notifications.
async fn register_push_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<PushTokenRequest>,
) -> Result<Json<PushTokenResponse>> {
    req.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let token = PushToken {
        user_id: user.user_id.clone(),
        token: req.token.trim().to_string(),
        updated_at: chrono::Utc::now(),
    };
    state.store.set_push_token(&token).await?;

    tracing::info!(user_id = %user.user_id, "Push token registered");

    Ok(Json(PushTokenResponse { success: true }))
}
