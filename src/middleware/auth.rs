// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.
//!
//! Access tokens are issued by the identity provider and signed with a shared
//! HS256 secret. This service only verifies them and trusts `sub` as the
//! user ID.

use crate::error::AppError;
use crate::models::validate_user_id;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie carrying the access token for web clients.
pub const SESSION_COOKIE: &str = "session_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Verify an access token and return the user it belongs to.
pub fn verify_token(token: &str, secret: &[u8], audience: Option<&str>) -> Result<AuthUser, AppError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    let token_data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::InvalidToken)?;

    let user_id = token_data.claims.sub;
    validate_user_id("sub", &user_id).map_err(|_| AppError::InvalidToken)?;

    Ok(AuthUser { user_id })
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try header first (mobile app), then cookie (web)
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = match bearer.or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string())) {
        Some(token) => token,
        None => return Err(AppError::Unauthorized),
    };

    let auth_user = verify_token(
        &token,
        &state.config.jwt_secret,
        state.config.jwt_audience.as_deref(),
    )?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
