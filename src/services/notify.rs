// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Match notifications.
//!
//! Delivery is fire-and-forget relative to match creation: the emitter runs
//! on its own task, and failures are logged, never propagated.

use crate::db::{PushTokenStore, Store};
use crate::error::{AppError, Result};
use crate::models::Match;
use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delivers a "you matched" event to one participant.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_match(&self, user_id: &str, matched: &Match) -> Result<()>;
}

/// Notifier that only logs. Used when push delivery is disabled.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_match(&self, user_id: &str, matched: &Match) -> Result<()> {
        tracing::info!(
            user_id,
            match_key = %matched.key,
            "Match notification (push disabled)"
        );
        Ok(())
    }
}

// ─── Expo Push ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ExpoMessage {
    to: String,
    title: String,
    body: String,
    data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpoResponse {
    data: ExpoTicket,
}

#[derive(Debug, Deserialize)]
struct ExpoTicket {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Sends match notifications through the Expo push service.
pub struct ExpoPushNotifier {
    client: reqwest::Client,
    push_url: String,
    access_token: Option<String>,
    store: Arc<dyn Store>,
}

impl ExpoPushNotifier {
    pub fn new(push_url: String, access_token: Option<String>, store: Arc<dyn Store>) -> Self {
        Self {
            client: reqwest::Client::new(),
            push_url,
            access_token,
            store,
        }
    }
}

/// Build the push message for one participant.
fn build_message(push_token: &str, user_id: &str, matched: &Match) -> ExpoMessage {
    let other = matched.other_participant(user_id).unwrap_or_default();
    ExpoMessage {
        to: push_token.to_string(),
        title: "It's a match!".to_string(),
        body: "You both liked each other. Say hello!".to_string(),
        data: serde_json::json!({
            "type": "match",
            "match_key": matched.key,
            "other_user_id": other,
        }),
        sound: Some("default".to_string()),
    }
}

#[async_trait]
impl Notifier for ExpoPushNotifier {
    async fn notify_match(&self, user_id: &str, matched: &Match) -> Result<()> {
        let Some(token) = self.store.get_push_token(user_id).await? else {
            tracing::debug!(user_id, "No push token registered, skipping");
            return Ok(());
        };

        let message = build_message(&token.token, user_id, matched);
        let mut request = self.client.post(&self.push_url).json(&message);

        // Access token raises Expo rate limits when enhanced security is on
        if let Some(access_token) = &self.access_token {
            request = request.bearer_auth(access_token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::NotificationDeliveryFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::NotificationDeliveryFailed(format!(
                "Expo push API error {}: {}",
                status, body
            )));
        }

        let ticket: ExpoResponse = response
            .json()
            .await
            .map_err(|e| AppError::NotificationDeliveryFailed(e.to_string()))?;

        if ticket.data.status == "error" {
            return Err(AppError::NotificationDeliveryFailed(
                ticket
                    .data
                    .message
                    .unwrap_or_else(|| "Expo ticket error".to_string()),
            ));
        }

        tracing::info!(user_id, match_key = %matched.key, "Match push sent");
        Ok(())
    }
}

// ─── Emitter ─────────────────────────────────────────────────

/// Fans a new match out to both participants on a background task.
#[derive(Clone)]
pub struct NotificationEmitter {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl NotificationEmitter {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Notify both participants. Returns the task handle; callers normally drop it.
    pub fn emit_match(&self, matched: &Match) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        let timeout = self.timeout;
        let matched = matched.clone();

        tokio::spawn(async move {
            let deliveries = matched.participants.iter().map(|user_id| {
                let notifier = notifier.clone();
                let matched = &matched;
                async move {
                    let outcome =
                        tokio::time::timeout(timeout, notifier.notify_match(user_id, matched))
                            .await
                            .unwrap_or_else(|_| {
                                Err(AppError::NotificationDeliveryFailed(format!(
                                    "timed out after {:?}",
                                    timeout
                                )))
                            });

                    if let Err(e) = outcome {
                        tracing::warn!(
                            user_id = %user_id,
                            match_key = %matched.key,
                            error = %e,
                            "Match notification not delivered"
                        );
                    }
                }
            });

            join_all(deliveries).await;
        })
    }
}
