//! Telegram webhook: menu button presses become private report messages.
//!
//! Telegram retries any non-2xx answer, so every outcome here is logged and
//! acknowledged with `{"ok": true}`.

use std::time::Duration;

use axum::{extract::State, Json};
use fas_monitor_core::ReportKind;
use fas_monitor_telegram::{report_menu, CallbackQuery, TelegramClient, Update, User};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::state::AppState;

pub const UNKNOWN_COMMAND: &str = "Comando non riconosciuto";
pub const RENDER_FAILED: &str = "⚠️ Impossibile generare il report, riprova più tardi.";

pub async fn telegram_webhook(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    match serde_json::from_value::<Update>(body) {
        Ok(Update {
            callback_query: Some(callback),
            ..
        }) => handle_callback(&state, callback).await,
        Ok(_) => tracing::debug!("Ignoring non-callback update"),
        Err(e) => tracing::debug!(error = %e, "Ignoring malformed update"),
    }
    Json(json!({ "ok": true }))
}

async fn handle_callback(state: &AppState, callback: CallbackQuery) {
    let Some(user) = callback.from else {
        tracing::debug!(callback = %callback.id, "Callback without sender");
        return;
    };
    let (token, channel) = state
        .coordinator
        .read(|s| (s.bot_token.clone(), s.chat_id.clone()))
        .await;
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        tracing::warn!("Callback received before any bot token was synced");
        return;
    };

    if let Err(e) = state.telegram.answer_callback(&token, &callback.id).await {
        tracing::warn!(error = %e, "Failed to answer callback query");
    }

    let data = callback.data.unwrap_or_default();
    let text = match ReportKind::from_callback(&data) {
        Some((kind, view)) => match state.render_report(kind, view, false, true).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, %kind, "Report rendering failed");
                RENDER_FAILED.to_string()
            }
        },
        None => {
            tracing::debug!(%data, "Unknown callback data");
            UNKNOWN_COMMAND.to_string()
        }
    };

    let user_chat = user.id.to_string();
    match state
        .telegram
        .send_message(&token, &user_chat, &text, Some(&report_menu()))
        .await
    {
        Ok(_) => tracing::debug!(user = user.id, %data, "Report delivered"),
        Err(e) if e.is_cannot_initiate() => {
            tracing::info!(user = user.id, "User has no private chat with the bot, prompting in channel");
            prompt_in_channel(state, &token, channel.as_deref(), &user).await;
        }
        Err(e) => tracing::warn!(error = %e, user = user.id, "Failed to deliver report"),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn display_name(user: &User) -> String {
    user.username
        .as_deref()
        .map(|u| format!("@{u}"))
        .or_else(|| user.first_name.clone())
        .map_or_else(|| "Ciao".to_string(), |name| escape_html(&name))
}

/// Text of the channel prompt asking `user` to start the bot.
#[must_use]
pub fn start_prompt(user: &User) -> String {
    format!(
        "👋 {}, per ricevere i report apri una chat privata con il bot e premi <b>Avvia</b>, poi riprova.",
        display_name(user)
    )
}

async fn prompt_in_channel(state: &AppState, token: &str, channel: Option<&str>, user: &User) {
    let Some(channel) = channel.filter(|c| !c.is_empty()) else {
        tracing::warn!("No channel configured for the start prompt");
        return;
    };

    match state
        .telegram
        .send_message(token, channel, &start_prompt(user), None)
        .await
    {
        Ok(message) => {
            let ttl = Duration::from_secs(state.config.telegram.prompt_ttl_secs);
            schedule_delete(
                state.telegram.clone(),
                token.to_string(),
                channel.to_string(),
                message.message_id,
                ttl,
            );
        }
        Err(e) => tracing::warn!(error = %e, "Failed to post start prompt"),
    }
}

/// Deletes a message after `after` in a detached task.
pub fn schedule_delete(
    telegram: TelegramClient,
    token: String,
    chat_id: String,
    message_id: i64,
    after: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        if let Err(e) = telegram.delete_message(&token, &chat_id, message_id).await {
            tracing::debug!(error = %e, message_id, "Prompt deletion failed");
        }
    })
}
