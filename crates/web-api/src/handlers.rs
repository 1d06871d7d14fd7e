//! Request handlers for everything except the webhook.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use fas_monitor_core::{lenient, DateCount, ReportKind, ReportView, StoredRound};
use fas_monitor_telegram::{report_menu, MENU_TEXT};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::coordinator::{PushSummary, SyncRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// Page size of `GET /api/historical` when none is given.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;
/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: i64 = 500;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "FAS League Monitor API" }))
}

/// Liveness probe with the collection size.
///
/// # Errors
/// Returns [`ApiError::Storage`] if the collection cannot be counted.
pub async fn ping(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let total = state.rounds().count(None).await?;
    Ok(Json(json!({
        "status": "alive",
        "timestamp": Utc::now(),
        "total_records": total,
    })))
}

/// Reports store reachability. Always answers 200; the `database` field
/// carries the probe result.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match state.rounds().ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Store health probe failed");
            format!("error: {e}")
        }
    };
    Json(json!({
        "status": "healthy",
        "database": database,
        "timestamp": Utc::now(),
    }))
}

/// Ingests a batch pushed by the front end.
///
/// # Errors
/// Returns [`ApiError::MalformedBody`] if the body is not a JSON object and
/// [`ApiError::Storage`] if the permanent collection write fails.
pub async fn sync(
    State(state): State<AppState>,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<PushSummary>, ApiError> {
    let Json(request) = body?;
    let summary = state.coordinator.push(request).await?;
    Ok(Json(summary))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub configured: bool,
    pub total_historical: i64,
    pub history_size: usize,
    pub threshold: u32,
    pub last_sync: Option<DateTime<Utc>>,
}

/// # Errors
/// Returns [`ApiError::Storage`] if the collection cannot be counted.
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let total_historical = state.rounds().count(None).await?;
    let response = state
        .coordinator
        .read(|s| StatusResponse {
            configured: s.is_configured(),
            total_historical,
            history_size: s.history.len(),
            threshold: s.threshold,
            last_sync: s.last_sync,
        })
        .await;
    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoricalQuery {
    pub date: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoricalPage {
    pub records: Vec<StoredRound>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// Newest-first page of the permanent collection.
///
/// # Errors
/// Returns [`ApiError::Storage`] if the collection cannot be read.
pub async fn list_historical(
    State(state): State<AppState>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Json<HistoricalPage>, ApiError> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);
    let date = query.date.as_deref().filter(|d| !d.is_empty());

    let records = state.rounds().page(date, skip, limit).await?;
    let total = state.rounds().count(date).await?;
    Ok(Json(HistoricalPage {
        records,
        total,
        skip,
        limit,
    }))
}

/// # Errors
/// Returns [`ApiError::Storage`] if the collection cannot be read.
pub async fn historical_dates(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let dates: Vec<DateCount> = state.rounds().dates_with_counts().await?;
    Ok(Json(json!({ "dates": dates })))
}

/// Clears the collection, or one date of it.
///
/// # Errors
/// Returns [`ApiError::Storage`] if the delete fails.
pub async fn delete_historical(
    State(state): State<AppState>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = query.date.as_deref().filter(|d| !d.is_empty());
    let deleted = state.rounds().delete(date).await?;
    tracing::info!(deleted, date = ?date, "Historical records deleted");
    Ok(Json(json!({ "deleted": deleted })))
}

#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    pub view: Option<String>,
    #[serde(default)]
    pub raw: bool,
    #[serde(default)]
    pub template: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenderResponse {
    pub kind: ReportKind,
    pub view: ReportView,
    pub text: String,
}

/// Renders a report fresh from the permanent collection.
///
/// # Errors
/// Returns [`ApiError::UnknownReport`] for an unknown kind,
/// [`ApiError::InvalidParameter`] for an unknown view and
/// [`ApiError::Storage`] if the collection cannot be read.
pub async fn render_report(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<Json<RenderResponse>, ApiError> {
    let kind: ReportKind = kind.parse().map_err(|_| ApiError::UnknownReport(kind))?;
    let view: ReportView = match query.view.as_deref() {
        None | Some("") => ReportView::default(),
        Some(view) => view.parse().map_err(ApiError::InvalidParameter)?,
    };

    let text = state
        .render_report(kind, view, query.raw, query.template)
        .await?;
    Ok(Json(RenderResponse { kind, view, text }))
}

/// Optional overrides for the bot management calls.
#[derive(Debug, Default, Deserialize)]
pub struct BotRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub bot_token: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub chat_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn resolve_token(state: &AppState, body: &BotRequest) -> Result<String, ApiError> {
    let stored = state.coordinator.read(|s| s.bot_token.clone()).await;
    non_empty(body.bot_token.clone())
        .or_else(|| non_empty(stored))
        .ok_or(ApiError::MissingConfiguration("Bot token mancante"))
}

/// Points the bot's webhook at this server.
///
/// # Errors
/// Returns [`ApiError::MissingConfiguration`] without a token or backend URL
/// and [`ApiError::Messaging`] if Telegram refuses the call.
pub async fn setup_webhook(
    State(state): State<AppState>,
    body: Option<Json<BotRequest>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let token = resolve_token(&state, &body).await?;
    let backend = state.config.telegram.backend_url.trim_end_matches('/');
    if backend.is_empty() {
        return Err(ApiError::MissingConfiguration("Backend URL mancante"));
    }

    let url = format!("{backend}/api/telegram/webhook");
    let ok = state.telegram.set_webhook(&token, &url).await?;
    tracing::info!(%url, ok, "Webhook registered");
    Ok(Json(json!({ "ok": ok, "url": url })))
}

/// # Errors
/// Returns [`ApiError::MissingConfiguration`] without a token and
/// [`ApiError::Messaging`] if Telegram refuses the call.
pub async fn delete_webhook(
    State(state): State<AppState>,
    body: Option<Json<BotRequest>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let token = resolve_token(&state, &body).await?;
    let ok = state.telegram.delete_webhook(&token).await?;
    tracing::info!(ok, "Webhook removed");
    Ok(Json(json!({ "ok": ok })))
}

/// Posts the report menu to the configured chat.
///
/// # Errors
/// Returns [`ApiError::MissingConfiguration`] without a token or chat id and
/// [`ApiError::Messaging`] if Telegram refuses the message.
pub async fn send_menu(
    State(state): State<AppState>,
    body: Option<Json<BotRequest>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let (stored_token, stored_chat) = state
        .coordinator
        .read(|s| (s.bot_token.clone(), s.chat_id.clone()))
        .await;
    let token = non_empty(body.bot_token).or_else(|| non_empty(stored_token));
    let chat_id = non_empty(body.chat_id).or_else(|| non_empty(stored_chat));
    let (Some(token), Some(chat_id)) = (token, chat_id) else {
        return Err(ApiError::MissingConfiguration("Configurazione mancante"));
    };

    let message = state
        .telegram
        .send_message(&token, &chat_id, MENU_TEXT, Some(&report_menu()))
        .await?;
    Ok(Json(json!({ "ok": true, "message_id": message.message_id })))
}
