//! HTTP client for the Bot API.
//!
//! Every call is one `POST {base}/bot{token}/{method}` with a JSON body.
//! There is no retry; callers decide what a failure means.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::error::{Result, TelegramError};
use crate::types::{ApiResponse, InlineKeyboard, Message};

/// Public Bot API base URL.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Bot API client.
///
/// The token is passed per call because it is pushed by the front end and
/// can change between syncs.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl TelegramClient {
    /// Creates a client limited to 30 requests per second, the Bot API
    /// broadcast ceiling.
    pub fn new() -> Self {
        Self::with_rate_limit(nonzero!(30u32))
    }

    pub fn with_rate_limit(requests_per_second: NonZeroU32) -> Self {
        let quota = Quota::per_second(requests_per_second);

        Self {
            http: Client::new(),
            base_url: TELEGRAM_API_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<B, T>(&self, token: &str, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/bot{}/{}", self.base_url, token, method);
        tracing::debug!(method, "POST Bot API");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: ApiResponse<T> =
            serde_json::from_str(&text).map_err(|_| TelegramError::Decode {
                status: status.as_u16(),
                body: text.clone(),
            })?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope.result.ok_or(TelegramError::Decode {
            status: status.as_u16(),
            body: text,
        })
    }

    /// Sends an HTML message, optionally with an inline keyboard.
    ///
    /// # Errors
    /// Returns [`TelegramError::Api`] when Telegram refuses the message (for
    /// instance a user who never started the bot).
    pub async fn send_message(
        &self,
        token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<Message> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = json!(keyboard);
        }
        self.call(token, "sendMessage", &body).await
    }

    /// Acknowledges a callback query so the client stops its spinner.
    ///
    /// # Errors
    /// Returns an error if the call fails.
    pub async fn answer_callback(&self, token: &str, callback_query_id: &str) -> Result<bool> {
        let body = json!({ "callback_query_id": callback_query_id });
        self.call(token, "answerCallbackQuery", &body).await
    }

    /// # Errors
    /// Returns an error if the call fails.
    pub async fn delete_message(&self, token: &str, chat_id: &str, message_id: i64) -> Result<bool> {
        let body = json!({ "chat_id": chat_id, "message_id": message_id });
        self.call(token, "deleteMessage", &body).await
    }

    /// Registers `url` as the webhook, subscribing to callback queries only.
    ///
    /// # Errors
    /// Returns an error if the call fails.
    pub async fn set_webhook(&self, token: &str, url: &str) -> Result<bool> {
        let body = json!({ "url": url, "allowed_updates": ["callback_query"] });
        self.call(token, "setWebhook", &body).await
    }

    /// # Errors
    /// Returns an error if the call fails.
    pub async fn delete_webhook(&self, token: &str) -> Result<bool> {
        self.call(token, "deleteWebhook", &json!({})).await
    }
}

impl Default for TelegramClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:abc";

    fn client(server: &MockServer) -> TelegramClient {
        TelegramClient::new().with_base_url(server.uri())
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(TelegramClient::new().base_url(), TELEGRAM_API_URL);
    }

    #[tokio::test]
    async fn test_send_message_with_keyboard() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": "42",
                "parse_mode": "HTML",
                "reply_markup": {"inline_keyboard": [[{"text": "Info", "callback_data": "info"}]]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 9, "chat": {"id": 42, "type": "private"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let keyboard = InlineKeyboard::new(vec![vec![crate::InlineButton::callback("Info", "info")]]);
        let message = client(&server)
            .send_message(TOKEN, "42", "<b>ciao</b>", Some(&keyboard))
            .await
            .unwrap();
        assert_eq!(message.message_id, 9);
        assert_eq!(message.chat.id, 42);
    }

    #[tokio::test]
    async fn test_forbidden_is_cannot_initiate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot can't initiate conversation with a user"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .send_message(TOKEN, "42", "x", None)
            .await
            .unwrap_err();
        assert!(err.is_cannot_initiate());
    }

    #[tokio::test]
    async fn test_non_envelope_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server).delete_webhook(TOKEN).await.unwrap_err();
        assert!(matches!(err, TelegramError::Decode { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_set_webhook_subscribes_to_callbacks_only() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/setWebhook"))
            .and(body_partial_json(json!({
                "url": "https://fas.example/api/telegram/webhook",
                "allowed_updates": ["callback_query"]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": true, "description": "Webhook was set"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ok = client(&server)
            .set_webhook(TOKEN, "https://fas.example/api/telegram/webhook")
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_answer_callback_and_delete_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/answerCallbackQuery"))
            .and(body_partial_json(json!({"callback_query_id": "cb-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/deleteMessage"))
            .and(body_partial_json(json!({"chat_id": "-100", "message_id": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(client.answer_callback(TOKEN, "cb-1").await.unwrap());
        assert!(client.delete_message(TOKEN, "-100", 7).await.unwrap());
    }
}
