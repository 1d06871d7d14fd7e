//! Error types for the Bot API client.

use thiserror::Error;

/// Errors returned by [`crate::TelegramClient`].
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The API answered with `ok: false`.
    #[error("Telegram API error {code}: {description}")]
    Api {
        /// `error_code` from the response.
        code: i64,
        /// `description` from the response.
        description: String,
    },

    /// Transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body was not a Bot API envelope.
    #[error("unexpected response (HTTP {status}): {body}")]
    Decode {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl TelegramError {
    /// The recipient never opened a private chat with the bot, or blocked it.
    ///
    /// Retrying cannot help; the caller falls back to a channel prompt.
    #[must_use]
    pub fn is_cannot_initiate(&self) -> bool {
        match self {
            Self::Api { code, description } => {
                let description = description.to_lowercase();
                *code == 403
                    && (description.contains("can't initiate conversation")
                        || description.contains("bot was blocked"))
            }
            _ => false,
        }
    }
}

/// Result alias for Bot API calls.
pub type Result<T> = std::result::Result<T, TelegramError>;
