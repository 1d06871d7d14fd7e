//! Telegram Bot API client.
//!
//! Covers the handful of methods the monitor needs: sending HTML messages
//! with inline keyboards, answering callback queries, deleting messages and
//! (de)registering the webhook. Calls are single attempts with no retry.

pub mod client;
pub mod error;
pub mod keyboard;
pub mod types;

pub use client::{TelegramClient, TELEGRAM_API_URL};
pub use error::{Result, TelegramError};
pub use keyboard::{report_menu, MENU_TEXT};
pub use types::{CallbackQuery, Chat, InlineButton, InlineKeyboard, Message, Update, User};
