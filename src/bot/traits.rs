use async_trait::async_trait;
use thiserror::Error;

use crate::menu::Keyboard;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("delivery to chat {chat_id} failed: {reason}")]
    Delivery { chat_id: i64, reason: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A message already on screen that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Outbound side of the bot.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), BotError>;

    async fn send_keyboard(&self, chat_id: i64, text: &str, keyboard: &Keyboard) -> Result<(), BotError>;

    async fn edit_keyboard(&self, target: MessageRef, text: &str, keyboard: &Keyboard) -> Result<(), BotError>;

    async fn edit_text(&self, target: MessageRef, text: &str) -> Result<(), BotError>;

    async fn send_photo(&self, chat_id: i64, url: &str, caption: &str) -> Result<(), BotError>;
}
