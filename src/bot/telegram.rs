use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId};
use teloxide::utils::command::BotCommands;

use crate::bot::command::Command;
use crate::bot::handler::App;
use crate::bot::traits::{BotError, MessageRef, Messenger};
use crate::callback::CallbackAction;
use crate::menu::Keyboard;
use crate::registry::UserRecord;

#[derive(Debug, Clone)]
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    pub fn new(token: impl Into<String>) -> Self {
        TelegramBot {
            bot: Bot::new(token),
        }
    }

    /// Polls for updates until Ctrl-C.
    pub async fn run(&self, app: Arc<App>) {
        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("[bot] failed to register command list: {}", e);
        }

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(on_command),
            )
            .branch(Update::filter_callback_query().endpoint(on_callback));

        info!("[bot] polling for updates");
        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![app])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
        info!("[bot] dispatcher stopped");
    }
}

impl From<Bot> for TelegramBot {
    fn from(bot: Bot) -> Self {
        TelegramBot { bot }
    }
}

fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.to_string()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl Messenger for TelegramBot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn send_keyboard(&self, chat_id: i64, text: &str, keyboard: &Keyboard) -> Result<(), BotError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(markup(keyboard))
            .await?;
        Ok(())
    }

    async fn edit_keyboard(&self, target: MessageRef, text: &str, keyboard: &Keyboard) -> Result<(), BotError> {
        self.bot
            .edit_message_text(ChatId(target.chat_id), MessageId(target.message_id), text)
            .reply_markup(markup(keyboard))
            .await?;
        Ok(())
    }

    async fn edit_text(&self, target: MessageRef, text: &str) -> Result<(), BotError> {
        self.bot
            .edit_message_text(ChatId(target.chat_id), MessageId(target.message_id), text)
            .await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, url: &str, caption: &str) -> Result<(), BotError> {
        let url = reqwest::Url::parse(url).map_err(|e| BotError::Delivery {
            chat_id,
            reason: format!("invalid image url {}: {}", url, e),
        })?;
        self.bot
            .send_photo(ChatId(chat_id), InputFile::url(url))
            .caption(caption)
            .await?;
        Ok(())
    }
}

async fn on_command(bot: Bot, msg: Message, cmd: Command, app: Arc<App>) -> Result<(), BotError> {
    info!("[bot] chat {} sent {:?}", msg.chat.id, cmd);
    let sender = msg.from.as_ref().map(|user| UserRecord {
        chat_id: msg.chat.id.0,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    });
    app.on_command(&TelegramBot::from(bot), msg.chat.id.0, sender, cmd)
        .await
}

async fn on_callback(bot: Bot, q: CallbackQuery, app: Arc<App>) -> Result<(), BotError> {
    bot.answer_callback_query(q.id.clone()).await?;

    let action = CallbackAction::parse(q.data.as_deref().unwrap_or_default());
    let Some(message) = q.message.as_ref() else {
        warn!("[bot] callback {:?} without an accessible message", action);
        return Ok(());
    };
    let origin = MessageRef {
        chat_id: message.chat().id.0,
        message_id: message.id().0,
    };
    app.on_callback(&TelegramBot::from(bot), origin, action).await
}
