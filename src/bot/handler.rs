//! Command and callback handling, independent of the Telegram transport.

use std::sync::Arc;

use log::{error, info, warn};
use teloxide::utils::command::BotCommands;

use crate::bot::command::{
    ABOUT_TEXT, Command, HELP_TEXT, LOADING_TEXT, OPTIONS_PROMPT, PAIRS_PROMPT,
};
use crate::bot::traits::{BotError, MessageRef, Messenger};
use crate::callback::CallbackAction;
use crate::catalogue::Catalogue;
use crate::menu::Navigator;
use crate::rate::{Rate, RateGenerator};
use crate::registry::{UserRecord, UserRegistry};

/// Where a catalogue page goes: a fresh message, or an edit of one already shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    New(i64),
    Edit(MessageRef),
}

pub fn selection_text(pair: &str, rate: &Rate) -> String {
    format!(
        "Pair: {}\nRate: {}\nDirection: {}",
        pair, rate.value, rate.direction
    )
}

#[derive(Debug)]
pub struct App {
    catalogue: Arc<Catalogue>,
    navigator: Navigator,
    rates: RateGenerator,
    registry: Arc<UserRegistry>,
}

impl App {
    pub fn new(catalogue: Arc<Catalogue>, rates: RateGenerator, registry: Arc<UserRegistry>) -> Self {
        App {
            navigator: Navigator::new(catalogue.clone()),
            catalogue,
            rates,
            registry,
        }
    }

    pub async fn on_command(
        &self,
        out: &dyn Messenger,
        chat_id: i64,
        sender: Option<UserRecord>,
        cmd: Command,
    ) -> Result<(), BotError> {
        match cmd {
            Command::Start => {
                match sender {
                    Some(record) => self.register(record).await,
                    None => warn!("[bot] /start in chat {} without a sender, not registered", chat_id),
                }
                out.send_text(chat_id, LOADING_TEXT).await?;
                self.show_pairs(out, MenuTarget::New(chat_id), 0).await?;
            }
            Command::About | Command::Help => {
                out.send_text(chat_id, ABOUT_TEXT).await?;
            }
            Command::Options => {
                out.send_keyboard(chat_id, OPTIONS_PROMPT, &self.navigator.options_keyboard())
                    .await?;
            }
            Command::Commands => {
                out.send_text(chat_id, &Command::descriptions().to_string())
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn on_callback(
        &self,
        out: &dyn Messenger,
        origin: MessageRef,
        action: CallbackAction,
    ) -> Result<(), BotError> {
        match action {
            CallbackAction::Help => out.send_text(origin.chat_id, HELP_TEXT).await?,
            CallbackAction::About => out.send_text(origin.chat_id, ABOUT_TEXT).await?,
            CallbackAction::ShowRates => self.show_pairs(out, MenuTarget::Edit(origin), 0).await?,
            CallbackAction::Navigate { page } => {
                self.show_pairs(out, MenuTarget::Edit(origin), page).await?
            }
            CallbackAction::SelectPair { pair, page } => {
                self.select_pair(out, origin, &pair, page).await?
            }
            CallbackAction::Ignore => {}
            CallbackAction::Unrecognized(raw) => {
                warn!(
                    "[bot] unrecognized callback data {:?} from chat {}",
                    raw, origin.chat_id
                );
            }
        }
        Ok(())
    }

    /// Shows one catalogue page. Pages past the end are logged and dropped.
    pub async fn show_pairs(
        &self,
        out: &dyn Messenger,
        target: MenuTarget,
        page: usize,
    ) -> Result<(), BotError> {
        let page = match self.navigator.render_page(page) {
            Ok(page) => page,
            Err(e) => {
                warn!("[bot] {}", e);
                return Ok(());
            }
        };
        let keyboard = page.keyboard();
        match target {
            MenuTarget::New(chat_id) => out.send_keyboard(chat_id, PAIRS_PROMPT, &keyboard).await,
            MenuTarget::Edit(message) => out.edit_keyboard(message, PAIRS_PROMPT, &keyboard).await,
        }
    }

    async fn select_pair(
        &self,
        out: &dyn Messenger,
        origin: MessageRef,
        pair: &str,
        page: usize,
    ) -> Result<(), BotError> {
        if !self.catalogue.contains(pair) {
            warn!("[bot] chat {} selected unknown pair {:?}", origin.chat_id, pair);
            return Ok(());
        }

        let rate = self.rates.generate();
        let text = selection_text(pair, &rate);
        info!("[bot] chat {} quoted {} at {}", origin.chat_id, pair, rate.value);

        match self.catalogue.image_for(pair) {
            Some(url) => out.send_photo(origin.chat_id, url, &text).await?,
            None => out.edit_text(origin, &text).await?,
        }
        out.send_keyboard(origin.chat_id, PAIRS_PROMPT, &self.navigator.back_to_page(page))
            .await
    }

    async fn register(&self, record: UserRecord) {
        let id = record.chat_id.to_string();
        if let Err(e) = self.registry.upsert(&id, record).await {
            error!("[bot] failed to register chat {}: {}", id, e);
        }
    }
}
