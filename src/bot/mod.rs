pub mod command;
pub mod handler;
pub mod telegram;
pub mod traits;

pub use command::Command;
pub use handler::{App, MenuTarget};
pub use telegram::TelegramBot;
pub use traits::{BotError, MessageRef, Messenger};
