use teloxide::utils::command::BotCommands;

pub const ABOUT_TEXT: &str = "This bot provides currency exchange rates and other information. \
     It was built to demonstrate the Telegram Bot API.";

pub const HELP_TEXT: &str = "Here you can get help using the bot. Use /start to begin, \
     /about for information about the bot, /options to see the options, \
     and /commands for a list of all commands.";

pub const LOADING_TEXT: &str = "Loading currency pairs...";
pub const PAIRS_PROMPT: &str = "Choose a currency pair:";
pub const OPTIONS_PROMPT: &str = "Choose an option:";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "start working with the bot.")]
    Start,
    #[command(description = "information about the bot.")]
    About,
    #[command(description = "bot options.")]
    Options,
    #[command(description = "get help.")]
    Help,
    #[command(description = "list all commands.")]
    Commands,
}
