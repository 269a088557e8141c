//! Callback data carried by inline keyboard buttons.
//!
//! Tokens are `_`-delimited strings (`pair_EUR/USD_1`, `nav_2`, ...). They are parsed
//! once when a callback query arrives; anything that does not match a known shape
//! becomes [`CallbackAction::Unrecognized`].

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Help,
    About,
    /// Open the pair catalogue at its first page.
    ShowRates,
    /// A pair was picked from `page`.
    SelectPair { pair: String, page: usize },
    Navigate { page: usize },
    /// Inert button, e.g. "back" on the first page.
    Ignore,
    Unrecognized(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data {
            "help" => return CallbackAction::Help,
            "about" => return CallbackAction::About,
            "exchange_rate" => return CallbackAction::ShowRates,
            "ignore" => return CallbackAction::Ignore,
            _ => {}
        }

        if let Some(rest) = data.strip_prefix("pair_") {
            // pair names may contain '_', the page never does
            if let Some((pair, page)) = rest.rsplit_once('_') {
                match page.parse::<usize>() {
                    Ok(page) if !pair.is_empty() => {
                        return CallbackAction::SelectPair {
                            pair: pair.to_string(),
                            page,
                        };
                    }
                    _ => {}
                }
            }
        } else if let Some(page) = data.strip_prefix("nav_") {
            if let Ok(page) = page.parse::<usize>() {
                return CallbackAction::Navigate { page };
            }
        }

        CallbackAction::Unrecognized(data.to_string())
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::Help => f.write_str("help"),
            CallbackAction::About => f.write_str("about"),
            CallbackAction::ShowRates => f.write_str("exchange_rate"),
            CallbackAction::SelectPair { pair, page } => write!(f, "pair_{}_{}", pair, page),
            CallbackAction::Navigate { page } => write!(f, "nav_{}", page),
            CallbackAction::Ignore => f.write_str("ignore"),
            CallbackAction::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl From<&str> for CallbackAction {
    fn from(data: &str) -> Self {
        CallbackAction::parse(data)
    }
}
