use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::callback::CallbackAction;
use crate::menu::PAGE_SIZE;

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_BYTES: usize = 64;

pub const DEFAULT_PAIRS: [&str; 64] = [
    "GOLD", "LATAM", "IMX", "BIN IDX", "USD/CHF", "GBP/JPY", "PMX", "EUR/CAD",
    "EUR/JPY", "GBP/USD", "EUR/GBP", "NZD/JPY", "EUR/USD", "USD/JPY", "ASIA",
    "INTEL", "ALIBABA", "AMAZON", "APPLE", "MASTERCARD", "MICROSOFT", "TESLA",
    "VISA", "USD/CAD", "AUD/JPY", "NETFLIX", "USD/CNH", "FACEBOOK", "GOOGLE",
    "AUD/NZD", "CRYPTO IDX", "AUD/CHF", "DOWJONES30", "NASDAQ", "BITCOIN",
    "EUR/NZD", "AUD/CAD", "AUD/USD", "CAD/CHF", "CAD/JPY", "CHF/JPY",
    "ETHEREUM", "EUR/AUD", "EUR/CHF", "EUR/SEK", "GBP/AUD", "GBP/CAD",
    "GBP/CHF", "GBP/NZD", "GSMI", "LITECOIN", "MCDONALDS", "NVIDIA", "NZD/CAD",
    "NZD/CHF", "NZD/USD", "RIPPLE", "SILVER", "TOYOTA", "USD/MXN", "USD/NOK",
    "USD/SEK", "USD/SGD", "USD/ZAR",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("catalogue has no pairs")]
    Empty,
    #[error("catalogue contains an empty pair name")]
    EmptyName,
    #[error("pair {0:?} is listed more than once")]
    Duplicate(String),
    #[error("callback data for pair {0:?} exceeds 64 bytes")]
    TokenTooLong(String),
    #[error("image configured for unknown pair {0:?}")]
    UnknownImagePair(String),
}

/// Ordered, immutable list of pairs the bot quotes, with the image shown for each.
#[derive(Debug, Clone)]
pub struct Catalogue {
    pairs: Vec<String>,
    images: HashMap<String, String>,
}

impl Catalogue {
    pub fn new(pairs: Vec<String>) -> Result<Self, CatalogueError> {
        if pairs.is_empty() {
            return Err(CatalogueError::Empty);
        }
        let last_page = (pairs.len() - 1) / PAGE_SIZE;
        let mut seen = HashSet::new();
        for pair in &pairs {
            if pair.trim().is_empty() {
                return Err(CatalogueError::EmptyName);
            }
            if !seen.insert(pair.as_str()) {
                return Err(CatalogueError::Duplicate(pair.clone()));
            }
            let token = CallbackAction::SelectPair {
                pair: pair.clone(),
                page: last_page,
            }
            .to_string();
            if token.len() > MAX_CALLBACK_BYTES {
                return Err(CatalogueError::TokenTooLong(pair.clone()));
            }
        }

        Ok(Catalogue {
            pairs,
            images: HashMap::new(),
        })
    }

    /// Same image for every pair.
    pub fn with_default_image(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.images = self
            .pairs
            .iter()
            .map(|p| (p.clone(), url.clone()))
            .collect();
        self
    }

    pub fn with_image(mut self, pair: &str, url: impl Into<String>) -> Result<Self, CatalogueError> {
        if !self.contains(pair) {
            return Err(CatalogueError::UnknownImagePair(pair.to_string()));
        }
        self.images.insert(pair.to_string(), url.into());
        Ok(self)
    }

    pub fn pairs(&self) -> &[String] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.pairs.get(index).map(String::as_str)
    }

    pub fn contains(&self, pair: &str) -> bool {
        self.pairs.iter().any(|p| p == pair)
    }

    pub fn image_for(&self, pair: &str) -> Option<&str> {
        self.images.get(pair).map(String::as_str)
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Catalogue {
            pairs: DEFAULT_PAIRS.iter().map(|p| p.to_string()).collect(),
            images: HashMap::new(),
        }
    }
}
