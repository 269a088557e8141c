//! Paginated inline menus over the pair catalogue.

use std::sync::Arc;

use thiserror::Error;

use crate::callback::CallbackAction;
use crate::catalogue::Catalogue;

pub const PAGE_SIZE: usize = 10;

pub const BACK_LABEL: &str = "⬅️ Back";
pub const FORWARD_LABEL: &str = "Forward ➡️";
pub const RETURN_LABEL: &str = "🔙 Back";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("page {page} is out of range, catalogue has {pages} pages")]
    PageOutOfRange { page: usize, pages: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: CallbackAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Button {
            label: label.into(),
            action,
        }
    }
}

/// Transport-neutral inline keyboard: rows of buttons, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Keyboard { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// One rendered page of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub entries: Vec<Button>,
    pub back: Button,
    pub forward: Button,
}

impl Page {
    /// One pair per row, then the back/forward row.
    pub fn keyboard(&self) -> Keyboard {
        let mut rows: Vec<Vec<Button>> = self.entries.iter().cloned().map(|b| vec![b]).collect();
        rows.push(vec![self.back.clone(), self.forward.clone()]);
        Keyboard::new(rows)
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    catalogue: Arc<Catalogue>,
}

impl Navigator {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Navigator { catalogue }
    }

    pub fn page_count(&self) -> usize {
        self.catalogue.len().div_ceil(PAGE_SIZE)
    }

    pub fn render_page(&self, page: usize) -> Result<Page, MenuError> {
        let pages = self.page_count();
        if page >= pages {
            return Err(MenuError::PageOutOfRange { page, pages });
        }

        let start = page * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.catalogue.len());
        let entries = self.catalogue.pairs()[start..end]
            .iter()
            .map(|pair| {
                Button::new(
                    pair.clone(),
                    CallbackAction::SelectPair {
                        pair: pair.clone(),
                        page,
                    },
                )
            })
            .collect();

        let back = if page > 0 {
            CallbackAction::Navigate { page: page - 1 }
        } else {
            CallbackAction::Ignore
        };
        let forward = if start + PAGE_SIZE < self.catalogue.len() {
            CallbackAction::Navigate { page: page + 1 }
        } else {
            CallbackAction::Ignore
        };

        Ok(Page {
            index: page,
            entries,
            back: Button::new(BACK_LABEL, back),
            forward: Button::new(FORWARD_LABEL, forward),
        })
    }

    pub fn options_keyboard(&self) -> Keyboard {
        Keyboard::new(vec![
            vec![Button::new("Exchange rates", CallbackAction::ShowRates)],
            vec![Button::new("Help", CallbackAction::Help)],
            vec![Button::new("About", CallbackAction::About)],
        ])
    }

    pub fn back_to_page(&self, page: usize) -> Keyboard {
        Keyboard::new(vec![vec![Button::new(
            RETURN_LABEL,
            CallbackAction::Navigate { page },
        )]])
    }
}
