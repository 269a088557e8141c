#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ratebot::bot::{BotError, MessageRef, Messenger};
use ratebot::catalogue::Catalogue;
use ratebot::menu::Keyboard;
use ratebot::rate::RandomSource;

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Keyboard { chat_id: i64, text: String, keyboard: Keyboard },
    EditKeyboard { target: MessageRef, text: String, keyboard: Keyboard },
    EditText { target: MessageRef, text: String },
    Photo { chat_id: i64, url: String, caption: String },
}

/// Records everything sent; chats listed in `failing` reject every send.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<Sent>>,
    failing: HashSet<i64>,
}

impl RecordingMessenger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(chats: &[i64]) -> Arc<Self> {
        Arc::new(RecordingMessenger {
            sent: Mutex::new(Vec::new()),
            failing: chats.iter().copied().collect(),
        })
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, chat_id: i64, sent: Sent) -> Result<(), BotError> {
        if self.failing.contains(&chat_id) {
            return Err(BotError::Delivery {
                chat_id,
                reason: "bot was blocked by the user".into(),
            });
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.record(chat_id, Sent::Text {
            chat_id,
            text: text.into(),
        })
    }

    async fn send_keyboard(&self, chat_id: i64, text: &str, keyboard: &Keyboard) -> Result<(), BotError> {
        self.record(chat_id, Sent::Keyboard {
            chat_id,
            text: text.into(),
            keyboard: keyboard.clone(),
        })
    }

    async fn edit_keyboard(&self, target: MessageRef, text: &str, keyboard: &Keyboard) -> Result<(), BotError> {
        self.record(target.chat_id, Sent::EditKeyboard {
            target,
            text: text.into(),
            keyboard: keyboard.clone(),
        })
    }

    async fn edit_text(&self, target: MessageRef, text: &str) -> Result<(), BotError> {
        self.record(target.chat_id, Sent::EditText {
            target,
            text: text.into(),
        })
    }

    async fn send_photo(&self, chat_id: i64, url: &str, caption: &str) -> Result<(), BotError> {
        self.record(chat_id, Sent::Photo {
            chat_id,
            url: url.into(),
            caption: caption.into(),
        })
    }
}

/// Replays a fixed sequence; returns 0 once exhausted.
#[derive(Debug, Default)]
pub struct FixedRandom {
    floats: Mutex<VecDeque<f64>>,
    indices: Mutex<VecDeque<usize>>,
}

impl FixedRandom {
    pub fn new(floats: &[f64], indices: &[usize]) -> Arc<Self> {
        Arc::new(FixedRandom {
            floats: Mutex::new(floats.iter().copied().collect()),
            indices: Mutex::new(indices.iter().copied().collect()),
        })
    }
}

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.floats.lock().unwrap().pop_front().unwrap_or(0.0)
    }

    fn index(&self, len: usize) -> usize {
        self.indices.lock().unwrap().pop_front().unwrap_or(0) % len
    }
}

pub fn catalogue(n: usize) -> Catalogue {
    Catalogue::new((0..n).map(|i| format!("P{}", i)).collect()).unwrap()
}
