use std::path::Path;

use anyhow::Result;

use crate::models::{Collection, UserId};

/// Inbound text event from the chat network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user_id: UserId,
    pub text: String,
}

impl Inbound {
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            text: text.into(),
        }
    }
}

/// Reply keyboard offering one button per collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub buttons: Vec<String>,
}

impl Keyboard {
    pub fn collections() -> Self {
        Self {
            buttons: Collection::ALL
                .iter()
                .map(|collection| collection.label().to_string())
                .collect(),
        }
    }
}

/// Outbound side of a chat network. The bot never talks to the network
/// directly, so any chat service (or the terminal console) can drive it.
pub trait Transport {
    fn send_text(&mut self, user_id: UserId, text: &str, keyboard: &Keyboard) -> Result<()>;

    fn send_image(&mut self, user_id: UserId, path: &Path, keyboard: &Keyboard) -> Result<()>;
}
