use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::message::Message;

pub const GREETING: &str = "Hi, I'm a chatbot who can search the web. How can I help you?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One visible line of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
}

impl ChatEntry {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The conversation log of one chat session. Entries are only ever appended,
/// so their order is the display order.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    created: DateTime<Utc>,
    entries: Vec<ChatEntry>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// A fresh session holding only the greeting
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created: Utc::now(),
            entries: vec![ChatEntry::assistant(GREETING)],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn append(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// The log as model context. The greeting is display text only and is
    /// not sent to the model.
    pub fn to_messages(&self) -> Vec<Message> {
        self.entries
            .iter()
            .skip(1)
            .map(|entry| match entry.role {
                ChatRole::User => Message::user().with_text(&entry.content),
                ChatRole::Assistant => Message::assistant().with_text(&entry.content),
            })
            .collect()
    }
}
