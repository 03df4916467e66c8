use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use scout::models::message::Message;
use scout::models::tool::Tool;
use scout::providers::base::{Provider, Usage};

/// A mock provider that returns pre-configured responses for testing.
/// The core crate's mock is compiled out of its public API.
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Message, String>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses; an `Err`
    /// entry makes that call fail
    pub fn new(responses: Vec<Result<Message, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            match responses.remove(0) {
                Ok(message) => Ok((message, Usage::default())),
                Err(e) => Err(anyhow!(e)),
            }
        }
    }
}
