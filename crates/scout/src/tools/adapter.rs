use async_trait::async_trait;

use super::kind::ToolKind;
use crate::errors::AgentResult;
use crate::models::tool::Tool;

/// A lookup service that turns a query into plain text
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Look up `query`, returning at most `top_k` results formatted as text.
    /// Transport and decoding failures are `AgentError::ExecutionError`.
    async fn lookup(&self, query: &str, top_k: usize) -> AgentResult<String>;
}

/// A retriever bound to one tool kind and its output limits
pub struct ToolAdapter {
    kind: ToolKind,
    backend: Box<dyn Retriever>,
    top_k: usize,
    max_chars: usize,
}

impl ToolAdapter {
    pub fn new(kind: ToolKind, backend: Box<dyn Retriever>, top_k: usize, max_chars: usize) -> Self {
        Self {
            kind,
            backend,
            top_k,
            max_chars,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn tool(&self) -> Tool {
        self.kind.tool()
    }

    /// Run the lookup; the result never exceeds `max_chars` characters
    pub async fn run(&self, query: &str) -> AgentResult<String> {
        tracing::debug!(tool = %self.kind, query, "running lookup");
        let output = self.backend.lookup(query, self.top_k).await?;
        Ok(truncate_chars(&output, self.max_chars))
    }
}

/// Keep the first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
