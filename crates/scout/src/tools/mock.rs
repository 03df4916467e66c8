use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::adapter::Retriever;
use crate::errors::{AgentError, AgentResult};

/// A lookup backend that counts calls and returns a fixed result
#[derive(Clone)]
pub struct MockRetriever {
    calls: Arc<AtomicUsize>,
    result: AgentResult<String>,
}

impl MockRetriever {
    pub fn ok<S: Into<String>>(text: S) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Ok(text.into()),
        }
    }

    /// Every lookup fails like an unreachable service would
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Err(AgentError::ExecutionError(message.into())),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn lookup(&self, _query: &str, _top_k: usize) -> AgentResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
