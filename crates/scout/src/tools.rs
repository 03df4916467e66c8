//! Retrieval tools the agent can call.
//!
//! Each lookup service sits behind a [`Retriever`] backend. A [`ToolAdapter`]
//! pairs a backend with its result limits, and the [`Toolbox`] holds one
//! adapter per [`ToolKind`] and dispatches model tool calls by name.
mod adapter;
pub mod arxiv;
pub mod configs;
mod kind;
mod toolbox;
pub mod web_search;
pub mod wikipedia;

#[cfg(test)]
pub mod mock;

pub use adapter::{truncate_chars, Retriever, ToolAdapter};
pub use configs::{LookupConfig, ToolConfig};
pub use kind::ToolKind;
pub use toolbox::Toolbox;

use std::time::Duration;

use crate::errors::{AgentError, AgentResult};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Scout/1.0)";

/// HTTP client shared by the lookup backends
pub(crate) fn http_client() -> AgentResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| AgentError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a failed or non-success response into an execution error
pub(crate) async fn read_body(
    kind: ToolKind,
    response: Result<reqwest::Response, reqwest::Error>,
) -> AgentResult<String> {
    let response = response
        .map_err(|e| AgentError::ExecutionError(format!("{} request failed: {}", kind, e)))?;
    let status = response.status();
    if !status.is_success() {
        return Err(AgentError::ExecutionError(format!(
            "{} request failed with status {}",
            kind, status
        )));
    }
    response
        .text()
        .await
        .map_err(|e| AgentError::ExecutionError(format!("{} response unreadable: {}", kind, e)))
}
