use std::collections::HashMap;
use std::str::FromStr;

use strum::IntoEnumIterator;

use super::adapter::ToolAdapter;
use super::arxiv::ArxivSearch;
use super::configs::{LookupConfig, ToolConfig};
use super::kind::ToolKind;
use super::web_search::DuckDuckGoSearch;
use super::wikipedia::WikipediaSearch;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};

/// One adapter per tool kind, addressed by the name the model uses
#[derive(Default)]
pub struct Toolbox {
    adapters: HashMap<ToolKind, ToolAdapter>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three standard lookups, configured from `config`
    pub fn from_config(config: &ToolConfig) -> AgentResult<Self> {
        let adapter = |kind: ToolKind, lookup: &LookupConfig| -> AgentResult<ToolAdapter> {
            let backend: Box<dyn super::Retriever> = match kind {
                ToolKind::WebSearch => Box::new(DuckDuckGoSearch::new(&lookup.host)?),
                ToolKind::ArxivLookup => Box::new(ArxivSearch::new(&lookup.host)?),
                ToolKind::WikipediaLookup => Box::new(WikipediaSearch::new(&lookup.host)?),
            };
            Ok(ToolAdapter::new(kind, backend, lookup.top_k, lookup.max_chars))
        };

        Ok(Self::new()
            .with_adapter(adapter(ToolKind::WebSearch, &config.search)?)
            .with_adapter(adapter(ToolKind::ArxivLookup, &config.arxiv)?)
            .with_adapter(adapter(ToolKind::WikipediaLookup, &config.wikipedia)?))
    }

    /// Add an adapter, replacing any existing one of the same kind
    pub fn with_adapter(mut self, adapter: ToolAdapter) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Tool definitions for the model, in a stable order
    pub fn tools(&self) -> Vec<Tool> {
        ToolKind::iter()
            .filter_map(|kind| self.adapters.get(&kind))
            .map(ToolAdapter::tool)
            .collect()
    }

    /// Resolve a model tool call to the adapter kind and query string
    pub fn resolve(&self, call: &ToolCall) -> AgentResult<(ToolKind, String)> {
        let kind = ToolKind::from_str(&call.name)
            .ok()
            .filter(|kind| self.adapters.contains_key(kind))
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        let query = call
            .arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AgentError::InvalidParameters(format!(
                    "{} requires a string 'query' parameter",
                    kind
                ))
            })?;

        Ok((kind, query.to_string()))
    }

    /// Run the adapter for `kind`
    pub async fn run(&self, kind: ToolKind, query: &str) -> AgentResult<String> {
        let adapter = self
            .adapters
            .get(&kind)
            .ok_or_else(|| AgentError::ToolNotFound(kind.name()))?;
        adapter.run(query).await
    }

    /// Resolve and run a tool call in one step
    pub async fn dispatch(&self, call: &ToolCall) -> AgentResult<String> {
        let (kind, query) = self.resolve(call)?;
        self.run(kind, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Retriever;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Retriever for Echo {
        async fn lookup(&self, query: &str, top_k: usize) -> AgentResult<String> {
            Ok(format!("{} x{}", query, top_k))
        }
    }

    fn echo_toolbox() -> Toolbox {
        Toolbox::new()
            .with_adapter(ToolAdapter::new(ToolKind::WikipediaLookup, Box::new(Echo), 1, 200))
            .with_adapter(ToolAdapter::new(ToolKind::WebSearch, Box::new(Echo), 4, 200))
    }

    #[test]
    fn test_tools_listed_in_kind_order() {
        let names: Vec<_> = echo_toolbox().tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["search", "wikipedia"]);
    }

    #[test]
    fn test_from_config_builds_all_three() {
        let toolbox = Toolbox::from_config(&ToolConfig::default()).unwrap();
        let names: Vec<_> = toolbox.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["search", "arxiv", "wikipedia"]);
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let output = echo_toolbox()
            .dispatch(&ToolCall::new("search", json!({"query": "rust"})))
            .await
            .unwrap();
        assert_eq!(output, "rust x4");
    }

    #[test]
    fn test_resolve_errors() {
        let toolbox = echo_toolbox();

        let err = toolbox
            .resolve(&ToolCall::new("calculator", json!({"query": "1+1"})))
            .unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("calculator".into()));

        // known kind that this toolbox does not carry
        let err = toolbox
            .resolve(&ToolCall::new("arxiv", json!({"query": "llm"})))
            .unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("arxiv".into()));

        let err = toolbox
            .resolve(&ToolCall::new("wikipedia", json!({"q": "Dune"})))
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }
}
