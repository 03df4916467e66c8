use async_trait::async_trait;
use scraper::{Html, Selector};

use super::adapter::Retriever;
use super::kind::ToolKind;
use super::{http_client, read_body};
use crate::errors::{AgentError, AgentResult};

pub const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// Web search through the DuckDuckGo HTML endpoint, which needs no API key
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    host: String,
}

impl DuckDuckGoSearch {
    pub fn new<S: Into<String>>(host: S) -> AgentResult<Self> {
        Ok(Self {
            client: http_client()?,
            host: host.into(),
        })
    }
}

#[async_trait]
impl Retriever for DuckDuckGoSearch {
    async fn lookup(&self, query: &str, top_k: usize) -> AgentResult<String> {
        let url = format!("{}/html/", self.host.trim_end_matches('/'));
        let response = self.client.get(&url).query(&[("q", query)]).send().await;
        let html = read_body(ToolKind::WebSearch, response).await?;

        let snippets = extract_snippets(&html, top_k)?;
        if snippets.is_empty() {
            Ok(NO_RESULTS.to_string())
        } else {
            Ok(snippets.join(" "))
        }
    }
}

/// Result snippets from a DuckDuckGo HTML results page, in page order
fn extract_snippets(html: &str, top_k: usize) -> AgentResult<Vec<String>> {
    let selector = Selector::parse(".result__snippet")
        .map_err(|e| AgentError::Internal(format!("Invalid selector: {:?}", e)))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|snippet| !snippet.is_empty())
        .take(top_k)
        .collect())
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
