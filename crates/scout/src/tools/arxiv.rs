use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::adapter::{truncate_chars, Retriever};
use super::kind::ToolKind;
use super::web_search::collapse_whitespace;
use super::{http_client, read_body};
use crate::errors::{AgentError, AgentResult};

pub const NO_RESULTS: &str = "No good Arxiv Result was found";

/// The export API rejects very long search expressions
const MAX_QUERY_LENGTH: usize = 300;

/// Paper search through the arxiv.org export API (Atom feed)
pub struct ArxivSearch {
    client: reqwest::Client,
    host: String,
}

impl ArxivSearch {
    pub fn new<S: Into<String>>(host: S) -> AgentResult<Self> {
        Ok(Self {
            client: http_client()?,
            host: host.into(),
        })
    }
}

#[async_trait]
impl Retriever for ArxivSearch {
    async fn lookup(&self, query: &str, top_k: usize) -> AgentResult<String> {
        let url = format!("{}/api/query", self.host.trim_end_matches('/'));
        let search_query = truncate_chars(query, MAX_QUERY_LENGTH);
        let max_results = top_k.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await;
        let feed = read_body(ToolKind::ArxivLookup, response).await?;

        let papers = parse_feed(&feed, top_k)?;
        if papers.is_empty() {
            Ok(NO_RESULTS.to_string())
        } else {
            Ok(papers
                .iter()
                .map(Paper::to_string)
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    /// yyyy-mm-dd of the latest version
    pub updated: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

impl std::fmt::Display for Paper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            self.updated,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

fn selector(css: &str) -> AgentResult<Selector> {
    Selector::parse(css).map_err(|e| AgentError::Internal(format!("Invalid selector: {:?}", e)))
}

fn first_text(entry: &ElementRef, selector: &Selector) -> String {
    entry
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Parse the entries of an Atom response. The HTML parser is lenient enough
/// for the small, flat subset of Atom the export API produces.
pub fn parse_feed(feed: &str, top_k: usize) -> AgentResult<Vec<Paper>> {
    let entry_selector = selector("entry")?;
    let title_selector = selector("title")?;
    let summary_selector = selector("summary")?;
    let updated_selector = selector("updated")?;
    let author_selector = selector("author name")?;

    let document = Html::parse_document(feed);
    let papers = document
        .select(&entry_selector)
        .map(|entry| {
            let updated = first_text(&entry, &updated_selector);
            Paper {
                updated: updated.chars().take(10).collect(),
                title: first_text(&entry, &title_selector),
                authors: entry
                    .select(&author_selector)
                    .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                    .collect(),
                summary: first_text(&entry, &summary_selector),
            }
        })
        .filter(|paper| !paper.title.is_empty())
        .take(top_k)
        .collect();

    Ok(papers)
}
