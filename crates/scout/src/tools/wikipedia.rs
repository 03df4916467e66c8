use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use super::adapter::{truncate_chars, Retriever};
use super::kind::ToolKind;
use super::{http_client, read_body};
use crate::errors::{AgentError, AgentResult};

pub const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

const MAX_QUERY_LENGTH: usize = 300;

/// Encyclopedia lookup through the MediaWiki action API: a title search
/// followed by a plain-text intro extract per matching page
pub struct WikipediaSearch {
    client: reqwest::Client,
    host: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaSearch {
    pub fn new<S: Into<String>>(host: S) -> AgentResult<Self> {
        Ok(Self {
            client: http_client()?,
            host: host.into(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> AgentResult<T> {
        let url = format!("{}/w/api.php", self.host.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("action", "query"), ("format", "json")])
            .query(params)
            .send()
            .await;
        let body = read_body(ToolKind::WikipediaLookup, response).await?;
        serde_json::from_str(&body).map_err(|e| {
            AgentError::ExecutionError(format!("{} response malformed: {}", ToolKind::WikipediaLookup, e))
        })
    }

    async fn search_titles(&self, query: &str, top_k: usize) -> AgentResult<Vec<String>> {
        let limit = top_k.to_string();
        let response: SearchResponse = self
            .get(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .await?;
        Ok(response
            .query
            .search
            .into_iter()
            .map(|hit| hit.title)
            .take(top_k)
            .collect())
    }

    /// The intro of a page, or None when the page has no text
    async fn summary(&self, title: &str) -> AgentResult<Option<(String, String)>> {
        let response: ExtractResponse = self
            .get(&[
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;
        Ok(response
            .query
            .pages
            .into_values()
            .find_map(|page| match page.extract {
                Some(extract) if !extract.trim().is_empty() => {
                    Some((page.title, extract.trim().to_string()))
                }
                _ => None,
            }))
    }
}

#[async_trait]
impl Retriever for WikipediaSearch {
    async fn lookup(&self, query: &str, top_k: usize) -> AgentResult<String> {
        let query = truncate_chars(query, MAX_QUERY_LENGTH);
        let titles = self.search_titles(&query, top_k).await?;

        let mut summaries = Vec::new();
        for title in titles {
            if let Some((title, extract)) = self.summary(&title).await? {
                summaries.push(format!("Page: {}\nSummary: {}", title, extract));
            }
        }

        if summaries.is_empty() {
            Ok(NO_RESULTS.to_string())
        } else {
            Ok(summaries.join("\n\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_search(server: &MockServer, titles: &[&str]) {
        let hits: Vec<_> = titles.iter().map(|t| json!({"ns": 0, "title": t})).collect();
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"batchcomplete": "", "query": {"search": hits}})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_lookup_formats_page_summary() {
        let server = MockServer::start().await;
        mount_search(&server, &["Dune (novel)"]).await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .and(query_param("titles", "Dune (novel)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"8790": {
                    "pageid": 8790,
                    "title": "Dune (novel)",
                    "extract": "Dune is a 1965 epic science fiction novel by Frank Herbert.\n"
                }}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let wiki = WikipediaSearch::new(server.uri()).unwrap();
        let output = wiki.lookup("Dune", 1).await.unwrap();
        assert_eq!(
            output,
            "Page: Dune (novel)\nSummary: Dune is a 1965 epic science fiction novel by Frank Herbert."
        );
    }

    #[tokio::test]
    async fn test_lookup_without_results() {
        let server = MockServer::start().await;
        mount_search(&server, &[]).await;

        let wiki = WikipediaSearch::new(server.uri()).unwrap();
        assert_eq!(wiki.lookup("qwertyuiop", 1).await.unwrap(), NO_RESULTS);
    }

    #[tokio::test]
    async fn test_lookup_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let wiki = WikipediaSearch::new(server.uri()).unwrap();
        let err = wiki.lookup("Dune", 1).await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutionError(msg) if msg.contains("malformed")));
    }
}
