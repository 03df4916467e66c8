use indoc::indoc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum_macros::{Display, EnumIter, EnumString};

use crate::models::tool::Tool;

/// The closed set of lookups the agent may perform
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
pub enum ToolKind {
    #[strum(serialize = "search")]
    #[serde(rename = "search")]
    WebSearch,
    #[strum(serialize = "arxiv")]
    #[serde(rename = "arxiv")]
    ArxivLookup,
    #[strum(serialize = "wikipedia")]
    #[serde(rename = "wikipedia")]
    WikipediaLookup,
}

impl ToolKind {
    /// Name the model uses to call this tool
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::WebSearch => indoc! {"
                A wrapper around DuckDuckGo Search. Useful for when you need to answer
                questions about current events. Input should be a search query."},
            ToolKind::ArxivLookup => indoc! {"
                A wrapper around Arxiv.org. Useful for when you need to answer questions
                about Physics, Mathematics, Computer Science, Quantitative Biology,
                Quantitative Finance, Statistics, Electrical Engineering, and Economics
                from scientific articles on arxiv.org. Input should be a search query."},
            ToolKind::WikipediaLookup => indoc! {"
                A wrapper around Wikipedia. Useful for when you need to answer general
                questions about people, places, companies, facts, historical events, or
                other subjects. Input should be a search query."},
        }
    }

    /// The definition advertised to the model
    pub fn tool(&self) -> Tool {
        Tool::new(
            self.name(),
            self.description(),
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                }
            }),
        )
    }
}
