use serde::Deserialize;

pub const DUCKDUCKGO_HOST: &str = "https://html.duckduckgo.com";
pub const ARXIV_HOST: &str = "https://export.arxiv.org";
pub const WIKIPEDIA_HOST: &str = "https://en.wikipedia.org";

/// Where a lookup service lives and how much of its output the agent sees
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LookupConfig {
    pub host: String,
    /// Maximum number of results requested from the service
    pub top_k: usize,
    /// Maximum number of characters returned to the model
    pub max_chars: usize,
}

impl LookupConfig {
    pub fn new<S: Into<String>>(host: S, top_k: usize, max_chars: usize) -> Self {
        Self {
            host: host.into(),
            top_k,
            max_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_search")]
    pub search: LookupConfig,
    #[serde(default = "default_arxiv")]
    pub arxiv: LookupConfig,
    #[serde(default = "default_wikipedia")]
    pub wikipedia: LookupConfig,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            search: default_search(),
            arxiv: default_arxiv(),
            wikipedia: default_wikipedia(),
        }
    }
}

pub fn default_search() -> LookupConfig {
    LookupConfig::new(DUCKDUCKGO_HOST, 5, 1000)
}

pub fn default_arxiv() -> LookupConfig {
    LookupConfig::new(ARXIV_HOST, 1, 200)
}

pub fn default_wikipedia() -> LookupConfig {
    LookupConfig::new(WIKIPEDIA_HOST, 1, 200)
}
