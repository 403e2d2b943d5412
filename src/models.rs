use serde::{Deserialize, Serialize};

// POST /search body
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: Option<u32>,
}

fn default_max_results() -> Option<u32> {
    Some(1)
}

// One search hit, as returned by the search service and to our clients
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub content: String,
}

// POST /answer body - also the prompt half of a citation request
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct LanguageModelPrompt {
    pub query: String,
    pub titles: Vec<String>,
    pub links: Vec<String>,
    pub contents: Vec<String>,
}

// POST /get-citations body
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CitationQuery {
    pub answer: String,
    // character span of the answer to attribute
    pub selection: (usize, usize),
    pub prompt: LanguageModelPrompt,
}
