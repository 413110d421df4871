use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub type DocId = u32;

/// A corpus record as it appears on disk.
///
/// Fields the engine does not interpret (difficulty, source, contest id, ...) are
/// kept in `extra` so they flow back out unchanged in search results and when the
/// crawler rewrites the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Problem {
    pub fn new(title: impl Into<String>, description: Option<&str>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.map(str::to_string),
            url: url.into(),
            tags: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// True when the record still needs a statement fetched for it.
    pub fn missing_description(&self) -> bool {
        self.description.as_deref().map_or(true, |d| d.trim().is_empty())
    }

    pub fn platform(&self) -> Platform { Platform::from_url(&self.url) }
}

/// Accept `null` where a list is expected.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An indexed problem. The id is its position in the corpus for one index build.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub problem: Problem,
}

impl Document {
    pub fn title(&self) -> &str { &self.problem.title }
    pub fn description(&self) -> Option<&str> { self.problem.description.as_deref() }
    pub fn url(&self) -> &str { &self.problem.url }
    pub fn platform(&self) -> Platform { self.problem.platform() }

    /// Text fed to the tokenizer: the title `title_boost` times, then the description.
    pub fn indexing_text(&self, title_boost: usize) -> String {
        let mut parts: Vec<&str> = std::iter::repeat(self.title()).take(title_boost).collect();
        parts.push(self.description().unwrap_or(""));
        parts.join(" ")
    }
}

/// Assign sequential ids in corpus order.
pub fn documents_from(problems: Vec<Problem>) -> Vec<Document> {
    problems
        .into_iter()
        .enumerate()
        .map(|(i, problem)| Document { id: i as DocId, problem })
        .collect()
}

/// Judge a problem is hosted on. Anything that is not LeetCode is labelled Codeforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    LeetCode,
    Codeforces,
}

impl Platform {
    pub fn from_url(url: &str) -> Self {
        if url.to_ascii_lowercase().contains("leetcode.com") {
            Platform::LeetCode
        } else {
            Platform::Codeforces
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LeetCode => "LeetCode",
            Platform::Codeforces => "Codeforces",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
