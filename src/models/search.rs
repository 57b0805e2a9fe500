use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The assistant CLI a log was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Codex,
    ClaudeCode,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Codex, Source::ClaudeCode];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Codex => "codex",
            Source::ClaudeCode => "claude-code",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "codex" => Ok(Source::Codex),
            "claude-code" | "claude" => Ok(Source::ClaudeCode),
            other => Err(format!("unknown source: {other} (expected codex or claude-code)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One substring hit with its surrounding context window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub source: Source,
    pub project_id: String,
    pub project_path: String,
    pub session_id: String,
    pub matched_text: String,
    pub context_before: String,
    pub context_after: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub role: Role,
}

/// Parameters of a cross-source search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub sources: Vec<Source>,
    pub limit: usize,
    pub offset: usize,
    #[serde(default)]
    pub project_path: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

pub const DEFAULT_SEARCH_LIMIT: usize = 50;

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sources: Source::ALL.to_vec(),
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
            project_path: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn project_path(mut self, project_path: impl Into<String>) -> Self {
        self.project_path = Some(project_path.into());
        self
    }

    pub fn date_range(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.start_date = start.map(str::to_string);
        self.end_date = end.map(str::to_string);
        self
    }
}

/// A page of results plus the total number of filtered matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_str() {
        assert_eq!("codex".parse::<Source>().unwrap(), Source::Codex);
        assert_eq!("claude-code".parse::<Source>().unwrap(), Source::ClaudeCode);
        assert!("gemini".parse::<Source>().is_err());
    }

    #[test]
    fn test_search_result_serializes_camel_case() {
        let result = SearchResult {
            source: Source::ClaudeCode,
            project_id: "id".to_string(),
            project_path: "/tmp/p".to_string(),
            session_id: "s".to_string(),
            matched_text: "Deploy".to_string(),
            context_before: "please ".to_string(),
            context_after: " now".to_string(),
            timestamp: None,
            role: Role::User,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "claude-code");
        assert_eq!(json["matchedText"], "Deploy");
        assert_eq!(json["role"], "user");
    }
}
