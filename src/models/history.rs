use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the Codex prompt history file (`$CODEX_HOME/history.jsonl`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodexHistoryEntry {
    pub session_id: String,
    #[serde(rename = "ts", default, deserialize_with = "crate::parsers::deserializers::deserialize_epoch")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_opt_string")]
    pub text: Option<String>,
}
