use serde::{Deserialize, Serialize};

/// 單一網域的查詢結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRecord {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RankRecord {
    pub fn ranked(domain: &str, rank: u64) -> Self {
        Self {
            domain: domain.to_string(),
            rank: Some(rank),
            document: None,
            error: None,
        }
    }

    pub fn with_document(domain: &str, document: String) -> Self {
        Self {
            domain: domain.to_string(),
            rank: None,
            document: Some(document),
            error: None,
        }
    }

    pub fn failed(domain: &str, error: String) -> Self {
        Self {
            domain: domain.to_string(),
            rank: None,
            document: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// What a lookup should produce for each domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    #[default]
    Rank,
    Document,
}
