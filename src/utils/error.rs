use crate::core::xml::{ParseDiagnostic, XmlError};
use thiserror::Error;
use url::Url;

/// Every failure a rank lookup can produce.
///
/// The remote-response variants (`BadStatus`, `Body`, `Xml`, `MissingRank`,
/// `InvalidRank`) make up the "bad response" family; callers that only care
/// about that distinction can use [`RankError::is_bad_response`].
#[derive(Error, Debug)]
pub enum RankError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API did not return 200/OK (status {status})")]
    BadStatus { status: u16, url: Url },

    #[error("Unable to parse response body into XML: {source}")]
    Body {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unable to parse response body into XML: {source}")]
    Xml {
        url: Url,
        #[source]
        source: XmlError,
        diagnostic: Option<ParseDiagnostic>,
    },

    #[error("Response from {url} has no SD/POPULARITY TEXT attribute")]
    MissingRank { url: Url },

    #[error("Response from {url} has a non-numeric rank: {value:?}")]
    InvalidRank { url: Url, value: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value:?} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl RankError {
    pub fn is_bad_response(&self) -> bool {
        matches!(
            self,
            RankError::BadStatus { .. }
                | RankError::Body { .. }
                | RankError::Xml { .. }
                | RankError::MissingRank { .. }
                | RankError::InvalidRank { .. }
        )
    }

    /// The lookup URL the failing response came from, when there was one.
    pub fn url(&self) -> Option<&Url> {
        match self {
            RankError::BadStatus { url, .. }
            | RankError::Body { url, .. }
            | RankError::Xml { url, .. }
            | RankError::MissingRank { url }
            | RankError::InvalidRank { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&ParseDiagnostic> {
        match self {
            RankError::Xml { diagnostic, .. } => diagnostic.as_ref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;
