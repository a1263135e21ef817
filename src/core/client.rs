use crate::config::ClientConfig;
use crate::core::xml::{ParseOptions, XmlDocument, XmlParser, EMPTY_DOCUMENT};
use crate::domain::ports::RankSource;
use crate::utils::error::{RankError, Result};
use crate::utils::validation::Validate;
use reqwest::{Client, StatusCode};
use url::Url;

const POPULARITY_PATH: [&str; 2] = ["SD", "POPULARITY"];
const RANK_ATTRIBUTE: &str = "TEXT";

/// Looks up domains against the ranking API and pulls out their global rank.
#[derive(Debug, Clone)]
pub struct RankLookupClient {
    base_url: Url,
    client: Client,
    parse_options: ParseOptions,
}

impl RankLookupClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            base_url: Url::parse(&config.base_url)?,
            client: Client::new(),
            parse_options: ParseOptions::default(),
        })
    }

    pub fn with_parse_options(mut self, parse_options: ParseOptions) -> Self {
        self.parse_options = parse_options;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base-url>?cli=10&url=<domain>`, with the domain form-urlencoded.
    pub fn lookup_url(&self, domain: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("cli", "10")
            .append_pair("url", domain);
        url
    }

    /// 查詢網域並回傳 SD/POPULARITY 的 TEXT 排名
    pub async fn global_rank(&self, domain: &str) -> Result<u64> {
        let url = self.lookup_url(domain);
        let document = self.request_document(&url).await?;
        let rank = rank_from_document(&document, &url)?;

        tracing::debug!("Global rank for {}: {}", domain, rank);
        Ok(rank)
    }

    /// 查詢網域並回傳解析後的 XML 回應
    pub async fn xml_response(&self, domain: &str) -> Result<XmlDocument> {
        let url = self.lookup_url(domain);
        self.request_document(&url).await
    }

    async fn request_document(&self, url: &Url) -> Result<XmlDocument> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status != StatusCode::OK {
            tracing::warn!("Ranking API returned {} for {}", status, url);
            return Err(RankError::BadStatus {
                status: status.as_u16(),
                url: url.clone(),
            });
        }

        let body = response.text().await.map_err(|source| RankError::Body {
            url: url.clone(),
            source,
        })?;

        self.parse_body(&body, url)
    }

    /// Parses a response body, treating an empty body as an empty `<root />`.
    pub fn parse_body(&self, body: &str, url: &Url) -> Result<XmlDocument> {
        let input = if body.is_empty() { EMPTY_DOCUMENT } else { body };

        let mut parser = XmlParser::new(&self.parse_options);
        match parser.parse(input) {
            Ok(document) => Ok(document),
            Err(source) => {
                let diagnostic = parser.take_last_diagnostic();
                tracing::warn!(
                    "Unable to parse response from {} into XML: {} ({:?})",
                    url,
                    source,
                    diagnostic
                );
                Err(RankError::Xml {
                    url: url.clone(),
                    source,
                    diagnostic,
                })
            }
        }
    }
}

/// Reads `SD/POPULARITY[@TEXT]` as an unsigned rank.
///
/// A missing or blank attribute is `MissingRank`; anything that is not a
/// plain non-negative integer is `InvalidRank`.
pub fn rank_from_document(document: &XmlDocument, url: &Url) -> Result<u64> {
    let text = document
        .find(&POPULARITY_PATH)
        .and_then(|popularity| popularity.attr(RANK_ATTRIBUTE))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| RankError::MissingRank { url: url.clone() })?;

    text.parse::<u64>().map_err(|_| RankError::InvalidRank {
        url: url.clone(),
        value: text.to_string(),
    })
}

#[async_trait::async_trait]
impl RankSource for RankLookupClient {
    async fn global_rank(&self, domain: &str) -> Result<u64> {
        RankLookupClient::global_rank(self, domain).await
    }

    async fn xml_response(&self, domain: &str) -> Result<XmlDocument> {
        RankLookupClient::xml_response(self, domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::xml::XmlError;

    fn client() -> RankLookupClient {
        RankLookupClient::new(&ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_lookup_url_encodes_domain() {
        let client = client();

        assert_eq!(
            client.lookup_url("example.com").as_str(),
            "http://data.alexa.com/data?cli=10&url=example.com"
        );
        assert_eq!(
            client.lookup_url("my site.com/a?b=c&d").as_str(),
            "http://data.alexa.com/data?cli=10&url=my+site.com%2Fa%3Fb%3Dc%26d"
        );
        assert_eq!(
            client.lookup_url("bücher.de").query(),
            Some("cli=10&url=b%C3%BCcher.de")
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = ClientConfig::new("not a url");
        assert!(matches!(
            RankLookupClient::new(&config),
            Err(RankError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_parse_body_empty_uses_placeholder() {
        let client = client();
        let url = client.lookup_url("example.com");

        let document = client.parse_body("", &url).unwrap();
        assert_eq!(document.root().name(), "root");
        assert!(matches!(
            rank_from_document(&document, &url),
            Err(RankError::MissingRank { .. })
        ));
    }

    #[test]
    fn test_parse_body_malformed() {
        let client = client();
        let url = client.lookup_url("example.com");

        let err = client.parse_body("<SD><POPULARITY", &url).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Unable to parse response body into XML: "));
        assert!(err.is_bad_response());
        assert!(err.diagnostic().is_some());
        assert_eq!(err.url(), Some(&url));
    }

    #[test]
    fn test_parse_body_rejects_doctype() {
        let client = client();
        let url = client.lookup_url("example.com");
        let body = r#"<!DOCTYPE root [<!ENTITY xxe SYSTEM "file:///etc/hostname">]>
<root><SD><POPULARITY TEXT="&xxe;"/></SD></root>"#;

        match client.parse_body(body, &url) {
            Err(RankError::Xml { source, .. }) => {
                assert!(matches!(source, XmlError::DtdNotAllowed))
            }
            other => panic!("expected XML error, got {:?}", other),
        }
    }

    #[test]
    fn test_rank_from_document() {
        let url = client().lookup_url("example.com");
        let parse = |body: &str| XmlDocument::parse(body, &ParseOptions::default()).unwrap();

        let document = parse(r#"<root><SD><POPULARITY TEXT="987"/></SD></root>"#);
        assert_eq!(rank_from_document(&document, &url).unwrap(), 987);

        let document = parse(r#"<root><SD><POPULARITY TEXT=" 12 "/></SD></root>"#);
        assert_eq!(rank_from_document(&document, &url).unwrap(), 12);

        let document = parse(r#"<root><SD><POPULARITY TEXT=""/></SD></root>"#);
        assert!(matches!(
            rank_from_document(&document, &url),
            Err(RankError::MissingRank { .. })
        ));

        let document = parse(r#"<root><SD><POPULARITY/></SD></root>"#);
        assert!(matches!(
            rank_from_document(&document, &url),
            Err(RankError::MissingRank { .. })
        ));

        let document = parse(r#"<root><SD><POPULARITY TEXT="12abc"/></SD></root>"#);
        match rank_from_document(&document, &url) {
            Err(RankError::InvalidRank { value, .. }) => assert_eq!(value, "12abc"),
            other => panic!("expected InvalidRank, got {:?}", other),
        }
    }
}
