use crate::core::xml::XmlDocument;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Anything that can answer rank lookups for a domain.
#[async_trait]
pub trait RankSource: Send + Sync {
    async fn global_rank(&self, domain: &str) -> Result<u64>;
    async fn xml_response(&self, domain: &str) -> Result<XmlDocument>;
}
