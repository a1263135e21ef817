use crate::domain::model::{LookupMode, RankRecord};
use crate::domain::ports::RankSource;

pub struct LookupEngine<S: RankSource> {
    source: S,
}

impl<S: RankSource> LookupEngine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// 依序查詢每個網域；單一網域失敗不會中斷其餘查詢
    pub async fn run(&self, domains: &[String], mode: LookupMode) -> Vec<RankRecord> {
        tracing::info!("Looking up {} domain(s)", domains.len());

        let mut records = Vec::with_capacity(domains.len());
        for domain in domains {
            let record = match mode {
                LookupMode::Rank => match self.source.global_rank(domain).await {
                    Ok(rank) => RankRecord::ranked(domain, rank),
                    Err(e) => {
                        tracing::error!("❌ Lookup for {} failed: {}", domain, e);
                        RankRecord::failed(domain, e.to_string())
                    }
                },
                LookupMode::Document => match self.source.xml_response(domain).await {
                    Ok(document) => RankRecord::with_document(domain, document.to_string()),
                    Err(e) => {
                        tracing::error!("❌ Lookup for {} failed: {}", domain, e);
                        RankRecord::failed(domain, e.to_string())
                    }
                },
            };
            records.push(record);
        }

        let failed = records.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            "✅ Finished {} lookup(s), {} failed",
            records.len(),
            failed
        );

        records
    }
}
