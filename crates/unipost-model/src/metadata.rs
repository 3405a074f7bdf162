use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Orchestration metadata accompanying every batch of raw posts.
///
/// These values are injected into records verbatim; the engine never derives
/// them from payload content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlMetadata {
    /// Identifier of the crawl run that produced the batch.
    pub crawl_id: String,
    /// Identifier of the snapshot within the crawl.
    pub snapshot_id: String,
    /// Competitor the crawled account belongs to.
    pub competitor: String,
    /// Brand dimension for analytics.
    pub brand: String,
    /// Content category assigned by orchestration.
    pub category: String,
    /// Date the crawl ran.
    pub crawl_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_sidecar_json() {
        let meta: CrawlMetadata = serde_json::from_str(
            r#"{
                "crawl_id": "crawl-8821",
                "snapshot_id": "snap-091",
                "competitor": "acme",
                "brand": "acme-drinks",
                "category": "beverages",
                "crawl_date": "2025-07-14"
            }"#,
        )
        .unwrap();
        assert_eq!(meta.crawl_id, "crawl-8821");
        assert_eq!(meta.crawl_date, NaiveDate::from_ymd_opt(2025, 7, 14).unwrap());
    }
}
