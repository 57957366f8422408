use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    dal::CsvStore,
    domain::{
        keyword::keyword_slug,
        profile::{extract_profile, EnrichmentRecord},
        search_result::DiscoveryRecord,
    },
    error::CrawlError,
};

use super::{BrowsingContext, CrawlTask, ProxyUrlBuilder};

/// Csv file that holds the scraped profiles of `keyword`.
pub fn profile_destination(keyword: &str) -> String {
    format!("{}-profiles.csv", keyword_slug(keyword))
}

/// Enrichment stage: loads the profile page of a discovered person and reads
/// the JSON-LD `Person` entity.
pub struct ProfileScraper {
    store: Arc<CsvStore>,
    proxy: ProxyUrlBuilder,
    location: String,
    destination: String,
}

impl ProfileScraper {
    pub fn new(
        store: Arc<CsvStore>,
        proxy: ProxyUrlBuilder,
        location: String,
        destination: String,
    ) -> Self {
        ProfileScraper {
            store,
            proxy,
            location,
            destination,
        }
    }
}

#[async_trait]
impl CrawlTask for ProfileScraper {
    type Unit = DiscoveryRecord;
    type Record = EnrichmentRecord;

    fn unit_id(&self, row: &DiscoveryRecord) -> String {
        row.name.clone()
    }

    fn target_url(&self, row: &DiscoveryRecord) -> String {
        self.proxy.build(&row.url, &self.location)
    }

    async fn run(
        &self,
        page: &mut dyn BrowsingContext,
        row: &DiscoveryRecord,
    ) -> Result<EnrichmentRecord, CrawlError> {
        let navigation = page.goto(&self.target_url(row)).await?;
        if !navigation.is_success() {
            return Err(CrawlError::BadStatus {
                url: row.url.clone(),
                status: navigation.status.unwrap_or_default(),
            });
        }

        let html = page.content().await?;
        let record = extract_profile(&row.name, &html)?;
        log::info!("Successfully parsed {}", row.url);

        Ok(record)
    }

    async fn persist(&self, _row: &DiscoveryRecord, record: EnrichmentRecord) -> Result<(), CrawlError> {
        Ok(self.store.append(&[record], &self.destination)?)
    }
}
