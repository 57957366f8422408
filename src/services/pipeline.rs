use std::{sync::Arc, time::Instant};

use anyhow::Context;

use crate::{
    configuration::{CrawlSettings, Settings},
    dal::CsvStore,
    domain::search_result::DiscoveryRecord,
};

use super::{
    crawl, profile_destination, search_destination, CrawlSummary, Launcher, ProfileScraper,
    ProfileSearch, ProxyUrlBuilder,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub discovery: CrawlSummary,
    /// Enrichment summary per keyword, in keyword order. Keywords whose search
    /// produced no rows are left out.
    pub enrichment: Vec<(String, CrawlSummary)>,
}

/// Runs discovery over every keyword, then enrichment over each keyword's
/// discovered rows.
pub struct Pipeline {
    crawl: CrawlSettings,
    proxy: ProxyUrlBuilder,
    store: Arc<CsvStore>,
}

impl Pipeline {
    pub fn new(settings: &Settings) -> Self {
        Pipeline {
            crawl: settings.crawl.clone(),
            proxy: ProxyUrlBuilder::new(settings.api_keys.scrapeops.clone()),
            store: Arc::new(CsvStore::new(&settings.output.directory)),
        }
    }

    pub fn with_store(crawl: CrawlSettings, proxy: ProxyUrlBuilder, store: Arc<CsvStore>) -> Self {
        Pipeline {
            crawl,
            proxy,
            store,
        }
    }

    pub async fn run(&self, launcher: &dyn Launcher) -> anyhow::Result<PipelineReport> {
        log::info!("Crawl starting");
        let started = Instant::now();
        let discovery = self.discover(launcher).await?;
        log::info!("Crawl complete in {:.2?}", started.elapsed());

        log::info!("Starting scrape");
        let started = Instant::now();
        let mut enrichment = vec![];
        for keyword in &self.crawl.keywords {
            if let Some(summary) = self.enrich(launcher, keyword).await? {
                enrichment.push((keyword.clone(), summary));
            }
        }
        log::info!("Scrape complete in {:.2?}", started.elapsed());

        Ok(PipelineReport {
            discovery,
            enrichment,
        })
    }

    async fn discover(&self, launcher: &dyn Launcher) -> anyhow::Result<CrawlSummary> {
        let task = Arc::new(ProfileSearch::new(
            self.store.clone(),
            self.proxy.clone(),
            self.crawl.location.clone(),
        ));

        crawl(
            launcher,
            task,
            self.crawl.keywords.clone(),
            self.crawl.batch_size,
            self.crawl.max_attempts,
        )
        .await
        .context("Discovery crawl failed")
    }

    async fn enrich(
        &self,
        launcher: &dyn Launcher,
        keyword: &str,
    ) -> anyhow::Result<Option<CrawlSummary>> {
        let source = search_destination(keyword);
        if !self.store.exists(&source) {
            log::warn!("No search results for {}, skipping profiles", keyword);
            return Ok(None);
        }

        let rows: Vec<DiscoveryRecord> = self
            .store
            .read_all(&source)
            .with_context(|| format!("Failed to read {}", source))?;
        log::info!("Scraping {} profiles from {}", rows.len(), source);

        let task = Arc::new(ProfileScraper::new(
            self.store.clone(),
            self.proxy.clone(),
            self.crawl.location.clone(),
            profile_destination(keyword),
        ));

        let summary = crawl(
            launcher,
            task,
            rows,
            self.crawl.batch_size,
            self.crawl.max_attempts,
        )
        .await
        .with_context(|| format!("Profile crawl for {} failed", keyword))?;

        Ok(Some(summary))
    }
}
