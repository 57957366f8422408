use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    dal::CsvStore,
    domain::{
        keyword::{build_search_url, keyword_slug},
        search_result::extract_search_results,
    },
    error::CrawlError,
};

use super::{BrowsingContext, CrawlTask, ProxyUrlBuilder};

/// Csv file that holds the search results of `keyword`.
pub fn search_destination(keyword: &str) -> String {
    format!("{}.csv", keyword_slug(keyword))
}

/// Discovery stage: searches the people directory for a keyword and streams
/// every result card to the keyword's csv file.
///
/// Cards written by an earlier attempt of the same keyword are skipped when
/// the page is parsed again, so each card lands in the file once.
pub struct ProfileSearch {
    store: Arc<CsvStore>,
    proxy: ProxyUrlBuilder,
    location: String,
    written: Mutex<HashMap<String, usize>>,
}

impl ProfileSearch {
    pub fn new(store: Arc<CsvStore>, proxy: ProxyUrlBuilder, location: String) -> Self {
        ProfileSearch {
            store,
            proxy,
            location,
            written: Mutex::new(HashMap::new()),
        }
    }

    fn written_for(&self, keyword: &str) -> usize {
        self.written
            .lock()
            .map(|written| written.get(keyword).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    fn record_written(&self, keyword: &str) {
        if let Ok(mut written) = self.written.lock() {
            *written.entry(keyword.to_string()).or_default() += 1;
        }
    }
}

#[async_trait]
impl CrawlTask for ProfileSearch {
    type Unit = String;
    /// Number of result cards written.
    type Record = usize;

    fn unit_id(&self, keyword: &String) -> String {
        keyword.clone()
    }

    fn target_url(&self, keyword: &String) -> String {
        self.proxy.build(&build_search_url(keyword), &self.location)
    }

    async fn run(
        &self,
        page: &mut dyn BrowsingContext,
        keyword: &String,
    ) -> Result<usize, CrawlError> {
        let search_url = build_search_url(keyword);
        let target = self.target_url(keyword);

        let navigation = page.goto(&target).await?;
        if !navigation.is_success() {
            return Err(CrawlError::BadStatus {
                url: search_url,
                status: navigation.status.unwrap_or_default(),
            });
        }
        log::info!("Successfully fetched: {}", search_url);

        let html = page.content().await?;
        let destination = search_destination(keyword);
        let already_written = self.written_for(keyword);
        if already_written > 0 {
            log::info!("Skipping {} cards already written for {}", already_written, keyword);
        }

        let mut position = 0;
        extract_search_results(&html, |record| {
            position += 1;
            if position <= already_written {
                return Ok(());
            }
            self.store.append(&[record], &destination)?;
            self.record_written(keyword);
            Ok(())
        })
    }

    async fn persist(&self, keyword: &String, cards: usize) -> Result<(), CrawlError> {
        log::info!("Found {} profiles for {}", cards, keyword);
        Ok(())
    }
}
