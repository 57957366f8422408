use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};

use crate::{configuration::BrowserSettings, error::CrawlError};

use super::{Browser, BrowsingContext, Navigation};

/// Plain http fetcher for pages that render server side. Each context gets
/// its own client so cookies are never shared between attempts.
pub struct HttpBrowser {
    timeout: Duration,
}

impl HttpBrowser {
    pub fn launch(settings: &BrowserSettings) -> Self {
        HttpBrowser {
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_context(&self) -> Result<Box<dyn BrowsingContext>, CrawlError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(fake_user_agent::get_rua())
            .read_timeout(self.timeout)
            .build()
            .map_err(|e| CrawlError::Session(e.to_string()))?;

        Ok(Box::new(HttpPage { client, body: None }))
    }

    async fn close(&self) -> Result<(), CrawlError> {
        Ok(())
    }
}

struct HttpPage {
    client: Client,
    body: Option<String>,
}

#[async_trait]
impl BrowsingContext for HttpPage {
    async fn goto(&mut self, url: &str) -> Result<Navigation, CrawlError> {
        let res = self
            .client
            .get(url)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        self.body = Some(body);

        Ok(Navigation {
            status: Some(status),
        })
    }

    async fn content(&mut self) -> Result<String, CrawlError> {
        self.body
            .clone()
            .ok_or_else(|| CrawlError::Session("no page loaded".to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), CrawlError> {
        Ok(())
    }
}
