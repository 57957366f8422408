use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use thirtyfour::{ChromeCapabilities, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::{configuration::BrowserSettings, error::CrawlError};

use super::{Browser, BrowsingContext, Navigation};

/// WebDriver backed browser. Every context is its own WebDriver session on
/// the configured server, so contexts never share cookies or windows.
pub struct Droid {
    server_url: String,
    caps: ChromeCapabilities,
    page_load_timeout: Duration,
    open_contexts: Arc<AtomicUsize>,
}

impl Droid {
    pub fn launch(settings: &BrowserSettings) -> Result<Self, CrawlError> {
        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.set_headless()?;
        }

        Ok(Droid {
            server_url: settings.webdriver_url.clone(),
            caps,
            page_load_timeout: Duration::from_secs(settings.timeout_secs),
            open_contexts: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Browser for Droid {
    async fn new_context(&self) -> Result<Box<dyn BrowsingContext>, CrawlError> {
        let driver = WebDriver::new(self.server_url.as_str(), self.caps.clone()).await?;

        if let Err(e) = driver.set_page_load_timeout(self.page_load_timeout).await {
            _ = driver.quit().await;
            return Err(e.into());
        }

        self.open_contexts.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(DroidPage {
            driver,
            open_contexts: self.open_contexts.clone(),
        }))
    }

    async fn close(&self) -> Result<(), CrawlError> {
        let leaked = self.open_contexts.load(Ordering::SeqCst);
        if leaked > 0 {
            log::warn!("Closing browser with {} sessions still open", leaked);
        }
        log::info!("Closed webdriver browser on {}", self.server_url);
        Ok(())
    }
}

struct DroidPage {
    driver: WebDriver,
    open_contexts: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowsingContext for DroidPage {
    async fn goto(&mut self, url: &str) -> Result<Navigation, CrawlError> {
        self.driver
            .goto(url)
            .await
            .map_err(|e| CrawlError::navigation(url, e))?;

        Ok(Navigation { status: None })
    }

    async fn content(&mut self) -> Result<String, CrawlError> {
        Ok(self.driver.source().await?)
    }

    async fn close(self: Box<Self>) -> Result<(), CrawlError> {
        let DroidPage {
            driver,
            open_contexts,
        } = *self;
        open_contexts.fetch_sub(1, Ordering::SeqCst);

        Ok(driver.quit().await?)
    }
}
