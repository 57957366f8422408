use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    configuration::{BrowserKind, BrowserSettings},
    error::CrawlError,
};

use super::{Droid, HttpBrowser};

/// Result of loading a page. `status` is `None` when the driver cannot see
/// the HTTP response, as with WebDriver sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub status: Option<u16>,
}

impl Navigation {
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |status| status == 200)
    }
}

/// An isolated page owned by exactly one attempt.
#[async_trait]
pub trait BrowsingContext: Send {
    async fn goto(&mut self, url: &str) -> Result<Navigation, CrawlError>;

    /// Html of the currently loaded page.
    async fn content(&mut self) -> Result<String, CrawlError>;

    async fn close(self: Box<Self>) -> Result<(), CrawlError>;
}

/// The run-wide session factory. Spawning contexts must be safe for
/// concurrent callers.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_context(&self) -> Result<Box<dyn BrowsingContext>, CrawlError>;

    async fn close(&self) -> Result<(), CrawlError>;
}

#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn Browser>, CrawlError>;
}

/// Launches the browser implementation named in the settings.
pub struct BrowserLauncher {
    settings: BrowserSettings,
}

impl BrowserLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        BrowserLauncher { settings }
    }
}

#[async_trait]
impl Launcher for BrowserLauncher {
    async fn launch(&self) -> Result<Arc<dyn Browser>, CrawlError> {
        let browser: Arc<dyn Browser> = match self.settings.kind {
            BrowserKind::Webdriver => Arc::new(Droid::launch(&self.settings)?),
            BrowserKind::Http => Arc::new(HttpBrowser::launch(&self.settings)),
        };
        log::info!("Launched {:?} browser", self.settings.kind);

        Ok(browser)
    }
}
