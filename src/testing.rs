// Test doubles for the browser layer and crawl tasks, plus html fixtures.
//
// - FakeBrowser / FakeLauncher: url -> queued responses, counts contexts
// - ScriptedTask: CrawlTask that fails on demand and records persists

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        atomic::{AtomicU32, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::{CrawlError, SinkError},
    services::{Browser, BrowsingContext, CrawlTask, Launcher, Navigation},
};

// ---------------------------------------------------------------------------
// FakeBrowser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Page { status: Option<u16>, html: String },
    NavigationError,
}

impl FakeResponse {
    pub fn ok(html: impl Into<String>) -> Self {
        FakeResponse::Page {
            status: Some(200),
            html: html.into(),
        }
    }

    pub fn status(status: u16, html: impl Into<String>) -> Self {
        FakeResponse::Page {
            status: Some(status),
            html: html.into(),
        }
    }
}

#[derive(Default)]
struct FakeState {
    pages: Mutex<HashMap<String, VecDeque<FakeResponse>>>,
    visits: Mutex<Vec<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    browser_closes: AtomicUsize,
    failing_spawns: AtomicUsize,
}

/// Serves queued responses per url. The last queued response for a url is
/// repeated; unknown urls fail navigation.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    state: Arc<FakeState>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(self, url: &str, response: FakeResponse) -> Self {
        self.state
            .pages
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn failing_spawns(self, count: usize) -> Self {
        self.state.failing_spawns.store(count, Ordering::SeqCst);
        self
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.browser_closes.load(Ordering::SeqCst)
    }

    pub fn visits(&self) -> Vec<String> {
        self.state.visits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_context(&self) -> Result<Box<dyn BrowsingContext>, CrawlError> {
        let spawn_fails = self
            .state
            .failing_spawns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if spawn_fails {
            return Err(CrawlError::Session("session not created".to_string()));
        }

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            state: self.state.clone(),
            html: None,
        }))
    }

    async fn close(&self) -> Result<(), CrawlError> {
        self.state.browser_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakePage {
    state: Arc<FakeState>,
    html: Option<String>,
}

#[async_trait]
impl BrowsingContext for FakePage {
    async fn goto(&mut self, url: &str) -> Result<Navigation, CrawlError> {
        self.state.visits.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;

        let response = {
            let mut pages = self.state.pages.lock().unwrap();
            match pages.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match response {
            Some(FakeResponse::Page { status, html }) => {
                self.html = Some(html);
                Ok(Navigation { status })
            }
            _ => Err(CrawlError::navigation(url, "net::ERR_CONNECTION_REFUSED")),
        }
    }

    async fn content(&mut self) -> Result<String, CrawlError> {
        self.html
            .clone()
            .ok_or_else(|| CrawlError::Session("no page loaded".to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), CrawlError> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeLauncher {
    browser: FakeBrowser,
    launches: AtomicUsize,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::with_browser(FakeBrowser::new())
    }

    pub fn with_browser(browser: FakeBrowser) -> Self {
        FakeLauncher {
            browser,
            launches: AtomicUsize::new(0),
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn browser(&self) -> &FakeBrowser {
        &self.browser
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn launch(&self) -> Result<Arc<dyn Browser>, CrawlError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.browser.clone()))
    }
}

// ---------------------------------------------------------------------------
// ScriptedTask
// ---------------------------------------------------------------------------

/// Task over string units that fails its first `n` invocations (across all
/// units) and always fails for the units named in `failing_for`.
#[derive(Default)]
pub struct ScriptedTask {
    failures_left: AtomicU32,
    always_failing: HashSet<String>,
    reject_writes: bool,
    fail_writes_in_run: bool,
    invocations: AtomicUsize,
    persisted: Mutex<Vec<String>>,
}

impl ScriptedTask {
    pub fn failing_times(failures: u32) -> Self {
        ScriptedTask {
            failures_left: AtomicU32::new(failures),
            ..Default::default()
        }
    }

    pub fn failing_for(units: &[&str]) -> Self {
        ScriptedTask {
            always_failing: units.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    /// Makes `run` itself report a sink failure, like a task that streams
    /// records while extracting.
    pub fn failing_writes_in_run(mut self) -> Self {
        self.fail_writes_in_run = true;
        self
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> Vec<String> {
        self.persisted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrawlTask for ScriptedTask {
    type Unit = String;
    type Record = String;

    fn unit_id(&self, unit: &String) -> String {
        unit.clone()
    }

    fn target_url(&self, unit: &String) -> String {
        format!("https://example.com/{}", unit)
    }

    async fn run(&self, _page: &mut dyn BrowsingContext, unit: &String) -> Result<String, CrawlError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let scripted_failure = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if scripted_failure || self.always_failing.contains(unit) {
            return Err(CrawlError::extraction(format!("no result card for {}", unit)));
        }
        if self.fail_writes_in_run {
            return Err(SinkError::Empty {
                destination: unit.clone(),
            }
            .into());
        }

        Ok(unit.clone())
    }

    async fn persist(&self, unit: &String, record: String) -> Result<(), CrawlError> {
        if self.reject_writes {
            return Err(SinkError::Empty {
                destination: unit.clone(),
            }
            .into());
        }
        self.persisted.lock().unwrap().push(record);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Html fixtures
// ---------------------------------------------------------------------------

pub fn search_card(link: &str, title: &str, companies: Option<&str>) -> String {
    let companies = companies
        .map(|c| {
            format!(
                r#"<h4 class="base-search-card__subtitle"><span class="entity-list-meta__entities-list">{}</span></h4>"#,
                c
            )
        })
        .unwrap_or_default();

    format!(
        r#"<a class="base-card__full-link" href="{}"><div class="base-search-card__info"><h3 class="base-search-card__title">{}</h3>{}</div></a>"#,
        link, title, companies
    )
}

pub fn search_page(location: &str, cards: &[String]) -> String {
    let items: String = cards
        .iter()
        .map(|card| {
            format!(
                r#"<li>{}<p class="people-search-card__location">{}</p></li>"#,
                card, location
            )
        })
        .collect();

    format!(
        r#"<html><head><title>People directory</title></head><body><ul class="serp-page__results-list">{}</ul></body></html>"#,
        items
    )
}

pub fn profile_page(json_ld: &Value) -> String {
    format!(
        r#"<html><head><title>Profile</title><script type="application/ld+json">{}</script></head><body></body></html>"#,
        json_ld
    )
}
