use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::CrawlError;

use super::NOT_AVAILABLE;

const CARD_SELECTOR: &str = "div[class='base-search-card__info']";
const TITLE_SELECTOR: &str = "h3[class='base-search-card__title']";
const LOCATION_SELECTOR: &str = "p[class='people-search-card__location']";
const ENTITIES_SELECTOR: &str = "span[class='entity-list-meta__entities-list']";

/// One person listed on a search results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub name: String,
    pub display_name: String,
    pub url: String,
    pub location: String,
    pub companies: String,
}

fn selector(css: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css).map_err(|e| CrawlError::extraction(format!("bad selector {}: {}", css, e)))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Last path segment of a profile link, without its query string.
pub fn identifier_from_link(link: &str) -> String {
    let last_segment = link.rsplit('/').next().unwrap_or(link);
    last_segment
        .split('?')
        .next()
        .unwrap_or(last_segment)
        .trim()
        .to_string()
}

/// Extracts every result card of a search page and hands each record to
/// `emit` as soon as it is built. Returns the number of records emitted.
///
/// The location is looked up once per page and shared by all cards.
pub fn extract_search_results<F>(html: &str, mut emit: F) -> Result<usize, CrawlError>
where
    F: FnMut(DiscoveryRecord) -> Result<(), CrawlError>,
{
    let document = Html::parse_document(html);
    let card_selector = selector(CARD_SELECTOR)?;
    let title_selector = selector(TITLE_SELECTOR)?;
    let location_selector = selector(LOCATION_SELECTOR)?;
    let entities_selector = selector(ENTITIES_SELECTOR)?;

    let page_location = document.select(&location_selector).next().map(element_text);

    let mut emitted = 0;
    for card in document.select(&card_selector) {
        let link = card
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| parent.value().attr("href"))
            .ok_or_else(|| CrawlError::extraction("result card has no profile link"))?
            .trim()
            .to_string();

        let display_name = card
            .select(&title_selector)
            .next()
            .map(element_text)
            .ok_or_else(|| CrawlError::extraction(format!("no title for card {}", link)))?;

        let location = page_location
            .clone()
            .ok_or_else(|| CrawlError::extraction("no location on search page"))?;

        let companies = card
            .select(&entities_selector)
            .next()
            .map(element_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        emit(DiscoveryRecord {
            name: identifier_from_link(&link),
            display_name,
            url: link,
            location,
            companies,
        })?;
        emitted += 1;
    }

    Ok(emitted)
}
