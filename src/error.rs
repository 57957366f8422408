use thiserror::Error;

/// Failure of a single crawl attempt. Every variant is retried by the retry
/// wrapper; none of them escapes past the unit that produced it.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Failed to fetch page {url}, status: {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl CrawlError {
    pub fn extraction(message: impl Into<String>) -> Self {
        CrawlError::Extraction(message.into())
    }

    pub fn navigation(url: &str, reason: impl ToString) -> Self {
        CrawlError::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<thirtyfour::error::WebDriverError> for CrawlError {
    fn from(err: thirtyfour::error::WebDriverError) -> Self {
        CrawlError::Session(err.to_string())
    }
}

impl From<reqwest::Error> for CrawlError {
    fn from(err: reqwest::Error) -> Self {
        match err.url() {
            Some(url) => CrawlError::navigation(url.as_str(), &err),
            None => CrawlError::Session(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CrawlError {
    fn from(err: serde_json::Error) -> Self {
        CrawlError::Extraction(format!("malformed structured data: {}", err))
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("No data to write to {destination}")]
    Empty { destination: String },

    #[error("Failed to open {destination}: {source}")]
    Io {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}
