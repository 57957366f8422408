pub mod browser;
pub mod crawl_task;
pub mod droid;
pub mod http_browser;
pub mod orchestrator;
pub mod pipeline;
pub mod profile_scraper;
pub mod profile_search;
pub mod proxy;
pub mod retry;

pub use browser::*;
pub use crawl_task::*;
pub use droid::*;
pub use http_browser::*;
pub use orchestrator::*;
pub use pipeline::*;
pub use profile_scraper::*;
pub use profile_search::*;
pub use proxy::*;
pub use retry::*;
