use async_trait::async_trait;

use crate::error::CrawlError;

use super::{with_retries, Browser, BrowsingContext, Outcome};

/// One kind of crawl unit (a keyword, a discovered row) and how to turn it
/// into a record using a single page.
#[async_trait]
pub trait CrawlTask: Send + Sync + 'static {
    type Unit: Send + Sync + 'static;
    type Record: Send + 'static;

    /// Identifier of the unit used in logs.
    fn unit_id(&self, unit: &Self::Unit) -> String;

    /// The url an attempt navigates to, after proxy rewriting.
    fn target_url(&self, unit: &Self::Unit) -> String;

    async fn run(
        &self,
        page: &mut dyn BrowsingContext,
        unit: &Self::Unit,
    ) -> Result<Self::Record, CrawlError>;

    /// Called once with the record of a unit that succeeded.
    async fn persist(&self, unit: &Self::Unit, record: Self::Record) -> Result<(), CrawlError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Succeeded,
    Exhausted,
    /// A record was extracted but could not be written.
    Unpersisted,
}

/// Runs one unit through the retry wrapper and persists its record.
pub async fn execute_unit<T: CrawlTask>(
    browser: &dyn Browser,
    task: &T,
    unit: T::Unit,
    max_attempts: u32,
) -> UnitOutcome {
    match with_retries(browser, task, &unit, max_attempts).await {
        Outcome::Succeeded(record) => match task.persist(&unit, record).await {
            Ok(()) => UnitOutcome::Succeeded,
            Err(e) => {
                log::error!("Failed to write record for {}: {}", task.unit_id(&unit), e);
                UnitOutcome::Unpersisted
            }
        },
        Outcome::Exhausted(_) => UnitOutcome::Exhausted,
        Outcome::Unpersisted(_) => UnitOutcome::Unpersisted,
    }
}
