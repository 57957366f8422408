use std::{future::Future, sync::Arc, time::Instant};

use tokio::task::JoinSet;

use crate::error::CrawlError;

use super::{execute_unit, CrawlTask, Launcher, UnitOutcome};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub units: usize,
    pub succeeded: usize,
    pub exhausted: usize,
    pub unpersisted: usize,
}

impl CrawlSummary {
    fn from_outcomes(units: usize, outcomes: &[UnitOutcome]) -> Self {
        let count = |wanted: UnitOutcome| outcomes.iter().filter(|&&o| o == wanted).count();

        CrawlSummary {
            units,
            succeeded: count(UnitOutcome::Succeeded),
            exhausted: count(UnitOutcome::Exhausted),
            unpersisted: count(UnitOutcome::Unpersisted),
        }
    }
}

/// Runs `execute` for every unit, `batch_size` units at a time. All tasks of a
/// batch are spawned before any is awaited, and the next batch only starts
/// once every task of the current one has settled.
///
/// Returns the outputs of the tasks that completed, in settle order. A task
/// that panics is logged and skipped.
pub async fn run_in_batches<U, O, F, Fut>(units: Vec<U>, batch_size: usize, execute: F) -> Vec<O>
where
    U: Send,
    O: Send + 'static,
    F: Fn(U) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
{
    let batch_size = batch_size.max(1);
    let total_batches = units.len().div_ceil(batch_size);
    let mut settled = Vec::with_capacity(units.len());
    let mut remaining = units.into_iter();

    for batch_number in 1..=total_batches {
        let mut tasks = JoinSet::new();
        for unit in remaining.by_ref().take(batch_size) {
            tasks.spawn(execute(unit));
        }
        log::info!(
            "Batch {}/{} started with {} tasks",
            batch_number,
            total_batches,
            tasks.len()
        );

        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(output) => settled.push(output),
                Err(e) => log::error!("Failed to process batch {}: {}", batch_number, e),
            }
        }
    }

    settled
}

/// Launches one browser for the whole crawl, runs every unit through the
/// retry wrapper in batches, then closes the browser.
pub async fn crawl<T: CrawlTask>(
    launcher: &dyn Launcher,
    task: Arc<T>,
    units: Vec<T::Unit>,
    batch_size: usize,
    max_attempts: u32,
) -> Result<CrawlSummary, CrawlError> {
    if units.is_empty() {
        return Ok(CrawlSummary::default());
    }

    let started = Instant::now();
    let total = units.len();
    let browser = launcher.launch().await?;

    let outcomes = run_in_batches(units, batch_size, |unit| {
        let browser = browser.clone();
        let task = task.clone();
        async move { execute_unit(browser.as_ref(), task.as_ref(), unit, max_attempts).await }
    })
    .await;

    if let Err(e) = browser.close().await {
        log::error!("Failed to close browser: {}", e);
    }

    let summary = CrawlSummary::from_outcomes(total, &outcomes);
    log::info!(
        "Crawled {} units in {:.2?}: {} succeeded, {} exhausted, {} not written",
        summary.units,
        started.elapsed(),
        summary.succeeded,
        summary.exhausted,
        summary.unpersisted,
    );

    Ok(summary)
}
