use crate::error::CrawlError;

use super::{Browser, CrawlTask};

/// Attempt bookkeeping for one unit. Lives from the unit's first attempt until
/// it succeeds or runs out of attempts.
#[derive(Debug)]
pub struct RetryState {
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub last_error: Option<CrawlError>,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        RetryState {
            attempts_used: 0,
            max_attempts,
            last_error: None,
        }
    }

    /// Attempts still allowed. `max_attempts` counts retries, so a unit gets
    /// `max_attempts + 1` tries in total.
    pub fn remaining(&self) -> u32 {
        (self.max_attempts + 1).saturating_sub(self.attempts_used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_used > self.max_attempts
    }

    fn record_failure(&mut self, error: CrawlError) {
        self.attempts_used += 1;
        self.last_error = Some(error);
    }
}

enum Phase<R> {
    Pending,
    Attempting,
    Succeeded(R),
    Exhausted,
    Unpersisted,
}

pub enum Outcome<R> {
    Succeeded(R),
    Exhausted(RetryState),
    /// An attempt failed to write to the sink. Sink failures are never retried.
    Unpersisted(RetryState),
}

/// Runs `task` for `unit` until it succeeds or `max_attempts` retries are
/// used up. Each attempt gets a fresh context which is closed before the next
/// transition, whatever the attempt returned.
///
/// A sink failure ends the unit at once with [`Outcome::Unpersisted`].
pub async fn with_retries<T: CrawlTask>(
    browser: &dyn Browser,
    task: &T,
    unit: &T::Unit,
    max_attempts: u32,
) -> Outcome<T::Record> {
    let mut state = RetryState::new(max_attempts);
    let mut phase = Phase::Pending;

    loop {
        phase = match phase {
            Phase::Pending => Phase::Attempting,
            Phase::Attempting => match attempt_once(browser, task, unit).await {
                Ok(record) => Phase::Succeeded(record),
                Err(e @ CrawlError::Sink(_)) => {
                    state.record_failure(e);
                    Phase::Unpersisted
                }
                Err(e) => {
                    log::warn!(
                        "Error: {}, tries left: {}, unit: {}, url: {}",
                        e,
                        state.remaining().saturating_sub(1),
                        task.unit_id(unit),
                        task.target_url(unit),
                    );
                    state.record_failure(e);

                    match state.is_exhausted() {
                        true => Phase::Exhausted,
                        false => Phase::Attempting,
                    }
                }
            },
            Phase::Succeeded(record) => return Outcome::Succeeded(record),
            Phase::Exhausted => {
                log::error!(
                    "Giving up on {} after {} attempts, last error: {}",
                    task.unit_id(unit),
                    state.attempts_used,
                    state
                        .last_error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                );
                return Outcome::Exhausted(state);
            }
            Phase::Unpersisted => {
                log::error!(
                    "Failed to write records for {}, not retrying: {}",
                    task.unit_id(unit),
                    state
                        .last_error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                );
                return Outcome::Unpersisted(state);
            }
        }
    }
}

async fn attempt_once<T: CrawlTask>(
    browser: &dyn Browser,
    task: &T,
    unit: &T::Unit,
) -> Result<T::Record, CrawlError> {
    let mut page = browser.new_context().await?;
    let result = task.run(page.as_mut(), unit).await;

    if let Err(e) = page.close().await {
        log::warn!("Failed to close page for {}: {}", task.unit_id(unit), e);
    }

    result
}
