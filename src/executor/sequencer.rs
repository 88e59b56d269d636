//! Test sequencer
//!
//! Runs manual requests and catalog batches against the backend, one request
//! at a time, and records every outcome in the result log.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::HttpClient;
use crate::models::{test_case, BatchSummary, EndpointConfig, ResultEntry, TestCase, Verdict};
use crate::results::ResultLog;
use crate::utils::Timer;

/// Default delay between batch requests
pub const DEFAULT_PACING_MS: u64 = 500;

/// Sequencer errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerError {
    #[error("A test run is already in progress")]
    Busy,
}

/// Holds the busy flag for the duration of a run
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SequencerError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { flag })
            .map_err(|_| SequencerError::Busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives single-shot and batch runs
///
/// All entry points share one busy flag; a call made while another run is in
/// flight is rejected with [`SequencerError::Busy`] and issues no request.
#[derive(Debug)]
pub struct Sequencer {
    client: HttpClient,
    endpoint: Mutex<EndpointConfig>,
    pacing: Duration,
    log: Mutex<ResultLog>,
    busy: AtomicBool,
}

impl Sequencer {
    /// Create a new sequencer
    pub fn new(client: HttpClient, endpoint: EndpointConfig) -> Self {
        Self {
            client,
            endpoint: Mutex::new(endpoint),
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            log: Mutex::new(ResultLog::new()),
            busy: AtomicBool::new(false),
        }
    }

    /// Set the delay between batch requests
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Cap the result log
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log = Mutex::new(ResultLog::with_capacity(capacity));
        self
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Current endpoint configuration
    pub fn endpoint(&self) -> EndpointConfig {
        self.endpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the endpoint configuration between runs
    pub fn set_endpoint(&self, endpoint: EndpointConfig) -> Result<(), SequencerError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        *self.endpoint.lock().unwrap_or_else(PoisonError::into_inner) = endpoint;
        Ok(())
    }

    /// Result entries, newest first
    pub fn results(&self) -> Vec<ResultEntry> {
        self.log().snapshot()
    }

    pub fn clear_results(&self) {
        self.log().clear();
    }

    /// Send one manual token
    pub async fn run_single(&self, token: &str) -> Result<ResultEntry, SequencerError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let endpoint = self.endpoint();

        info!("Running manual test against {}", endpoint.endpoint());
        let outcome = self.client.execute(&endpoint, token).await;
        let entry = ResultEntry::manual(endpoint.provider, token, outcome);
        info!("  {}", entry);

        self.record(entry.clone());
        Ok(entry)
    }

    /// Run one catalog case without pacing
    pub async fn run_case(&self, case: &TestCase) -> Result<ResultEntry, SequencerError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let endpoint = self.endpoint();

        info!("Running {}", case);
        let entry = self.execute_case(&endpoint, case).await;
        self.record(entry.clone());
        Ok(entry)
    }

    /// Run the whole catalog in order
    ///
    /// Cases run strictly one after another with `pacing` between them.
    /// `cancel` is checked before each case and interrupts both the request
    /// and the pacing delay; entries already recorded are kept and nothing
    /// is recorded for an interrupted case.
    pub async fn run_batch(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, SequencerError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let endpoint = self.endpoint();
        let cases = test_case::catalog();

        info!(
            "Starting batch run of {} cases against {}",
            cases.len(),
            endpoint.endpoint()
        );

        let timer = Timer::start("batch run");
        let mut entries = Vec::with_capacity(cases.len());
        let mut cancelled = false;

        for (index, case) in cases.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            debug!("Running {}", case);
            let entry = tokio::select! {
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                entry = self.execute_case(&endpoint, case) => entry,
            };

            self.record(entry.clone());
            entries.push(entry);

            if index + 1 < cases.len() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.pacing) => {}
                }
            }
        }

        if cancelled {
            warn!(
                "Batch run cancelled after {}/{} cases",
                entries.len(),
                cases.len()
            );
        }

        let summary = BatchSummary::new(endpoint.provider, entries, cancelled);
        info!(
            "Batch run completed in {}ms - As expected: {}/{} ({:.1}%)",
            timer.stop().as_millis(),
            summary.as_expected,
            summary.total,
            summary.pass_rate()
        );

        Ok(summary)
    }

    async fn execute_case(&self, endpoint: &EndpointConfig, case: &TestCase) -> ResultEntry {
        let outcome = self.client.execute(endpoint, case.token).await;
        let entry = ResultEntry::from_case(endpoint.provider, case, outcome);

        if entry.verdict() == Verdict::Unexpected {
            warn!("  {}", entry);
        } else {
            info!("  {}", entry);
        }

        entry
    }

    fn record(&self, entry: ResultEntry) {
        self.log().append(entry);
    }

    fn log(&self) -> MutexGuard<'_, ResultLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
