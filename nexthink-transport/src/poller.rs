//! Polling of asynchronous server-side jobs.
//!
//! A job is started by one call, which returns an id, and then observed
//! through a status endpoint until it reaches a terminal state. The
//! [`JobPoller`] drives that loop at a fixed interval under an overall
//! deadline; what "status" means is left to a [`JobStatusSource`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nexthink_core::ExportStatus;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{PollError, TransportError};

/// Default wait between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default overall deadline.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

// ============================================================================
// Traits
// ============================================================================

/// A status value that maps onto the export state machine.
pub trait JobState: fmt::Debug + Send {
    /// Position in the state machine.
    fn export_status(&self) -> ExportStatus;

    /// Returns true once no further transitions can occur.
    fn is_terminal(&self) -> bool {
        self.export_status().is_terminal()
    }
}

impl JobState for ExportStatus {
    fn export_status(&self) -> ExportStatus {
        *self
    }
}

/// Something that can report the status of a job by id.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    /// Status returned by one check.
    type Status: JobState;

    /// Performs one status check.
    async fn fetch_status(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Self::Status, TransportError>;
}

// ============================================================================
// Job Poller
// ============================================================================

/// Fixed-interval poller with an overall deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobPoller {
    interval: Duration,
    timeout: Duration,
}

impl JobPoller {
    /// Creates a poller. Zero durations fall back to the defaults.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: if interval.is_zero() { DEFAULT_POLL_INTERVAL } else { interval },
            timeout: if timeout.is_zero() { DEFAULT_POLL_TIMEOUT } else { timeout },
        }
    }

    /// Wait between checks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Overall deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Polls `source` until the job reaches a terminal state.
    ///
    /// The first check happens immediately. Terminal statuses, including
    /// `ERROR`, are returned as `Ok`; the caller inspects them. When the
    /// deadline passes the last non-terminal status is returned inside
    /// [`PollError::Timeout`]. A check still in flight at the deadline is
    /// abandoned; one that completes at the deadline is still returned.
    #[instrument(skip(self, source, cancel), fields(interval = ?self.interval, timeout = ?self.timeout))]
    pub async fn wait_for<S>(
        &self,
        source: &S,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<S::Status, PollError<S::Status>>
    where
        S: JobStatusSource + ?Sized,
    {
        if job_id.trim().is_empty() {
            return Err(PollError::InvalidJobId);
        }

        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut last: Option<S::Status> = None;
        let mut checks: u32 = 0;

        loop {
            let status = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(PollError::Cancelled),
                result = source.fetch_status(job_id, cancel) => match result {
                    Ok(status) => status,
                    Err(TransportError::Cancelled) => return Err(PollError::Cancelled),
                    Err(error) => return Err(PollError::Transport(error)),
                },
                () = sleep_until(deadline) => {
                    return Err(PollError::Timeout { last, waited: started.elapsed() });
                }
            };
            checks += 1;
            debug!(checks, status = %status.export_status(), "Job status checked");

            if status.is_terminal() {
                info!(checks, elapsed = ?started.elapsed(), status = %status.export_status(), "Job finished");
                return Ok(status);
            }
            last = Some(status);

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(PollError::Cancelled),
                () = sleep_until(deadline) => {
                    return Err(PollError::Timeout { last, waited: started.elapsed() });
                }
                () = sleep(self.interval) => {}
            }
        }
    }
}

impl Default for JobPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT)
    }
}
