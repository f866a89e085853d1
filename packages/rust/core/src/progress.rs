//! Optional progress observer with cancellation power.
//!
//! The observer sees a monotonically increasing value between
//! [`MIN_PROGRESS`] and the configured scale: once when fetching starts,
//! once per completed fetch job, and once at the scale when the run is done.
//! Returning `false` from any but the last call cancels the run.

use userdb_shared::{Result, UserDbError};

pub const MIN_PROGRESS: u64 = 0;
pub const MAX_PROGRESS: u64 = 1_000_000;

/// Receives progress updates and decides whether to continue.
pub trait ProgressObserver: Send + Sync {
    /// Called with the current progress value. Return `false` to cancel.
    fn report(&self, current: u64) -> bool;
}

impl<F> ProgressObserver for F
where
    F: Fn(u64) -> bool + Send + Sync,
{
    fn report(&self, current: u64) -> bool {
        self(current)
    }
}

/// Progress state for one pipeline run.
///
/// Without an observer every method returns immediately.
pub struct Progress<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    scale: u64,
    increment: u64,
    current: u64,
}

impl<'a> Progress<'a> {
    /// Report on the default `0..=MAX_PROGRESS` scale.
    pub fn new(observer: Option<&'a dyn ProgressObserver>) -> Self {
        Self::with_scale(observer, MAX_PROGRESS)
    }

    pub fn with_scale(observer: Option<&'a dyn ProgressObserver>, scale: u64) -> Self {
        Self {
            observer,
            scale,
            increment: 0,
            current: MIN_PROGRESS,
        }
    }

    /// Size the per-job increment and report the starting value.
    pub fn start(&mut self, jobs: usize) -> Result<()> {
        if self.observer.is_none() {
            return Ok(());
        }
        self.increment = self.scale / jobs.max(1) as u64;
        self.current = MIN_PROGRESS;
        self.emit(self.current)
    }

    /// Advance by one job.
    pub fn step(&mut self) -> Result<()> {
        if self.observer.is_none() {
            return Ok(());
        }
        self.current = (self.current + self.increment).min(self.scale);
        self.emit(self.current)
    }

    /// Report completion. The observer's answer is ignored; the work is done.
    pub fn finish(&self) {
        if let Some(observer) = self.observer {
            observer.report(self.scale);
        }
    }

    fn emit(&self, value: u64) -> Result<()> {
        match self.observer {
            Some(observer) if !observer.report(value) => Err(UserDbError::Cancelled),
            _ => Ok(()),
        }
    }
}
