//! Concurrent fan-out over registries with deterministic fan-in.
//!
//! One task is spawned per source. Tasks share nothing but a result channel
//! sized to the job count, so no task ever waits to report. Results are put
//! back in job order before being concatenated, which keeps merge conflict
//! resolution independent of network timing.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use userdb_shared::{Result, User, UserDbError};
use userdb_sources::{Retriever, Source};

use crate::progress::Progress;

/// A source paired with its position in the job list.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub index: usize,
    pub source: Source,
}

/// What a worker sends back on the shared channel.
#[derive(Debug)]
struct JobResult {
    index: usize,
    result: Result<Vec<User>>,
}

/// Aborts still-running workers when the aggregator returns early.
struct Workers(Vec<JoinHandle<()>>);

impl Drop for Workers {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Number sources in the order given.
pub fn jobs(sources: Vec<Source>) -> Vec<FetchJob> {
    sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| FetchJob { index, source })
        .collect()
}

/// Fetch every source concurrently and return their records in job order.
///
/// The first fatal error, or a cancellation from the progress observer,
/// is returned immediately and the remaining workers are aborted.
#[instrument(skip_all, fields(jobs = sources.len()))]
pub async fn aggregate(
    retriever: &Retriever,
    sources: Vec<Source>,
    progress: &mut Progress<'_>,
) -> Result<Vec<User>> {
    let jobs = jobs(sources);
    let job_count = jobs.len();

    let (tx, mut rx) = mpsc::channel::<JobResult>(job_count.max(1));
    let mut workers = Workers(Vec::with_capacity(job_count));

    for job in jobs {
        let tx = tx.clone();
        let retriever = retriever.clone();
        workers.0.push(tokio::spawn(async move {
            let result = job.source.fetch(&retriever).await;
            // The receiver is gone only when the run already failed.
            let _ = tx
                .send(JobResult {
                    index: job.index,
                    result,
                })
                .await;
        }));
    }
    drop(tx);

    progress.start(job_count)?;

    let mut slots: Vec<Option<Vec<User>>> = (0..job_count).map(|_| None).collect();
    for _ in 0..job_count {
        let JobResult { index, result } = rx
            .recv()
            .await
            .ok_or_else(|| UserDbError::Worker("worker exited without a result".into()))?;

        let users = result?;
        debug!(index, users = users.len(), "fetch job finished");
        slots[index] = Some(users);

        progress.step()?;
    }

    let users: Vec<User> = slots.into_iter().flatten().flatten().collect();
    info!(jobs = job_count, users = users.len(), "all registries fetched");

    drop(workers);
    Ok(users)
}
