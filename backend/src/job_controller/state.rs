//! Shared state for long-running background jobs.
//!
//! Geocode reprocessing walks every incomplete contact and can take minutes,
//! so it runs detached from the request cycle: the start endpoint hands back
//! a job id and the client polls `/api/geocode/status/{job_id}`.
//!
//! Workers never write the jobs map directly. They push `JobUpdate` messages
//! through an MPSC channel and `start_job_updater` folds them into the map,
//! keeping progress reporting decoupled from job logic.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Thread-safe container for the status of all background jobs, shared
/// through the Actix application state.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status. Concurrent reads from status polling,
    /// exclusive writes from the updater task only.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Sender half handed to background workers for progress reporting.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        }
    }

    /// Reports a status change for a job. A closed channel means the updater
    /// task died; the error goes to the worker's log, not the client.
    pub async fn report(&self, job_id: &str, status: JobStatus) {
        let update = JobUpdate {
            job_id: job_id.to_string(),
            status,
        };
        if let Err(e) = self.tx.send(update).await {
            log::error!("job updater channel closed: {e}");
        }
    }
}

/// One status change for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Central updater loop. Spawned once at startup; exits when every sender is
/// dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id.clone(), update.status);
    }
}
