//! Background warming of the cache for the grades the user did not ask for.
//!
//! After a text is simplified for one grade, a precompute job walks the other
//! grades in [`Grade::ALL`] order and asks the remote for each one that is not
//! cached yet. Remote calls are paced so the job stays in the background.
//! Cancellation is cooperative: the token is checked before each grade and
//! raced against the pacing wait, never against an in-flight call.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use focusflow_protocols::{CacheKey, Grade};

use crate::coordinator::Coordinator;

#[cfg(test)]
#[path = "precompute_tests.rs"]
mod tests;

/// What a precompute job did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecomputeReport {
    /// Remote calls made.
    pub attempted: usize,
    /// Remote calls whose result was stored.
    pub cached: usize,
    /// Grades already present in the cache.
    pub skipped: usize,
    /// Remote calls that failed.
    pub failed: usize,
    /// Whether the job stopped early.
    pub cancelled: bool,
}

/// Handle to a running precompute job.
pub struct PrecomputeHandle {
    id: Uuid,
    page_id: String,
    token: CancellationToken,
    task: JoinHandle<PrecomputeReport>,
}

impl PrecomputeHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Ask the job to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the job to finish.
    pub async fn join(self) -> Result<PrecomputeReport, JoinError> {
        self.task.await
    }
}

impl std::fmt::Debug for PrecomputeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrecomputeHandle")
            .field("id", &self.id)
            .field("page_id", &self.page_id)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

pub(crate) fn spawn(
    coordinator: Coordinator,
    text: String,
    completed_grade: Grade,
    page_id: String,
) -> PrecomputeHandle {
    let id = Uuid::new_v4();
    let token = CancellationToken::new();

    let span = tracing::info_span!(
        "precompute",
        job_id = %id,
        page_id = %page_id,
        completed_grade = %completed_grade,
    );
    debug!(job_id = %id, page_id = %page_id, "Spawning precompute job");

    let task = tokio::spawn(
        run(coordinator, text, completed_grade, page_id.clone(), token.clone()).instrument(span),
    );

    PrecomputeHandle {
        id,
        page_id,
        token,
        task,
    }
}

async fn run(
    coordinator: Coordinator,
    text: String,
    completed_grade: Grade,
    page_id: String,
    token: CancellationToken,
) -> PrecomputeReport {
    let grades = completed_grade.others();
    let pacing = coordinator.options().precompute_pacing;
    let mut report = PrecomputeReport::default();

    for (position, grade) in grades.iter().copied().enumerate() {
        if token.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let key = CacheKey::new(&text, grade);
        if coordinator.is_cached(&key).await {
            debug!(grade = %grade, "Already cached, skipping");
            report.skipped += 1;
            continue;
        }

        report.attempted += 1;
        match coordinator.remote().simplify_one(&text, grade, &page_id).await {
            Ok(simplified) => {
                if coordinator.store(&key, &simplified).await {
                    report.cached += 1;
                }
                debug!(grade = %grade, "Precomputed");
            }
            Err(e) => {
                warn!(grade = %grade, error = %e, "Precompute failed for grade");
                report.failed += 1;
            }
        }

        // Pace only when another remote call is still ahead.
        if any_uncached(&coordinator, &text, &grades[position + 1..]).await {
            tokio::select! {
                _ = token.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(pacing) => {}
            }
        }
    }

    info!(
        attempted = report.attempted,
        cached = report.cached,
        skipped = report.skipped,
        failed = report.failed,
        cancelled = report.cancelled,
        "Precompute job finished"
    );
    report
}

async fn any_uncached(coordinator: &Coordinator, text: &str, grades: &[Grade]) -> bool {
    for grade in grades {
        if !coordinator.is_cached(&CacheKey::new(text, *grade)).await {
            return true;
        }
    }
    false
}

/// At most one live precompute job per page.
#[derive(Clone, Default)]
pub struct PrecomputeRegistry {
    jobs: Arc<DashMap<String, PrecomputeHandle>>,
}

impl PrecomputeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `handle` as its page's job, cancelling and returning the previous one.
    pub fn replace(&self, handle: PrecomputeHandle) -> Option<PrecomputeHandle> {
        self.jobs.retain(|_, job| !job.is_finished());

        let previous = self.jobs.insert(handle.page_id().to_string(), handle);
        if let Some(previous) = &previous {
            debug!(
                page_id = %previous.page_id(),
                job_id = %previous.id(),
                "Cancelling superseded precompute job"
            );
            previous.cancel();
        }
        previous
    }

    /// Id of the job tracked for `page_id`, if any.
    pub fn job_id(&self, page_id: &str) -> Option<Uuid> {
        self.jobs.get(page_id).map(|job| job.id())
    }

    /// Stop tracking `page_id` and hand its job to the caller, still running.
    pub fn take(&self, page_id: &str) -> Option<PrecomputeHandle> {
        self.jobs.remove(page_id).map(|(_, job)| job)
    }

    /// Stop tracking `page_id`, cancelling its job.
    pub fn cancel(&self, page_id: &str) -> bool {
        match self.jobs.remove(page_id) {
            Some((_, job)) => {
                job.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for job in self.jobs.iter() {
            job.cancel();
        }
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
