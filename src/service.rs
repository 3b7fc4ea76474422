use std::sync::Arc;
use std::time::Duration;

use crate::assignments::AssignmentStore;
use crate::config::Config;
use crate::db::{
    self, Assignment, GradeResult, MemoryCollections, NewAssignment, NewSubmission,
    PgCollections, SharedCollections, Submission,
};
use crate::error::ServiceResult;
use crate::grading::{DeleteIntent, GradingWorkflow};
use crate::selection::SelectionTracker;
use crate::submissions::SubmissionStore;

/// The operation surface offered to presentation layers.
///
/// Every method returns either the resulting value or a typed
/// [`ServiceError`](crate::error::ServiceError); callers re-render from the
/// returned value instead of re-fetching.
pub struct ClassroomService {
    assignments: AssignmentStore,
    submissions: Arc<SubmissionStore>,
    grading: GradingWorkflow,
}

impl ClassroomService {
    pub fn new(collections: SharedCollections, store_timeout: Duration) -> Self {
        let submissions = Arc::new(SubmissionStore::new(collections.clone(), store_timeout));
        Self {
            assignments: AssignmentStore::new(collections, store_timeout),
            grading: GradingWorkflow::new(submissions.clone()),
            submissions,
        }
    }

    pub fn in_memory(store_timeout: Duration) -> Self {
        Self::new(Arc::new(MemoryCollections::new()), store_timeout)
    }

    /// Postgres when `DATABASE_URL` is set, in-memory collections otherwise.
    pub async fn from_config(config: &Config) -> ServiceResult<Self> {
        match config.database_url.as_deref() {
            Some(url) => {
                let pool = db::create_pool(url, config.max_connections).await?;
                db::run_migrations(pool.as_ref()).await?;
                tracing::info!(max_connections = config.max_connections, "using postgres store");
                Ok(Self::new(Arc::new(PgCollections::new(pool)), config.store_timeout))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; records are kept in memory only");
                Ok(Self::in_memory(config.store_timeout))
            }
        }
    }

    pub async fn create_assignment(&self, new: NewAssignment) -> ServiceResult<Assignment> {
        self.assignments.create(new).await
    }

    pub async fn list_assignments(&self) -> ServiceResult<Vec<Assignment>> {
        self.assignments.list().await
    }

    pub async fn get_assignment(&self, assignment_id: &str) -> ServiceResult<Assignment> {
        self.assignments.get(assignment_id).await
    }

    pub async fn create_submission(&self, new: NewSubmission) -> ServiceResult<Submission> {
        self.submissions.create(&self.assignments, new).await
    }

    pub async fn query_submissions_by_assignment(
        &self,
        assignment_id: &str,
    ) -> ServiceResult<Vec<Submission>> {
        self.submissions.query_by_assignment(assignment_id).await
    }

    pub async fn get_submission(&self, submission_id: &str) -> ServiceResult<Submission> {
        self.submissions.get(submission_id).await
    }

    pub async fn mark_submission(
        &self,
        submission_id: &str,
        result: GradeResult,
    ) -> ServiceResult<Submission> {
        self.grading.mark(submission_id, result).await
    }

    pub async fn request_delete_submission(&self, submission_id: &str) -> ServiceResult<DeleteIntent> {
        self.grading.request_delete(submission_id).await
    }

    pub async fn confirm_delete_submission(&self, submission_id: &str) -> ServiceResult<()> {
        self.grading.confirm_delete(submission_id).await
    }

    /// Selects `assignment_id` on `tracker` and loads its submissions.
    ///
    /// Resolves to `Ok(None)` when another selection was made on the same
    /// tracker while the query was in flight; a superseded failure is
    /// dropped the same way.
    pub async fn load_selection(
        &self,
        tracker: &SelectionTracker,
        assignment_id: &str,
    ) -> ServiceResult<Option<Vec<Submission>>> {
        let ticket = tracker.select(assignment_id);
        let outcome = self
            .submissions
            .query_by_assignment(ticket.assignment_id())
            .await;
        match tracker.accept(&ticket, outcome) {
            Some(outcome) => outcome.map(Some),
            None => Ok(None),
        }
    }
}
