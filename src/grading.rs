use serde::Serialize;
use std::sync::Arc;

use crate::db::{GradeResult, Submission};
use crate::error::ServiceResult;
use crate::submissions::SubmissionStore;

/// Where a submission sits in the grading state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeState {
    Ungraded,
    Pass,
    Fail,
}

impl GradeState {
    pub fn of(submission: &Submission) -> Self {
        submission.result.into()
    }

    /// Any state may move to `Pass` or `Fail`, including itself.
    /// Nothing moves back to `Ungraded`.
    pub fn can_transition_to(self, next: GradeState) -> bool {
        next != GradeState::Ungraded
    }
}

impl From<Option<GradeResult>> for GradeState {
    fn from(result: Option<GradeResult>) -> Self {
        match result {
            None => Self::Ungraded,
            Some(GradeResult::Pass) => Self::Pass,
            Some(GradeResult::Fail) => Self::Fail,
        }
    }
}

/// What a confirmed delete would destroy, for the caller's confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIntent {
    pub submission_id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub state: GradeState,
}

impl From<&Submission> for DeleteIntent {
    fn from(submission: &Submission) -> Self {
        Self {
            submission_id: submission.id.clone(),
            assignment_id: submission.assignment_id.clone(),
            student_id: submission.student_id.clone(),
            student_name: submission.student_name.clone(),
            state: GradeState::of(submission),
        }
    }
}

/// Grades submissions and runs the two-step delete.
#[derive(Clone)]
pub struct GradingWorkflow {
    submissions: Arc<SubmissionStore>,
}

impl GradingWorkflow {
    pub fn new(submissions: Arc<SubmissionStore>) -> Self {
        Self { submissions }
    }

    /// Applies `result` and returns the updated submission so callers can
    /// replace their copy without re-querying.
    ///
    /// Only `Pass` and `Fail` can be requested, so every call is a permitted
    /// transition.
    pub async fn mark(&self, submission_id: &str, result: GradeResult) -> ServiceResult<Submission> {
        self.submissions.update_result(submission_id, result).await
    }

    /// First step of a delete: checks the submission exists and describes it.
    /// Nothing is mutated.
    pub async fn request_delete(&self, submission_id: &str) -> ServiceResult<DeleteIntent> {
        let submission = self.submissions.get(submission_id).await?;
        tracing::debug!(submission_id, "delete requested");
        Ok(DeleteIntent::from(&submission))
    }

    /// Second step of a delete. Callers gate this behind explicit confirmation.
    pub async fn confirm_delete(&self, submission_id: &str) -> ServiceResult<()> {
        self.submissions.delete(submission_id).await
    }
}
