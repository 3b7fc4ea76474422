use chrono::Utc;
use std::time::Duration;

use crate::assignments::AssignmentStore;
use crate::db::{self, GradeResult, NewSubmission, SharedCollections, Submission};
use crate::error::{require, ServiceError, ServiceResult};

/// Submission records: create, filter by assignment, grade and delete.
pub struct SubmissionStore {
    collections: SharedCollections,
    timeout: Duration,
}

impl SubmissionStore {
    pub fn new(collections: SharedCollections, timeout: Duration) -> Self {
        Self {
            collections,
            timeout,
        }
    }

    /// Validates and persists a new, ungraded submission.
    ///
    /// `student_id` is stored uppercase. The referenced assignment must exist;
    /// a dangling `assignment_id` is a validation failure.
    pub async fn create(
        &self,
        assignments: &AssignmentStore,
        mut new: NewSubmission,
    ) -> ServiceResult<Submission> {
        require("assignmentId", &new.assignment_id)?;
        require("studentId", &new.student_id)?;
        require("studentName", &new.student_name)?;
        require("code", &new.code)?;

        if !assignments.exists(&new.assignment_id).await? {
            return Err(ServiceError::validation(
                "assignmentId",
                format!("assignment `{}` does not exist", new.assignment_id),
            ));
        }

        new.student_id = new.student_id.to_uppercase();

        let submission = db::within(
            self.timeout,
            "submissions.create",
            self.collections.insert_submission(new, Utc::now()),
        )
        .await?;

        tracing::info!(
            submission_id = %submission.id,
            assignment_id = %submission.assignment_id,
            student_id = %submission.student_id,
            "submission created"
        );
        Ok(submission)
    }

    /// Every submission for `assignment_id`, in insertion order.
    ///
    /// Empty or unknown ids yield an empty list, never an error.
    pub async fn query_by_assignment(&self, assignment_id: &str) -> ServiceResult<Vec<Submission>> {
        if assignment_id.trim().is_empty() {
            return Ok(Vec::new());
        }
        let submissions = db::within(
            self.timeout,
            "submissions.query_by_assignment",
            self.collections.submissions_by_assignment(assignment_id),
        )
        .await?;
        tracing::debug!(assignment_id, count = submissions.len(), "submissions queried");
        Ok(submissions)
    }

    pub async fn get(&self, submission_id: &str) -> ServiceResult<Submission> {
        db::within(
            self.timeout,
            "submissions.get",
            self.collections.find_submission(submission_id),
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("submission", submission_id))
    }

    /// Sets the grading result and returns the updated record.
    ///
    /// Re-applying the current result issues no write. There is no conflict
    /// detection: two sessions grading the same submission concurrently
    /// resolve last-write-wins.
    pub async fn update_result(
        &self,
        submission_id: &str,
        result: GradeResult,
    ) -> ServiceResult<Submission> {
        let current = self.get(submission_id).await?;
        if current.result == Some(result) {
            tracing::debug!(submission_id, %result, "result unchanged");
            return Ok(current);
        }

        let updated = db::within(
            self.timeout,
            "submissions.update_result",
            self.collections.set_submission_result(submission_id, result),
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("submission", submission_id))?;

        tracing::info!(
            submission_id,
            from = current.result.map(|r| r.as_str()).unwrap_or("ungraded"),
            to = %result,
            "submission graded"
        );
        Ok(updated)
    }

    /// Permanently removes a submission.
    pub async fn delete(&self, submission_id: &str) -> ServiceResult<()> {
        let removed = db::within(
            self.timeout,
            "submissions.delete",
            self.collections.delete_submission(submission_id),
        )
        .await?;
        if !removed {
            return Err(ServiceError::not_found("submission", submission_id));
        }
        tracing::info!(submission_id, "submission deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryCollections, NewAssignment};
    use crate::error::ErrorKind;
    use std::sync::Arc;

    struct Fixture {
        collections: Arc<MemoryCollections>,
        assignments: AssignmentStore,
        submissions: SubmissionStore,
    }

    fn fixture() -> Fixture {
        let collections = Arc::new(MemoryCollections::new());
        let timeout = Duration::from_secs(1);
        Fixture {
            assignments: AssignmentStore::new(collections.clone(), timeout),
            submissions: SubmissionStore::new(collections.clone(), timeout),
            collections,
        }
    }

    async fn assignment(fx: &Fixture, title: &str) -> String {
        fx.assignments
            .create(NewAssignment {
                title: title.to_string(),
                description: "desc".to_string(),
                deadline: None,
            })
            .await
            .unwrap()
            .id
    }

    fn new_submission(assignment_id: &str, student_id: &str) -> NewSubmission {
        NewSubmission {
            assignment_id: assignment_id.to_string(),
            student_id: student_id.to_string(),
            student_name: "Nguyen Van A".to_string(),
            code: "int main(){return 0;}".to_string(),
        }
    }

    #[tokio::test]
    async fn student_id_is_uppercased_and_result_starts_ungraded() {
        let fx = fixture();
        let a1 = assignment(&fx, "A1").await;
        let created = fx
            .submissions
            .create(&fx.assignments, new_submission(&a1, "he000111"))
            .await
            .unwrap();
        assert_eq!(created.student_id, "HE000111");
        assert_eq!(created.result, None);
        assert_eq!(fx.submissions.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let fx = fixture();
        let a1 = assignment(&fx, "A1").await;

        let mut blank_code = new_submission(&a1, "he1");
        blank_code.code = "   ".to_string();
        let err = fx
            .submissions
            .create(&fx.assignments, blank_code)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "code", .. }));

        let err = fx
            .submissions
            .create(&fx.assignments, new_submission("", "he1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "assignmentId", .. }));

        assert!(fx.submissions.query_by_assignment(&a1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dangling_assignment_reference_is_rejected() {
        let fx = fixture();
        let err = fx
            .submissions
            .create(&fx.assignments, new_submission("asg_nope", "he1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "assignmentId", .. }));
    }

    #[tokio::test]
    async fn query_filters_interleaved_submissions() {
        let fx = fixture();
        let a1 = assignment(&fx, "A1").await;
        let a2 = assignment(&fx, "A2").await;

        let mut expected_a1 = Vec::new();
        for (i, target) in [&a1, &a2, &a1, &a2, &a2, &a1].into_iter().enumerate() {
            let s = fx
                .submissions
                .create(&fx.assignments, new_submission(target, &format!("he{i}")))
                .await
                .unwrap();
            if *target == a1 {
                expected_a1.push(s.id);
            }
        }

        let got: Vec<String> = fx
            .submissions
            .query_by_assignment(&a1)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(got, expected_a1);
        assert_eq!(fx.submissions.query_by_assignment(&a2).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_or_unknown_assignment_yields_empty_list() {
        let fx = fixture();
        fx.collections.set_reachable(false);
        assert!(fx.submissions.query_by_assignment("").await.unwrap().is_empty());

        fx.collections.set_reachable(true);
        assert!(fx
            .submissions
            .query_by_assignment("asg_unknown")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn update_result_is_idempotent() {
        let fx = fixture();
        let a1 = assignment(&fx, "A1").await;
        let s = fx
            .submissions
            .create(&fx.assignments, new_submission(&a1, "he1"))
            .await
            .unwrap();

        let once = fx.submissions.update_result(&s.id, GradeResult::Pass).await.unwrap();
        let twice = fx.submissions.update_result(&s.id, GradeResult::Pass).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(fx.submissions.get(&s.id).await.unwrap(), once);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_are_not_found() {
        let fx = fixture();
        let err = fx
            .submissions
            .update_result("sub_missing", GradeResult::Fail)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = fx.submissions.delete("sub_missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_removes_from_query() {
        let fx = fixture();
        let a1 = assignment(&fx, "A1").await;
        let keep = fx
            .submissions
            .create(&fx.assignments, new_submission(&a1, "he1"))
            .await
            .unwrap();
        let gone = fx
            .submissions
            .create(&fx.assignments, new_submission(&a1, "he2"))
            .await
            .unwrap();

        fx.submissions.delete(&gone.id).await.unwrap();

        let remaining = fx.submissions.query_by_assignment(&a1).await.unwrap();
        assert_eq!(remaining, vec![keep]);
        let err = fx.submissions.delete(&gone.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
