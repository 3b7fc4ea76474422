use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use super::{
    generate_record_id, Assignment, Collections, GradeResult, NewAssignment, NewSubmission,
    Submission,
};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Default)]
struct Records {
    assignments: Vec<Assignment>,
    submissions: Vec<Submission>,
}

/// Process-local collections. Used when no database is configured and by tests.
///
/// Records live in insertion-ordered vectors behind a single lock. The
/// `set_reachable` and `set_latency` switches let callers reproduce an
/// unreachable or slow backend.
#[derive(Debug)]
pub struct MemoryCollections {
    records: RwLock<Records>,
    reachable: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryCollections {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
            reachable: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Delay applied before every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn connect(&self) -> ServiceResult<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(ServiceError::StoreUnavailable(
                "in-memory store marked unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryCollections {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collections for MemoryCollections {
    async fn insert_assignment(
        &self,
        new: NewAssignment,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<Assignment> {
        self.connect().await?;
        let assignment = Assignment {
            id: generate_record_id("asg"),
            title: new.title,
            description: new.description,
            deadline: new.deadline,
            created_at,
        };
        self.records
            .write()
            .await
            .assignments
            .push(assignment.clone());
        Ok(assignment)
    }

    async fn list_assignments(&self) -> ServiceResult<Vec<Assignment>> {
        self.connect().await?;
        Ok(self.records.read().await.assignments.clone())
    }

    async fn find_assignment(&self, id: &str) -> ServiceResult<Option<Assignment>> {
        self.connect().await?;
        let records = self.records.read().await;
        Ok(records.assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_submission(
        &self,
        new: NewSubmission,
        timestamp: DateTime<Utc>,
    ) -> ServiceResult<Submission> {
        self.connect().await?;
        let submission = Submission {
            id: generate_record_id("sub"),
            assignment_id: new.assignment_id,
            student_id: new.student_id,
            student_name: new.student_name,
            code: new.code,
            timestamp,
            result: None,
        };
        self.records
            .write()
            .await
            .submissions
            .push(submission.clone());
        Ok(submission)
    }

    async fn find_submission(&self, id: &str) -> ServiceResult<Option<Submission>> {
        self.connect().await?;
        let records = self.records.read().await;
        Ok(records.submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn submissions_by_assignment(
        &self,
        assignment_id: &str,
    ) -> ServiceResult<Vec<Submission>> {
        self.connect().await?;
        let records = self.records.read().await;
        Ok(records
            .submissions
            .iter()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    async fn set_submission_result(
        &self,
        id: &str,
        result: GradeResult,
    ) -> ServiceResult<Option<Submission>> {
        self.connect().await?;
        let mut records = self.records.write().await;
        Ok(records
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
            .map(|submission| {
                submission.result = Some(result);
                submission.clone()
            }))
    }

    async fn delete_submission(&self, id: &str) -> ServiceResult<bool> {
        self.connect().await?;
        let mut records = self.records.write().await;
        match records.submissions.iter().position(|s| s.id == id) {
            Some(index) => {
                records.submissions.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_submission(assignment_id: &str, student_id: &str) -> NewSubmission {
        NewSubmission {
            assignment_id: assignment_id.to_string(),
            student_id: student_id.to_string(),
            student_name: "Student".to_string(),
            code: "int main(){}".to_string(),
        }
    }

    #[tokio::test]
    async fn result_update_touches_only_the_result_field() {
        let store = MemoryCollections::new();
        let created = store
            .insert_submission(new_submission("asg_1", "HE1"), Utc::now())
            .await
            .unwrap();

        let updated = store
            .set_submission_result(&created.id, GradeResult::Pass)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.result, Some(GradeResult::Pass));
        assert_eq!(
            Submission {
                result: None,
                ..updated
            },
            created
        );
    }

    #[tokio::test]
    async fn unknown_ids_report_absence() {
        let store = MemoryCollections::new();
        assert!(store
            .set_submission_result("missing", GradeResult::Fail)
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_submission("missing").await.unwrap());
        assert!(store.find_assignment("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_store_fails_every_call() {
        let store = MemoryCollections::new();
        store.set_reachable(false);
        let err = store.list_assignments().await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));

        store.set_reachable(true);
        assert!(store.list_assignments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_keeps_remaining_order() {
        let store = MemoryCollections::new();
        let mut ids = Vec::new();
        for student in ["A", "B", "C"] {
            let s = store
                .insert_submission(new_submission("asg_1", student), Utc::now())
                .await
                .unwrap();
            ids.push(s.id);
        }
        assert!(store.delete_submission(&ids[1]).await.unwrap());

        let remaining: Vec<String> = store
            .submissions_by_assignment("asg_1")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone()]);
    }
}
