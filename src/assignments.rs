use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

use crate::db::{self, Assignment, NewAssignment, SharedCollections};
use crate::error::{require, ServiceError, ServiceResult};

/// Creates and lists assignments. Assignments are write-once.
pub struct AssignmentStore {
    collections: SharedCollections,
    timeout: Duration,
    last_created_at: Mutex<Option<DateTime<Utc>>>,
}

impl AssignmentStore {
    pub fn new(collections: SharedCollections, timeout: Duration) -> Self {
        Self {
            collections,
            timeout,
            last_created_at: Mutex::new(None),
        }
    }

    /// Persists a new assignment. `title` and `description` are stored verbatim.
    pub async fn create(&self, new: NewAssignment) -> ServiceResult<Assignment> {
        require("title", &new.title)?;
        require("description", &new.description)?;

        let created_at = self.next_created_at();
        let assignment = db::within(
            self.timeout,
            "assignments.create",
            self.collections.insert_assignment(new, created_at),
        )
        .await?;

        tracing::info!(assignment_id = %assignment.id, title = %assignment.title, "assignment created");
        Ok(assignment)
    }

    /// All assignments in insertion order.
    pub async fn list(&self) -> ServiceResult<Vec<Assignment>> {
        let assignments = db::within(
            self.timeout,
            "assignments.list",
            self.collections.list_assignments(),
        )
        .await?;
        tracing::debug!(count = assignments.len(), "assignments listed");
        Ok(assignments)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Assignment> {
        db::within(
            self.timeout,
            "assignments.get",
            self.collections.find_assignment(id),
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("assignment", id))
    }

    pub async fn exists(&self, id: &str) -> ServiceResult<bool> {
        match self.get(id).await {
            Ok(_) => Ok(true),
            Err(ServiceError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let mut last = self
            .last_created_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        advance(&mut *last, Utc::now())
    }
}

/// Never hands out a timestamp earlier than the previous one, even if the
/// wall clock steps back.
fn advance(last: &mut Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let stamp = match *last {
        Some(prev) if prev > now => prev,
        _ => now,
    };
    *last = Some(stamp);
    stamp
}
