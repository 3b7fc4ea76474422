use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{
    generate_record_id, Assignment, Collections, DbPool, GradeResult, NewAssignment,
    NewSubmission, Submission,
};
use crate::error::{ServiceError, ServiceResult};

const SUBMISSION_COLUMNS: &str =
    "id, assignment_id, student_id, student_name, code, submitted_at, result";

#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: String,
    assignment_id: String,
    student_id: String,
    student_name: String,
    code: String,
    submitted_at: DateTime<Utc>,
    result: Option<String>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = ServiceError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let result = row
            .result
            .as_deref()
            .map(str::parse::<GradeResult>)
            .transpose()
            .map_err(|e| ServiceError::StoreUnavailable(format!("corrupt row `{}`: {e}", row.id)))?;

        Ok(Submission {
            id: row.id,
            assignment_id: row.assignment_id,
            student_id: row.student_id,
            student_name: row.student_name,
            code: row.code,
            timestamp: row.submitted_at,
            result,
        })
    }
}

/// Collections backed by the `assignments` and `submissions` tables.
#[derive(Clone)]
pub struct PgCollections {
    pool: DbPool,
}

impl PgCollections {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Collections for PgCollections {
    async fn insert_assignment(
        &self,
        new: NewAssignment,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<Assignment> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (id, title, description, deadline, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, deadline, created_at
            "#,
        )
        .bind(generate_record_id("asg"))
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.deadline)
        .bind(created_at)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(assignment)
    }

    async fn list_assignments(&self) -> ServiceResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, Assignment>(
            "SELECT id, title, description, deadline, created_at FROM assignments ORDER BY seq",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(rows)
    }

    async fn find_assignment(&self, id: &str) -> ServiceResult<Option<Assignment>> {
        let row = sqlx::query_as::<_, Assignment>(
            "SELECT id, title, description, deadline, created_at FROM assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(row)
    }

    async fn insert_submission(
        &self,
        new: NewSubmission,
        timestamp: DateTime<Utc>,
    ) -> ServiceResult<Submission> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            INSERT INTO submissions (id, assignment_id, student_id, student_name, code, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(generate_record_id("sub"))
        .bind(&new.assignment_id)
        .bind(&new.student_id)
        .bind(&new.student_name)
        .bind(&new.code)
        .bind(timestamp)
        .fetch_one(self.pool.as_ref())
        .await?;
        row.try_into()
    }

    async fn find_submission(&self, id: &str) -> ServiceResult<Option<Submission>> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .map(Submission::try_from)
        .transpose()
    }

    async fn submissions_by_assignment(
        &self,
        assignment_id: &str,
    ) -> ServiceResult<Vec<Submission>> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = $1 ORDER BY seq"
        ))
        .bind(assignment_id)
        .fetch_all(self.pool.as_ref())
        .await?
        .into_iter()
        .map(Submission::try_from)
        .collect()
    }

    async fn set_submission_result(
        &self,
        id: &str,
        result: GradeResult,
    ) -> ServiceResult<Option<Submission>> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "UPDATE submissions SET result = $2 WHERE id = $1 RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(id)
        .bind(result.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?
        .map(Submission::try_from)
        .transpose()
    }

    async fn delete_submission(&self, id: &str) -> ServiceResult<bool> {
        let done = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
