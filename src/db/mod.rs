mod ids;
mod memory;
mod models;
mod postgres;

pub use ids::generate_record_id;
pub use memory::MemoryCollections;
pub use models::*;
pub use postgres::PgCollections;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ServiceResult;

pub type DbPool = Arc<PgPool>;
pub type SharedCollections = Arc<dyn Collections>;

/// The two persistent collections behind the service.
///
/// Implementations generate record ids on insert, keep insertion order for
/// listings, and report every backend failure as
/// [`ServiceError::StoreUnavailable`](crate::error::ServiceError::StoreUnavailable).
/// Inputs reach this layer already validated and normalized.
#[async_trait]
pub trait Collections: Send + Sync {
    async fn insert_assignment(
        &self,
        new: NewAssignment,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<Assignment>;

    async fn list_assignments(&self) -> ServiceResult<Vec<Assignment>>;

    async fn find_assignment(&self, id: &str) -> ServiceResult<Option<Assignment>>;

    async fn insert_submission(
        &self,
        new: NewSubmission,
        timestamp: DateTime<Utc>,
    ) -> ServiceResult<Submission>;

    async fn find_submission(&self, id: &str) -> ServiceResult<Option<Submission>>;

    async fn submissions_by_assignment(&self, assignment_id: &str)
        -> ServiceResult<Vec<Submission>>;

    /// Merges `result` into the stored record and returns it, `None` for unknown ids.
    async fn set_submission_result(
        &self,
        id: &str,
        result: GradeResult,
    ) -> ServiceResult<Option<Submission>>;

    /// Returns `false` when no record had this id.
    async fn delete_submission(&self, id: &str) -> ServiceResult<bool>;
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Runs one store call under `limit`, turning expiry into `StoreUnavailable`.
pub(crate) async fn within<T, F>(limit: Duration, op: &'static str, call: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::warn!(op, error = %err, "store call failed");
            Err(err)
        }
        Err(elapsed) => {
            tracing::error!(op, limit_ms = limit.as_millis() as u64, "store call timed out");
            Err(elapsed.into())
        }
    }
}
