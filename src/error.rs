use serde::Serialize;

/// Failure categories surfaced to every caller of the service.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A required field was missing or blank, or a reference did not resolve.
    #[error("invalid `{field}`: {message}")]
    Validation { field: &'static str, message: String },
    /// The operation targeted an id the store does not know.
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    /// The persistence layer failed, was unreachable, or did not answer in time.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    StoreUnavailable,
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for ServiceError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ServiceError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::StoreUnavailable("timed out waiting for the store".to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Rejects empty or whitespace-only input for a required field.
pub fn require(field: &'static str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(require("title", "Sum").is_ok());
        assert_eq!(
            require("title", "   \n").unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert!(require("code", "").is_err());
    }

    #[test]
    fn display_names_the_target() {
        let err = ServiceError::not_found("submission", "sub_1");
        assert_eq!(err.to_string(), "submission `sub_1` not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
