use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    Internal(Option<String>),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(Some(message.into()))
    }

    /// Stable error class for the request layer to map onto its own
    /// status codes. The engine itself never speaks HTTP.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::DatabaseError(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Validation,
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        // Unique-constraint violations are how racing duplicate creates
        // surface; they are conflicts, not server faults.
        if let sqlx::Error::Database(ref db_err) = error {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("duplicate record: {}", db_err.message()));
            }
        }
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Repositories return anyhow; recover the sqlx error when there
        // is one so unique violations still map to Conflict.
        match error.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => AppError::from(sqlx_err),
            Err(original_error) => {
                log::error!("Internal error: {}", original_error);
                AppError::Internal(Some(original_error.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AppError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(AppError::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(AppError::forbidden("x").kind(), ErrorKind::Forbidden);
        assert_eq!(AppError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(AppError::internal("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn anyhow_without_sqlx_maps_to_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
