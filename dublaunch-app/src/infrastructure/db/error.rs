use dublaunch_errors::AppError;
use sea_orm::{DbErr, SqlErr};

/// Classifies a database error once, at the store boundary.
pub fn map_db_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::ConflictRetryable(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => AppError::NotFound(detail),
        _ => match err {
            DbErr::RecordNotFound(what) => AppError::NotFound(what),
            DbErr::Custom(msg) | DbErr::Type(msg) | DbErr::Json(msg) => AppError::Internal(msg),
            other => {
                tracing::warn!("Storage error: {}", other);
                AppError::StorageUnavailable(other.to_string())
            }
        },
    }
}
