//! Persistence traits and their PostgreSQL implementations

pub mod appointment;
pub mod hospital;
pub mod user;

pub use appointment::{AppointmentRepository, AppointmentRepositoryImpl};
pub use hospital::{HospitalRepository, HospitalRepositoryImpl};
pub use user::{UserRepository, UserRepositoryImpl};

use crate::error::AppError;

const UNIQUE_VIOLATION: &str = "23505";

/// Turn a PostgreSQL unique-constraint failure into `AppError::Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = conflict_on_unique(sqlx::Error::RowNotFound, "dup");
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));
    }
}
