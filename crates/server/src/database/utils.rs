use sqlx::error::ErrorKind;

use crate::error::{RequestError, ValidationError};

pub fn map_not_found_as_none<T>(result: Result<T, sqlx::Error>) -> Result<Option<T>, sqlx::Error> {
    match result {
        Ok(ok) => Ok(Some(ok)),
        Err(e) => {
            if matches!(e, sqlx::Error::RowNotFound) {
                Ok(None)
            } else {
                Err(e)
            }
        }
    }
}

/// Turns constraint violations caused by client input into validation errors.
pub fn map_constraint_violation(e: sqlx::Error) -> RequestError {
    match e.as_database_error().map(|db| db.kind()) {
        Some(ErrorKind::UniqueViolation) => ValidationError::AlreadyExists.into(),
        Some(ErrorKind::ForeignKeyViolation) => ValidationError::NotFound.into(),
        _ => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_becomes_none() {
        assert_eq!(map_not_found_as_none(Ok(3)).unwrap(), Some(3));
        assert_eq!(
            map_not_found_as_none::<i32>(Err(sqlx::Error::RowNotFound)).unwrap(),
            None
        );
        assert!(map_not_found_as_none::<i32>(Err(sqlx::Error::PoolClosed)).is_err());
    }

    #[test]
    fn non_database_errors_pass_through() {
        assert!(matches!(
            map_constraint_violation(sqlx::Error::PoolTimedOut),
            RequestError::Sqlx(sqlx::Error::PoolTimedOut)
        ));
    }
}
