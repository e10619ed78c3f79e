use restrooms::database::DatabaseError;
use sqlx::error::ErrorKind;

pub mod restroom;

pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Database(db)
            if matches!(
                db.kind(),
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation
            ) =>
        {
            DatabaseError::ConstraintViolation(db.message().to_owned())
        }
        _ => DatabaseError::Other(Box::new(why)),
    }
}
