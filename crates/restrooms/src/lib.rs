use std::{error::Error, io};

use model::validation::ValidationErrors;
use thiserror::Error;

pub mod client;
pub mod database;
pub mod images;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("the requested restroom does not exist")]
    NotFound,

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("rejected by the database: {0}")]
    ConstraintViolation(String),

    #[error("file operation failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::ConstraintViolation(why) => {
                Self::ConstraintViolation(why)
            }
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

impl From<images::ImageError> for RequestError {
    fn from(value: images::ImageError) -> Self {
        match value {
            images::ImageError::InvalidFilename(why) => Self::Validation(why.into()),
            images::ImageError::Io(why) => Self::Io(why),
        }
    }
}

pub type RequestResult<O> = Result<O, RequestError>;

pub fn not_found_to_none<O>(result: RequestResult<O>) -> RequestResult<Option<O>> {
    if let Err(RequestError::NotFound) = result {
        Ok(None)
    } else {
        result.map(Some)
    }
}
