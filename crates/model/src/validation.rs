use std::{fmt, ops::RangeInclusive};

use thiserror::Error;

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;

/// A single field that failed to validate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("'{value}' is not a usable file name")]
    InvalidFilename { value: String },
}

impl ValidationError {
    /// The input field the failure belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Empty { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidNumber { field, .. } => field,
            Self::InvalidFilename { .. } => "image_file",
        }
    }
}

/// All field failures of one decode, so a client sees every problem at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Records the error of `result`, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(why) = result {
            self.push(why);
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(value: ValidationError) -> Self {
        Self(vec![value])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self
            .0
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" });
    }
    Ok(())
}

pub fn check_latitude(latitude: f64) -> Result<(), ValidationError> {
    check_range("latitude", latitude, LATITUDE_RANGE)
}

pub fn check_longitude(longitude: f64) -> Result<(), ValidationError> {
    check_range("longitude", longitude, LONGITUDE_RANGE)
}

pub fn check_rating(rating: i32) -> Result<(), ValidationError> {
    check_range(
        "rating",
        rating as f64,
        *RATING_RANGE.start() as f64..=*RATING_RANGE.end() as f64,
    )
}

// NaN is never contained in a range, so it is rejected as well.
fn check_range(
    field: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        })
    }
}
