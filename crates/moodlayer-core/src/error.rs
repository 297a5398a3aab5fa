use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown mood field: {0}")]
    UnknownField(String),

    #[error("rating for {field} must be between 1 and 5, got {value}")]
    RatingOutOfRange { field: String, value: i64 },

    #[error("rating for {field} must be a whole number, got {value}")]
    NotAWholeNumber { field: String, value: String },
}
