pub mod form;
pub mod request;

pub use form::*;
pub use request::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Blood-gas report contains no usable value")]
    EmptyReport,

    #[error("Field {field} is not valid JSON: {reason}")]
    MalformedJson { field: &'static str, reason: String },

    #[error("Field {field} must be a JSON object")]
    NotAnObject { field: &'static str },

    #[error("{field} value {value} outside accepted range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a number")]
    NotNumeric { field: &'static str },

    #[error("{field} was given more than once with different values")]
    ConflictingValues { field: &'static str },
}
