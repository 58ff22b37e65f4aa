//! Decision response composition: deterministic corrections merged with the
//! reasoning model's interpretation into one uniformly shaped response.

pub mod composer;
pub mod parser;
pub mod types;

pub use composer::*;
pub use parser::*;
pub use types::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompositionError {
    #[error("Reasoning reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Reasoning reply is not a JSON object")]
    NotAnObject,
}
