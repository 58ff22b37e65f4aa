pub mod alert;
pub mod analysis;
pub mod anesthesia;
pub mod blood_gas;
pub mod enums;
pub mod form_value;
pub mod patient;
pub mod vital_sign;

pub use alert::*;
pub use analysis::*;
pub use anesthesia::*;
pub use blood_gas::*;
pub use enums::*;
pub use form_value::*;
pub use patient::*;
pub use vital_sign::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
