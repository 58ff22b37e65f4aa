pub mod confidence;
pub mod upload;
pub mod normalize;
pub mod vision_ocr;

pub use confidence::*;
pub use upload::*;
pub use normalize::*;
pub use vision_ocr::*;

use thiserror::Error;

use crate::pipeline::structuring::StructuringError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No image was uploaded")]
    EmptyUpload,

    #[error("Image is {size} bytes, larger than the {max} byte limit")]
    Oversize { size: usize, max: usize },

    #[error("Unsupported image format (only JPEG and PNG are accepted)")]
    UnsupportedFormat,

    #[error("Image could not be decoded: {0}")]
    UndecodableImage(String),

    #[error("OCR service failed: {0}")]
    OcrService(#[from] StructuringError),

    #[error("OCR reply is not a JSON object: {0}")]
    MalformedReply(String),

    #[error("No blood-gas values could be recognized in the image")]
    NothingRecognized,
}
