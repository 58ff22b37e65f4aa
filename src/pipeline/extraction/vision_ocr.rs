//! Report OCR: photographed blood-gas report in, normalized reading out.
//!
//! Bridges the `VisionClient` (structuring layer) to the intake normalizer.
//! The client call is blocking; async callers wrap [`ReportReader::read`] in
//! `spawn_blocking`.

use std::sync::Arc;

use chrono::Utc;

use super::normalize::{normalize_extraction, parse_ocr_reply};
use super::upload::validate_report_image;
use super::ExtractionError;
use crate::models::BloodGasReading;
use crate::pipeline::structuring::prompt::build_ocr_prompt;
use crate::pipeline::structuring::types::VisionClient;

/// OCR stage backed by a vision model.
pub struct ReportReader {
    vision_client: Arc<dyn VisionClient>,
    max_upload_bytes: usize,
}

impl ReportReader {
    pub fn new(vision_client: Arc<dyn VisionClient>, max_upload_bytes: usize) -> Self {
        Self {
            vision_client,
            max_upload_bytes,
        }
    }

    /// Validate the image, transcribe it and normalize the transcription.
    ///
    /// A reading in which no parameter survived normalization is an error:
    /// there is nothing for the clinician to review.
    pub fn read(&self, image: &[u8]) -> Result<BloodGasReading, ExtractionError> {
        let format = validate_report_image(image, self.max_upload_bytes)?;

        let _span = tracing::info_span!(
            "report_ocr",
            model = %self.vision_client.model_name(),
            image_size = image.len(),
            mime = format.mime(),
        )
        .entered();
        let start = std::time::Instant::now();

        let reply = self
            .vision_client
            .extract(image, format.mime(), &build_ocr_prompt())?;
        let payload = parse_ocr_reply(&reply)?;

        let mut reading = normalize_extraction(&payload);
        if reading.is_empty() {
            tracing::warn!(
                elapsed_ms = %start.elapsed().as_millis(),
                "OCR reply contained no usable values"
            );
            return Err(ExtractionError::NothingRecognized);
        }
        if reading.extracted_at.is_none() {
            reading.extracted_at = Some(Utc::now());
        }

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            present = reading.present_count(),
            missing = reading.missing_fields.len(),
            out_of_range = reading.out_of_range.len(),
            confidence = reading.confidence,
            "Report OCR complete"
        );

        Ok(reading)
    }
}
