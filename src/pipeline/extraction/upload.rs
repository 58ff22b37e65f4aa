use image::ImageFormat;

use super::ExtractionError;

/// Accepted report photo encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportImageFormat {
    Jpeg,
    Png,
}

impl ReportImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ReportImageFormat::Jpeg => "image/jpeg",
            ReportImageFormat::Png => "image/png",
        }
    }
}

/// Check an uploaded report photo before it is sent for OCR.
///
/// The format is detected from magic bytes, not the declared content type,
/// and the image must decode.
pub fn validate_report_image(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<ReportImageFormat, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyUpload);
    }
    if bytes.len() > max_bytes {
        return Err(ExtractionError::Oversize {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    let (format, detected) = match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => (ReportImageFormat::Jpeg, ImageFormat::Jpeg),
        Ok(ImageFormat::Png) => (ReportImageFormat::Png, ImageFormat::Png),
        _ => return Err(ExtractionError::UnsupportedFormat),
    };

    image::load_from_memory_with_format(bytes, detected)
        .map_err(|e| ExtractionError::UndecodableImage(e.to_string()))?;

    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat};

    fn encoded(format: ImageOutputFormat) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(4, 4);
        let mut buf = Vec::new();
        img.write_to(&mut buf, format).unwrap();
        buf
    }

    #[test]
    fn accepts_png() {
        let bytes = encoded(ImageOutputFormat::Png);
        assert_eq!(
            validate_report_image(&bytes, 1024 * 1024).unwrap(),
            ReportImageFormat::Png
        );
    }

    #[test]
    fn accepts_jpeg() {
        let bytes = encoded(ImageOutputFormat::Jpeg(90));
        let format = validate_report_image(&bytes, 1024 * 1024).unwrap();
        assert_eq!(format, ReportImageFormat::Jpeg);
        assert_eq!(format.mime(), "image/jpeg");
    }

    #[test]
    fn rejects_empty_upload() {
        assert!(matches!(
            validate_report_image(&[], 1024),
            Err(ExtractionError::EmptyUpload)
        ));
    }

    #[test]
    fn rejects_oversize_before_decoding() {
        let bytes = vec![0u8; 2048];
        match validate_report_image(&bytes, 1024) {
            Err(ExtractionError::Oversize { size, max }) => {
                assert_eq!(size, 2048);
                assert_eq!(max, 1024);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(matches!(
            validate_report_image(b"%PDF-1.7 not an image", 1024),
            Err(ExtractionError::UnsupportedFormat)
        ));
    }

    #[test]
    fn rejects_truncated_png() {
        let bytes = encoded(ImageOutputFormat::Png);
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            validate_report_image(truncated, 1024 * 1024),
            Err(ExtractionError::UndecodableImage(_))
        ));
    }
}
