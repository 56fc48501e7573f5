use crate::error::WorkflowError;
use crate::models::{PreviewImage, UploadCandidate};
use crate::utils::validation::{declared_type_matches, normalize_mime};
use base64::Engine;

/// Decodes an accepted candidate into a displayable data URL
pub struct PreviewService;

impl PreviewService {
    /// Generate a preview for a candidate that already passed validation.
    ///
    /// The bytes are decoded once so that malformed files fail here instead of on the
    /// results view. The data URL carries the original bytes, not a re-encoding.
    ///
    /// Decoding runs inline on the calling task; a large image holds the runtime
    /// thread for as long as the decode takes.
    pub async fn generate(candidate: &UploadCandidate) -> Result<PreviewImage, WorkflowError> {
        Self::generate_blocking(candidate)
    }

    pub fn generate_blocking(candidate: &UploadCandidate) -> Result<PreviewImage, WorkflowError> {
        if candidate.bytes.is_empty() {
            return Err(WorkflowError::Decode("File appears to be empty".to_string()));
        }

        if !declared_type_matches(&candidate.bytes, &candidate.declared_mime) {
            tracing::warn!(
                "Declared type '{}' of {} does not match its content, decoding anyway",
                candidate.declared_mime,
                candidate.file_name
            );
        }

        let img = image::load_from_memory(&candidate.bytes)
            .map_err(|e| WorkflowError::Decode(format!("Failed to load image: {}", e)))?;

        let mime = normalize_mime(&candidate.declared_mime);
        let payload = base64::engine::general_purpose::STANDARD.encode(&candidate.bytes);

        Ok(PreviewImage {
            data_url: format!("data:{};base64,{}", mime, payload),
            mime,
            width: img.width(),
            height: img.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(6, 3, Rgb([40, 160, 60]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), format)
            .unwrap();
        out
    }

    #[tokio::test]
    async fn test_png_preview() {
        let candidate = UploadCandidate::new("leaf.png", "image/png", encode(ImageFormat::Png));
        let preview = PreviewService::generate(&candidate).await.unwrap();
        assert!(preview.data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!((preview.width, preview.height), (6, 3));
    }

    #[tokio::test]
    async fn test_jpeg_preview_keeps_declared_alias() {
        let candidate =
            UploadCandidate::new("leaf.jpg", "image/jpg", encode(ImageFormat::Jpeg));
        let preview = PreviewService::generate(&candidate).await.unwrap();
        assert_eq!(preview.mime, "image/jpg");
        assert!(preview.data_url.starts_with("data:image/jpg;base64,/9j/"));
    }

    #[test]
    fn test_malformed_bytes_fail_to_decode() {
        let mut bytes = encode(ImageFormat::Png);
        bytes.truncate(12);
        let candidate = UploadCandidate::new("broken.png", "image/png", bytes);
        assert!(matches!(
            PreviewService::generate_blocking(&candidate),
            Err(WorkflowError::Decode(_))
        ));
    }

    #[test]
    fn test_empty_file_fails() {
        let candidate = UploadCandidate::new("empty.png", "image/png", Vec::new());
        assert!(matches!(
            PreviewService::generate_blocking(&candidate),
            Err(WorkflowError::Decode(_))
        ));
    }
}
