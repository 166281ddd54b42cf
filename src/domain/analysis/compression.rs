use super::error::AnalysisError;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 1024 * 1024;
pub const DEFAULT_MAX_DIMENSION: u32 = 1200;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Shrinks large uploads before they are sent to the model.
///
/// Payloads under `max_bytes` pass through untouched. Larger ones are scaled
/// to fit in a `max_dimension` square, keeping the aspect ratio, and
/// re-encoded as JPEG.
#[derive(Debug, Clone, Copy)]
pub struct ImageCompressor {
    pub max_bytes: usize,
    pub max_dimension: u32,
    pub quality: u8,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Pieces of a `data:<mime>;base64,<payload>` URL
#[derive(Debug, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: &'a str,
    pub payload: &'a str,
}

pub fn parse_data_url(data_url: &str) -> Result<DataUrl<'_>, AnalysisError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AnalysisError::InvalidImage("expected a data: URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AnalysisError::InvalidImage("data URL has no payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AnalysisError::InvalidImage("data URL is not base64 encoded".to_string()))?;

    if !mime_type.starts_with("image/") {
        return Err(AnalysisError::InvalidImage(format!(
            "unsupported content type: {}",
            mime_type
        )));
    }

    Ok(DataUrl { mime_type, payload })
}

impl ImageCompressor {
    pub fn new(max_bytes: usize, max_dimension: u32, quality: u8) -> Self {
        Self {
            max_bytes,
            max_dimension,
            quality,
        }
    }

    /// Return the data URL to send upstream for `data_url`
    pub fn compress(&self, data_url: &str) -> Result<String, AnalysisError> {
        let parsed = parse_data_url(data_url)?;

        if data_url.len() < self.max_bytes {
            return Ok(data_url.to_string());
        }

        let bytes = STANDARD
            .decode(parsed.payload.trim())
            .map_err(|e| AnalysisError::InvalidImage(format!("bad base64 payload: {}", e)))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| AnalysisError::InvalidImage(format!("cannot decode image: {}", e)))?;

        let (width, height) = decoded.dimensions();
        let resized = if width > self.max_dimension || height > self.max_dimension {
            decoded.resize(self.max_dimension, self.max_dimension, FilterType::Triangle)
        } else {
            decoded
        };

        let rgb = resized.to_rgb8();
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality)
            .encode_image(&rgb)
            .map_err(|e| AnalysisError::InvalidImage(format!("cannot encode image: {}", e)))?;

        tracing::debug!(
            original_size = data_url.len(),
            original_width = width,
            original_height = height,
            width = rgb.width(),
            height = rgb.height(),
            compressed_size = encoded.len(),
            "Image compressed"
        );

        Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&encoded)))
    }
}
