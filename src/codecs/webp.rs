use super::{CodecStrategy, DecodedImage};
use crate::constants::{WEBP_MAX_QUALITY, WEBP_METHOD};
use crate::error::{CompressionError, Result};
use crate::processing::CompressionOptions;

/// Lossy WebP at the job quality with the slowest, smallest method.
pub struct WebpCodec;

impl CodecStrategy for WebpCodec {
    fn encode(&self, image: &DecodedImage, options: &CompressionOptions) -> Result<Vec<u8>> {
        let mut config = ::webp::WebPConfig::new()
            .map_err(|_| CompressionError::WebpEncoding("invalid encoder config".to_string()))?;
        config.lossless = 0;
        config.quality = i32::from(options.quality).clamp(1, WEBP_MAX_QUALITY) as f32;
        config.method = WEBP_METHOD;

        let pixels = &image.pixels;
        let encoded = if pixels.color().has_alpha() {
            let rgba = pixels.to_rgba8();
            let encoder = ::webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
            let memory = encoder.encode_advanced(&config);
            memory.map(|memory| memory.to_vec())
        } else {
            let rgb = pixels.to_rgb8();
            let encoder = ::webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());
            let memory = encoder.encode_advanced(&config);
            memory.map(|memory| memory.to_vec())
        };

        encoded.map_err(|e| CompressionError::WebpEncoding(format!("{:?}", e)))
    }
}
