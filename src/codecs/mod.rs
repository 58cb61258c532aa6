//! Per-format encoders.
//!
//! Each strategy turns an already decoded, upright image into the bytes of
//! the output file. Strategies never touch the filesystem, so a dry run runs
//! exactly the same encode path and only skips the final write.

mod jpeg;
mod png;
mod webp;

pub use self::jpeg::{reset_exif_orientation, JpegCodec};
pub use self::png::{quantize, IndexedImage, PngCodec, QuantizeMethod};
pub use self::webp::WebpCodec;

use crate::error::Result;
use crate::processing::CompressionOptions;
use image::DynamicImage;

/// Pixels plus the metadata that may be carried over to the output.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: DynamicImage,
    /// Raw EXIF block as found in the source, if any.
    pub exif: Option<Vec<u8>>,
}

impl DecodedImage {
    pub fn new(pixels: DynamicImage) -> Self {
        Self { pixels, exif: None }
    }

    pub fn with_exif(mut self, exif: Vec<u8>) -> Self {
        self.exif = Some(exif);
        self
    }
}

pub trait CodecStrategy: Sync {
    /// Encodes `image` into the complete contents of the output file.
    fn encode(&self, image: &DecodedImage, options: &CompressionOptions) -> Result<Vec<u8>>;
}
