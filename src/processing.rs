use crate::codecs::DecodedImage;
use crate::constants::DEFAULT_QUALITY;
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use crate::quality::normalize;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Settings shared by every file of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Normalized quality, always within `1..=95`.
    pub quality: u8,
    pub png_lossy: bool,
    /// Explicit palette size for lossy PNG, `0` derives it from `quality`.
    pub png_colors: u32,
    pub keep_metadata: bool,
    pub copy_others: bool,
    pub dry_run: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

impl CompressionOptions {
    /// Options with the given quality (clamped) and every switch off.
    pub fn new(quality: i32) -> Self {
        Self {
            quality: normalize(quality),
            png_lossy: false,
            png_colors: 0,
            keep_metadata: false,
            copy_others: false,
            dry_run: false,
        }
    }
}

/// What happened to one successfully processed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub kind: ImageKind,
    pub original_size: u64,
    /// Size of the encoded output, also reported in dry-run mode.
    pub compressed_size: u64,
}

/// Decodes an image, sniffing the real format from its content, and
/// rotates the pixels upright according to the EXIF orientation.
///
/// The raw EXIF block is returned alongside so an encoder may keep it.
pub fn load_image(path: &Path) -> Result<DecodedImage> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let exif = decoder.exif_metadata()?;

    let mut pixels = DynamicImage::from_decoder(decoder)?;
    pixels.apply_orientation(orientation);

    Ok(DecodedImage { pixels, exif })
}

/// Recompresses one image file of the given `kind` into `destination`.
///
/// Never propagates a failure: decode errors, encode errors and codec panics
/// all come back as a human-readable reason. On success, and unless the
/// options ask for a dry run, exactly one file is written at `destination`
/// (parent folders are created as needed).
pub fn compress_file(
    source: &Path,
    destination: &Path,
    kind: ImageKind,
    options: &CompressionOptions,
) -> std::result::Result<FileReport, String> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        process_image_pipeline(source, destination, kind, options)
    }));

    match outcome {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(CompressionError::CodecPanic(panic_message(payload.as_ref())).to_string()),
    }
}

/// load -> orient -> encode -> write
fn process_image_pipeline(
    source: &Path,
    destination: &Path,
    kind: ImageKind,
    options: &CompressionOptions,
) -> Result<FileReport> {
    let original_size = fs::metadata(source)?.len();
    let image = load_image(source)?;
    let encoded = kind.codec().encode(&image, options)?;

    if !options.dry_run {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|_| CompressionError::DirectoryCreationFailed(parent.to_path_buf()))?;
        }
        fs::write(destination, &encoded)?;
    }

    Ok(FileReport {
        kind,
        original_size,
        compressed_size: encoded.len() as u64,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
