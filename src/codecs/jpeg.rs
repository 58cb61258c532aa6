use super::{CodecStrategy, DecodedImage};
use crate::constants::MAX_APP1_PAYLOAD;
use crate::error::{CompressionError, Result};
use crate::processing::CompressionOptions;
use crate::verbose;
use image::DynamicImage;
use mozjpeg::{ColorSpace, Compress, Marker};

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const ORIENTATION_TAG: u16 = 0x0112;
const IFD_ENTRY_LEN: usize = 12;

/// Progressive JPEG with optimized Huffman tables via mozjpeg.
///
/// Alpha and palette images are flattened to RGB, greyscale stays greyscale.
/// EXIF is kept only when asked for and present in the source.
pub struct JpegCodec;

impl CodecStrategy for JpegCodec {
    fn encode(&self, image: &DecodedImage, options: &CompressionOptions) -> Result<Vec<u8>> {
        let exif = match (&image.exif, options.keep_metadata) {
            (Some(raw), true) => exif_app1_payload(raw),
            _ => None,
        };
        encode_jpeg(&image.pixels, options.quality, exif.as_deref())
    }
}

fn encode_jpeg(pixels: &DynamicImage, quality: u8, exif: Option<&[u8]>) -> Result<Vec<u8>> {
    let (color_space, width, height, data) = match pixels {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => {
            let luma = pixels.to_luma8();
            let (w, h) = luma.dimensions();
            (ColorSpace::JCS_GRAYSCALE, w, h, luma.into_raw())
        }
        _ => {
            let rgb = pixels.to_rgb8();
            let (w, h) = rgb.dimensions();
            (ColorSpace::JCS_RGB, w, h, rgb.into_raw())
        }
    };

    let mut comp = Compress::new(color_space);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(f32::from(quality));
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut writer = comp.start_compress(Vec::new()).map_err(jpeg_error)?;
    if let Some(payload) = exif {
        writer.write_marker(Marker::APP(1), payload);
    }
    writer.write_scanlines(&data).map_err(jpeg_error)?;
    writer.finish().map_err(jpeg_error)
}

fn jpeg_error(err: std::io::Error) -> CompressionError {
    CompressionError::JpegEncoding(err.to_string())
}

/// Builds the APP1 payload for a kept EXIF block.
///
/// Pixels have already been rotated upright, so the orientation tag is reset
/// to 1. Blocks that do not fit in a single segment are dropped.
fn exif_app1_payload(raw: &[u8]) -> Option<Vec<u8>> {
    let mut payload = if raw.starts_with(EXIF_HEADER) {
        raw.to_vec()
    } else {
        let mut payload = Vec::with_capacity(EXIF_HEADER.len() + raw.len());
        payload.extend_from_slice(EXIF_HEADER);
        payload.extend_from_slice(raw);
        payload
    };

    if payload.len() > MAX_APP1_PAYLOAD {
        verbose!(
            "EXIF block of {} bytes exceeds one APP1 segment, dropping it",
            payload.len()
        );
        return None;
    }

    reset_exif_orientation(&mut payload);
    Some(payload)
}

/// Rewrites the IFD0 orientation tag of a TIFF-structured EXIF block to 1
/// ("top-left"). Accepts blocks with or without the `Exif\0\0` prefix.
///
/// Returns `true` when a tag was found and rewritten.
pub fn reset_exif_orientation(exif: &mut [u8]) -> bool {
    let start = if exif.starts_with(EXIF_HEADER) {
        EXIF_HEADER.len()
    } else {
        0
    };
    let tiff = &mut exif[start..];
    if tiff.len() < 8 {
        return false;
    }

    let big_endian = match &tiff[0..2] {
        b"II" => false,
        b"MM" => true,
        _ => return false,
    };

    let ifd = read_u32(tiff, 4, big_endian) as usize;
    if ifd.checked_add(2).map_or(true, |end| end > tiff.len()) {
        return false;
    }

    let count = read_u16(tiff, ifd, big_endian) as usize;
    for index in 0..count {
        let entry = ifd + 2 + index * IFD_ENTRY_LEN;
        if entry + IFD_ENTRY_LEN > tiff.len() {
            break;
        }
        if read_u16(tiff, entry, big_endian) == ORIENTATION_TAG {
            // SHORT values sit left-justified in the 4-byte value field.
            write_u16(tiff, entry + 8, 1, big_endian);
            return true;
        }
    }

    false
}

fn read_u16(data: &[u8], at: usize, big_endian: bool) -> u16 {
    let bytes = [data[at], data[at + 1]];
    if big_endian {
        u16::from_be_bytes(bytes)
    } else {
        u16::from_le_bytes(bytes)
    }
}

fn read_u32(data: &[u8], at: usize, big_endian: bool) -> u32 {
    let bytes = [data[at], data[at + 1], data[at + 2], data[at + 3]];
    if big_endian {
        u32::from_be_bytes(bytes)
    } else {
        u32::from_le_bytes(bytes)
    }
}

fn write_u16(data: &mut [u8], at: usize, value: u16, big_endian: bool) {
    let bytes = if big_endian {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    };
    data[at..at + 2].copy_from_slice(&bytes);
}
