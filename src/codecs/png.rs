use super::{CodecStrategy, DecodedImage};
use crate::constants::{
    LIBDEFLATER_MAX_LEVEL, OXIPNG_PRESET, QUANT_DITHERING_LEVEL, QUANT_SPEED_MEDIAN_CUT,
    QUANT_SPEED_OCTREE,
};
use crate::error::{CompressionError, Result};
use crate::processing::CompressionOptions;
use crate::quality::resolve_png_colors;
use image::{DynamicImage, ImageFormat};
use oxipng::{Deflaters, Options};
use std::io::Cursor;

/// PNG recompression.
///
/// Lossless mode re-encodes the pixels unchanged. Lossy mode first reduces
/// the image to a palette. Both end with a maximum effort oxipng pass.
pub struct PngCodec;

impl CodecStrategy for PngCodec {
    fn encode(&self, image: &DecodedImage, options: &CompressionOptions) -> Result<Vec<u8>> {
        let png = if options.png_lossy {
            let colors = resolve_png_colors(options.png_colors, options.quality);
            let method = QuantizeMethod::for_image(&image.pixels);
            quantize(&image.pixels, colors, method)?.to_png()?
        } else {
            encode_lossless(&image.pixels)?
        };

        optimize(&png)
    }
}

/// Palette selection strategy for lossy PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeMethod {
    /// Fast tree based selection, used for images with an alpha channel so
    /// transparent edges survive dithering.
    FastOctree,
    /// Slower perceptual selection for opaque images.
    MedianCut,
}

impl QuantizeMethod {
    pub fn for_image(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            QuantizeMethod::FastOctree
        } else {
            QuantizeMethod::MedianCut
        }
    }

    fn speed(self) -> i32 {
        match self {
            QuantizeMethod::FastOctree => QUANT_SPEED_OCTREE,
            QuantizeMethod::MedianCut => QUANT_SPEED_MEDIAN_CUT,
        }
    }
}

/// Palette image produced by [`quantize`].
#[derive(Debug, Clone)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    palette: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

impl IndexedImage {
    pub fn palette(&self) -> &[[u8; 4]] {
        &self.palette
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGBA value of the pixel at `(x, y)` after remapping.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let index = self.indices[(y * self.width + x) as usize];
        self.palette[index as usize]
    }

    fn to_png(&self) -> Result<Vec<u8>> {
        let rgb: Vec<u8> = self.palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
        let alpha: Vec<u8> = self.palette.iter().map(|c| c[3]).collect();
        let has_alpha = alpha.iter().any(|&a| a < u8::MAX);

        let mut buf = Vec::new();
        {
            let mut encoder = ::png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(::png::ColorType::Indexed);
            encoder.set_depth(::png::BitDepth::Eight);
            encoder.set_palette(rgb);
            if has_alpha {
                encoder.set_trns(alpha);
            }
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.indices)?;
            writer.finish()?;
        }
        Ok(buf)
    }
}

/// Reduces `pixels` to at most `colors` palette entries with full
/// error-diffusion dithering.
///
/// When the source has fully transparent pixels one entry is reserved for
/// full transparency, so those pixels stay transparent at any palette size.
pub fn quantize(pixels: &DynamicImage, colors: u32, method: QuantizeMethod) -> Result<IndexedImage> {
    let rgba = pixels.to_rgba8();
    let (width, height) = rgba.dimensions();
    let has_transparent = rgba.pixels().any(|p| p[3] == 0);
    let bitmap: Vec<imagequant::RGBA> = rgba
        .pixels()
        .map(|p| imagequant::RGBA::new(p[0], p[1], p[2], p[3]))
        .collect();

    let mut attributes = imagequant::new();
    attributes.set_speed(method.speed())?;
    attributes.set_max_colors(colors)?;

    let mut liq_image = attributes.new_image(bitmap, width as usize, height as usize, 0.0)?;
    if has_transparent {
        liq_image.add_fixed_color(imagequant::RGBA::new(0, 0, 0, 0))?;
    }
    let mut result = attributes.quantize(&mut liq_image)?;
    result.set_dithering_level(QUANT_DITHERING_LEVEL)?;
    let (palette, indices) = result.remapped(&mut liq_image)?;

    Ok(IndexedImage {
        width,
        height,
        palette: palette.iter().map(|c| [c.r, c.g, c.b, c.a]).collect(),
        indices,
    })
}

fn encode_lossless(pixels: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    pixels.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

fn optimize(png: &[u8]) -> Result<Vec<u8>> {
    let mut options = Options::from_preset(OXIPNG_PRESET);
    options.force = true;
    options.deflate = Deflaters::Libdeflater {
        compression: LIBDEFLATER_MAX_LEVEL,
    };

    oxipng::optimize_from_memory(png, &options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))
}
