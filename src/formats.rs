//! File classification and type-safe image format handling
//!
//! Every discovered file is either one of the recompressible image kinds or
//! "other". Dispatch to a codec happens once per file through `ImageKind`.

use crate::codecs::{CodecStrategy, JpegCodec, PngCodec, WebpCodec};
use std::fmt;
use std::path::Path;

/// Image formats that are recompressed in place of their original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// JPEG, re-encoded progressive with optimized Huffman tables
    Jpeg,
    /// PNG, lossless by default, optionally palette quantized
    Png,
    /// WebP, lossy re-encode
    WebP,
}

impl ImageKind {
    /// Case-insensitive lookup from a bare extension (no leading dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::WebP),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// The encoder used for this format.
    pub fn codec(&self) -> &'static dyn CodecStrategy {
        match self {
            ImageKind::Jpeg => &JpegCodec,
            ImageKind::Png => &PngCodec,
            ImageKind::WebP => &WebpCodec,
        }
    }

    pub fn all_kinds() -> [ImageKind; 3] {
        [ImageKind::Jpeg, ImageKind::Png, ImageKind::WebP]
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}

/// Disposition class of a discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Compressible(ImageKind),
    Other,
}

/// Classifies a file by its extension only; no I/O is performed.
pub fn classify(path: &Path) -> FileClass {
    match ImageKind::from_path(path) {
        Some(kind) => FileClass::Compressible(kind),
        None => FileClass::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_image_kind_from_extension() {
        assert_eq!(ImageKind::from_extension("jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("Png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("webp"), Some(ImageKind::WebP));
        assert_eq!(ImageKind::from_extension("gif"), None);
        assert_eq!(ImageKind::from_extension(""), None);
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(Path::new("a/b/photo.JPG")),
            FileClass::Compressible(ImageKind::Jpeg)
        );
        assert_eq!(
            classify(Path::new("photo.jpeg")),
            FileClass::Compressible(ImageKind::Jpeg)
        );
        assert_eq!(
            classify(Path::new("icon.PnG")),
            FileClass::Compressible(ImageKind::Png)
        );
        assert_eq!(
            classify(Path::new("anim.webp")),
            FileClass::Compressible(ImageKind::WebP)
        );

        assert_eq!(classify(Path::new("notes.txt")), FileClass::Other);
        assert_eq!(classify(Path::new("scan.tiff")), FileClass::Other);
        assert_eq!(classify(Path::new("Makefile")), FileClass::Other);
        assert_eq!(classify(Path::new(".png")), FileClass::Other);
    }

    #[test]
    fn test_image_kind_display() {
        assert_eq!(format!("{}", ImageKind::Jpeg), "JPEG");
        assert_eq!(format!("{}", ImageKind::Png), "PNG");
        assert_eq!(format!("{}", ImageKind::WebP), "WebP");
    }
}
