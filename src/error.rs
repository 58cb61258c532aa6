use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("JPEG encoding error: {0}")]
    JpegEncoding(String),

    #[error("WebP encoding error: {0}")]
    WebpEncoding(String),

    #[error("Color quantization error: {0}")]
    Quantization(#[from] imagequant::Error),

    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Not a folder: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to find a free output folder name for {0} (tried {1} candidates)")]
    OutputNamespaceExhausted(PathBuf, u32),

    #[error("Codec panicked: {0}")]
    CodecPanic(String),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
