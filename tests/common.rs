#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    }))
}

/// Left half fully transparent, right half an opaque gradient.
pub fn half_transparent_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        if x < width / 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([200, (y * 3 % 256) as u8, 40, 255])
        }
    }))
}

/// Saves `image` at `path` in the format implied by its extension.
pub fn save_image(path: &Path, image: &DynamicImage) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    image.save(path).unwrap();
}

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(contents).unwrap();
}

/// Source tree `a/b/x.jpg`, `a/y.png`, `z.txt` under `root/<name>`.
pub fn create_mixed_tree(root: &Path, name: &str) -> PathBuf {
    let source = root.join(name);
    save_image(&source.join("a/b/x.jpg"), &gradient_image(32, 24));
    save_image(&source.join("a/y.png"), &half_transparent_image(24, 24));
    write_file(&source.join("z.txt"), b"notes");
    source
}

/// Relative paths of every file below `root`, sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

/// Expected output folder for `source` with the given collision suffix.
pub fn output_dir_for(source: &Path, suffix: Option<u32>) -> PathBuf {
    let source = fs::canonicalize(source).unwrap();
    let name = source.file_name().unwrap().to_string_lossy().into_owned();
    let name = match suffix {
        Some(n) => format!("{}_compressed_{}", name, n),
        None => format!("{}_compressed", name),
    };
    source.with_file_name(name)
}
