use batch_squeeze::codecs::{quantize, QuantizeMethod};
use batch_squeeze::formats::ImageKind;
use batch_squeeze::quality::map_colors;
use batch_squeeze::{compress_folder, CompressionOptions, DecodedImage};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use std::fs;
use tempfile::TempDir;

fn test_image(width: u32, height: u32, alpha: bool) -> DynamicImage {
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        let a = if alpha && x < width / 3 { 0 } else { 255 };
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, a])
    });
    if alpha {
        DynamicImage::ImageRgba8(pixels)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(pixels).to_rgb8())
    }
}

fn bench_map_colors(c: &mut Criterion) {
    c.bench_function("map_colors", |b| {
        b.iter(|| (1..=100).map(|q| map_colors(black_box(q))).sum::<u32>())
    });
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.sample_size(10);

    let image = DecodedImage::new(test_image(512, 512, false));
    let options = CompressionOptions::default();
    for kind in ImageKind::all_kinds() {
        group.bench_with_input(BenchmarkId::new("kind", kind), &kind, |b, kind| {
            b.iter(|| kind.codec().encode(black_box(&image), &options))
        });
    }

    let lossy = CompressionOptions {
        png_lossy: true,
        ..CompressionOptions::default()
    };
    group.bench_function("png_lossy", |b| {
        b.iter(|| ImageKind::Png.codec().encode(black_box(&image), &lossy))
    });

    group.finish();
}

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");
    group.sample_size(10);

    let opaque = test_image(256, 256, false);
    let transparent = test_image(256, 256, true);
    for colors in [16u32, 64, 256] {
        group.bench_with_input(BenchmarkId::new("median_cut", colors), &colors, |b, &colors| {
            b.iter(|| quantize(black_box(&opaque), colors, QuantizeMethod::MedianCut))
        });
        group.bench_with_input(BenchmarkId::new("fast_octree", colors), &colors, |b, &colors| {
            b.iter(|| quantize(black_box(&transparent), colors, QuantizeMethod::FastOctree))
        });
    }

    group.finish();
}

fn bench_dry_run_folder(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("album");
    fs::create_dir_all(source.join("nested")).unwrap();
    for (index, name) in ["a.jpg", "b.png", "nested/c.webp", "nested/d.jpg"]
        .iter()
        .enumerate()
    {
        test_image(128 + index as u32 * 32, 128, false)
            .save(source.join(name))
            .unwrap();
    }
    let options = CompressionOptions {
        dry_run: true,
        ..CompressionOptions::default()
    };

    let mut group = c.benchmark_group("folder");
    group.sample_size(10);
    group.bench_function("dry_run", |b| {
        b.iter(|| compress_folder(black_box(&source), &options, |_| {}))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_map_colors,
    bench_codecs,
    bench_quantize,
    bench_dry_run_folder
);
criterion_main!(benches);
