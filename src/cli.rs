use crate::constants::DEFAULT_QUALITY;
use crate::processing::CompressionOptions;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "batch-squeeze",
    about = "Recompress every JPEG, PNG and WebP image in a folder tree",
    long_about = "batch-squeeze walks one or more folders and writes a recompressed copy of every \
                  JPEG, PNG and WebP image into a new sibling folder named <folder>_compressed, \
                  mirroring the original directory layout. Source files are never modified.",
    version,
    after_help = "EXAMPLES:\n  \
    batch-squeeze ./photos\n  \
    batch-squeeze ./photos ./scans -q 60 --png-lossy\n  \
    batch-squeeze ./site/assets --png-lossy --png-colors 64 --copy-others\n  \
    batch-squeeze ./photos --dry-run"
)]
pub struct Args {
    #[arg(
        help = "Folders to compress",
        long_help = "Folders to compress, processed one after another. \
                     When omitted, a folder picker is shown if this build has one."
    )]
    pub folders: Vec<PathBuf>,

    #[arg(
        short = 'q',
        long,
        default_value_t = DEFAULT_QUALITY,
        allow_hyphen_values = true,
        help = "Compression quality (1-95, default: 75)",
        long_help = "Compression quality from 1 (smallest) to 95 (best). Values outside the range \
                     are clamped. Also drives the palette size of lossy PNG unless --png-colors is set."
    )]
    pub quality: i32,

    #[arg(
        long,
        help = "Reduce PNG colors before optimizing",
        long_help = "Quantize PNG images to a palette with dithering before the lossless \
                     optimization pass. Much smaller files at the cost of color fidelity."
    )]
    pub png_lossy: bool,

    #[arg(
        long,
        default_value_t = 0,
        help = "Palette size for lossy PNG (2-256, 0 = from quality)",
        long_help = "Exact palette size for --png-lossy, clamped to 2-256. \
                     0 derives the palette size from --quality."
    )]
    pub png_colors: u32,

    #[arg(long, help = "Keep EXIF metadata in JPEG output")]
    pub keep_metadata: bool,

    #[arg(
        long,
        help = "Copy non-image files into the output folder",
        long_help = "Copy every file that is not a JPEG, PNG or WebP image into the output \
                     folder unchanged, keeping its timestamps. By default such files are skipped."
    )]
    pub copy_others: bool,

    #[arg(
        long,
        help = "Show what would happen without writing anything",
        long_help = "Decode and encode every image and report the results, but write no files \
                     and create no output folder."
    )]
    pub dry_run: bool,

    #[arg(long, help = "Wait for Enter before exiting")]
    pub pause: bool,

    #[arg(short = 'Q', long, conflicts_with = "verbose", help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print per-file codec details")]
    pub verbose: bool,
}

impl Args {
    pub fn compression_options(&self) -> CompressionOptions {
        CompressionOptions {
            png_lossy: self.png_lossy,
            png_colors: self.png_colors,
            keep_metadata: self.keep_metadata,
            copy_others: self.copy_others,
            dry_run: self.dry_run,
            ..CompressionOptions::new(self.quality)
        }
    }
}
