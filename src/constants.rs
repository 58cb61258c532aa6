pub const DEFAULT_QUALITY: i32 = 75;
pub const MIN_QUALITY: i32 = 1;
pub const MAX_QUALITY: i32 = 95;

// WebP accepts the full percentage range, wider than the shared UI range.
pub const WEBP_MAX_QUALITY: i32 = 100;
pub const WEBP_METHOD: i32 = 6;

pub const MIN_PNG_COLORS: u32 = 2;
pub const MAX_PNG_COLORS: u32 = 256;

pub const OXIPNG_PRESET: u8 = 6;
pub const LIBDEFLATER_MAX_LEVEL: u8 = 12;

// imagequant speed presets, 1 (slowest, best) ..= 10 (fastest).
pub const QUANT_SPEED_OCTREE: i32 = 8;
pub const QUANT_SPEED_MEDIAN_CUT: i32 = 3;
pub const QUANT_DITHERING_LEVEL: f32 = 1.0;

// A JPEG APP1 segment payload cannot exceed 65533 bytes.
pub const MAX_APP1_PAYLOAD: usize = 65_533;

pub const OUTPUT_SUFFIX: &str = "_compressed";
pub const MAX_OUTPUT_SUFFIX_INDEX: u32 = 999;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed}] {msg}";

// Progress log line tags
pub const TAG_OK: &str = "[OK]";
pub const TAG_FAIL: &str = "[FAIL]";
pub const TAG_COPY: &str = "[COPY]";
pub const TAG_SKIP: &str = "[SKIP]";
pub const TAG_WARN: &str = "[WARN]";
pub const TAG_ERROR: &str = "[ERROR]";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
pub const FOLDER_PREFIX: &str = "📁";
