//! Maps the user-facing quality knob onto codec parameters.

use crate::constants::{MAX_PNG_COLORS, MAX_QUALITY, MIN_PNG_COLORS, MIN_QUALITY};

/// Clamps a user supplied quality into the shared `1..=95` range.
///
/// # Example
/// ```
/// use batch_squeeze::quality::normalize;
///
/// assert_eq!(normalize(80), 80);
/// assert_eq!(normalize(0), 1);
/// assert_eq!(normalize(120), 95);
/// ```
pub fn normalize(value: i32) -> u8 {
    value.clamp(MIN_QUALITY, MAX_QUALITY) as u8
}

/// Maps a quality onto a PNG palette size: higher quality keeps more colors.
///
/// The quality is clamped to `1..=100` first, then spread linearly over
/// `2..=256` and rounded to the nearest integer.
pub fn map_colors(quality: i32) -> u32 {
    let quality = quality.clamp(1, 100) as f64;
    let span = (MAX_PNG_COLORS - MIN_PNG_COLORS) as f64;
    let colors = (MIN_PNG_COLORS as f64 + (quality / 100.0) * span).round() as u32;
    colors.clamp(MIN_PNG_COLORS, MAX_PNG_COLORS)
}

/// Resolves the palette size for lossy PNG: an explicit override wins,
/// `0` derives it from the quality. Either way the result is in `2..=256`.
pub fn resolve_png_colors(colors_override: u32, quality: u8) -> u32 {
    let colors = if colors_override == 0 {
        map_colors(i32::from(quality))
    } else {
        colors_override
    };
    colors.clamp(MIN_PNG_COLORS, MAX_PNG_COLORS)
}
