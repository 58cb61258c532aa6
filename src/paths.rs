use crate::constants::{MAX_OUTPUT_SUFFIX_INDEX, OUTPUT_SUFFIX};
use crate::error::{CompressionError, Result};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Picks the output folder for a job: a sibling of the source named
/// `<source>_compressed`, or `<source>_compressed_<n>` for the smallest free
/// `n` in `1..=999`.
///
/// The source must be an existing directory; it is made absolute before the
/// suffix is appended. The existence check and the later creation are not
/// atomic, so a folder created by someone else in between is not detected.
///
/// # Errors
/// * `CompressionError::OutputNamespaceExhausted` when every candidate exists
pub fn resolve_output_dir(source_dir: &Path) -> Result<PathBuf> {
    let base = fs::canonicalize(source_dir)?;

    let candidate = with_suffix(&base, OUTPUT_SUFFIX);
    if !candidate.exists() {
        return Ok(candidate);
    }

    for index in 1..=MAX_OUTPUT_SUFFIX_INDEX {
        let candidate = with_suffix(&base, &format!("{}_{}", OUTPUT_SUFFIX, index));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(CompressionError::OutputNamespaceExhausted(
        base,
        MAX_OUTPUT_SUFFIX_INDEX + 1,
    ))
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Mirrors `file` (somewhere below `source_dir`) into `output_dir`.
///
/// Returns the path relative to the source together with the destination.
/// Files outside `source_dir` are rejected.
pub fn mirrored_destination(
    source_dir: &Path,
    output_dir: &Path,
    file: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let relative = file
        .strip_prefix(source_dir)
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not inside {}", file.display(), source_dir.display()),
            )
        })?
        .to_path_buf();
    let destination = output_dir.join(&relative);
    Ok((relative, destination))
}
