use crate::constants::{TAG_COPY, TAG_FAIL, TAG_OK, TAG_SKIP, TAG_WARN};
use crate::error::Result;
use crate::formats::{classify, FileClass};
use crate::paths::{mirrored_destination, resolve_output_dir};
use crate::processing::{compress_file, CompressionOptions, FileReport};
use crate::utils::{calculate_compression_ratio, format_file_size};
use crate::validation::validate_source_folder;
use crate::verbose;
use std::fmt;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Counters accumulated over one folder walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Files with a compressible extension.
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// Files of any other type, copied or not.
    pub skipped: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub elapsed: Duration,
}

impl JobSummary {
    /// `(total, success, failed, skipped)`
    pub fn counters(&self) -> (usize, usize, usize, usize) {
        (self.total, self.success, self.failed, self.skipped)
    }

    /// Size reduction over the successfully compressed files, in percent.
    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.bytes_before, self.bytes_after)
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done. Total: {}, Success: {}, Failed: {}, Skipped: {}, Time: {:.1}s",
            self.total,
            self.success,
            self.failed,
            self.skipped,
            self.elapsed.as_secs_f64()
        )
    }
}

/// How a discovered file was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDisposition {
    Compressed(FileReport),
    CompressFailed(String),
    Copied,
    CopyFailed(String),
    Skipped,
}

/// One discovered file and its outcome; lives just long enough to be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative_path: PathBuf,
    pub disposition: FileDisposition,
}

impl FileRecord {
    pub fn log_line(&self) -> String {
        let path = self.relative_path.display();
        match &self.disposition {
            FileDisposition::Compressed(report) => {
                let ratio =
                    calculate_compression_ratio(report.original_size, report.compressed_size);
                let change = if ratio >= 0.0 { "smaller" } else { "larger" };
                format!(
                    "{} {} ({} -> {}, {:.1}% {})",
                    TAG_OK,
                    path,
                    format_file_size(report.original_size),
                    format_file_size(report.compressed_size),
                    ratio.abs(),
                    change
                )
            }
            FileDisposition::CompressFailed(reason) => format!("{} {} -> {}", TAG_FAIL, path, reason),
            FileDisposition::Copied => format!("{} {}", TAG_COPY, path),
            FileDisposition::CopyFailed(reason) => {
                format!("{} {} -> copy failed: {}", TAG_FAIL, path, reason)
            }
            FileDisposition::Skipped => format!("{} {}", TAG_SKIP, path),
        }
    }
}

/// Recompresses every image below `folder` into a fresh sibling folder.
///
/// The output folder is resolved once, before anything is written, and the
/// source tree is mirrored into it. Each discovered file produces exactly one
/// line on `log`; a failing file never stops the walk. A dry run makes every
/// decision and runs every decode and encode but writes nothing, not even
/// the output folder.
///
/// # Returns
/// * `Ok((output_dir, summary))` once all files are handled
/// * `Err(CompressionError)` if the source is invalid or no output name is free
pub fn compress_folder<F>(
    folder: &Path,
    options: &CompressionOptions,
    mut log: F,
) -> Result<(PathBuf, JobSummary)>
where
    F: FnMut(&str),
{
    validate_source_folder(folder)?;
    let output_dir = resolve_output_dir(folder)?;
    let source_dir = fs::canonicalize(folder)?;

    let start_time = Instant::now();
    let mut summary = JobSummary::default();

    log(&format!("Source: {}", folder.display()));
    log(&format!("Output: {}", output_dir.display()));

    for file in collect_files(&source_dir, &mut log) {
        let (relative_path, destination) =
            match mirrored_destination(&source_dir, &output_dir, &file) {
                Ok(paths) => paths,
                Err(err) => {
                    log(&format!("{} {}", TAG_WARN, err));
                    continue;
                }
            };

        let disposition = process_file(&file, &destination, options, &mut summary);
        let record = FileRecord {
            relative_path,
            disposition,
        };
        log(&record.log_line());
    }

    summary.elapsed = start_time.elapsed();
    log(&summary.to_string());

    Ok((output_dir, summary))
}

/// Every regular file below `source_dir`, in directory-then-name order.
///
/// Unreadable entries are reported on `log` and left out.
pub fn collect_files<F>(source_dir: &Path, log: &mut F) -> Vec<PathBuf>
where
    F: FnMut(&str),
{
    let mut files = Vec::new();

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() {
                    files.push(path.to_path_buf());
                }
            }
            Err(err) => log(&format!("{} {}", TAG_WARN, err)),
        }
    }

    files
}

fn process_file(
    file: &Path,
    destination: &Path,
    options: &CompressionOptions,
    summary: &mut JobSummary,
) -> FileDisposition {
    match classify(file) {
        FileClass::Compressible(kind) => {
            summary.total += 1;
            match compress_file(file, destination, kind, options) {
                Ok(report) => {
                    summary.success += 1;
                    summary.bytes_before += report.original_size;
                    summary.bytes_after += report.compressed_size;
                    FileDisposition::Compressed(report)
                }
                Err(reason) => {
                    summary.failed += 1;
                    FileDisposition::CompressFailed(reason)
                }
            }
        }
        FileClass::Other => {
            summary.skipped += 1;
            if !options.copy_others {
                return FileDisposition::Skipped;
            }
            if options.dry_run {
                return FileDisposition::Copied;
            }
            match copy_preserving_times(file, destination) {
                Ok(()) => FileDisposition::Copied,
                Err(err) => FileDisposition::CopyFailed(err.to_string()),
            }
        }
    }
}

fn copy_preserving_times(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;

    if let Err(err) = copy_file_times(source, destination) {
        verbose!(
            "Could not keep timestamps of {}: {}",
            destination.display(),
            err
        );
    }
    Ok(())
}

fn copy_file_times(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    File::options()
        .write(true)
        .open(destination)?
        .set_times(times)
}
