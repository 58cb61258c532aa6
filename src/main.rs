use anyhow::{bail, Result};
use batch_squeeze::cli::Args;
use batch_squeeze::constants::{FOLDER_PREFIX, INFO_PREFIX, SUCCESS_PREFIX};
use batch_squeeze::logger::{self, is_quiet};
use batch_squeeze::utils::{create_progress_spinner, format_file_size};
use batch_squeeze::{
    compress_folder, default_picker, validate_source_folder, CompressionOptions, JobSummary,
};
use batch_squeeze::{error, info, verbose, warn};
use clap::Parser;
use indicatif::ProgressBar;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::set_quiet_mode(args.quiet);
    logger::set_verbose_mode(args.verbose);

    let options = args.compression_options();
    verbose!("Options: {:?}", options);

    let folders = match resolve_folders(&args) {
        Some(folders) => folders,
        None => {
            println!("No folder selected.");
            pause_if_requested(args.pause)?;
            return Ok(());
        }
    };

    if options.dry_run {
        info!("{} Dry run: no files will be written", INFO_PREFIX);
    }

    let mut failed_folders = 0;
    for folder in &folders {
        if let Err(err) = validate_source_folder(folder) {
            warn!("{}", err);
            continue;
        }

        match run_folder(folder, &options) {
            Ok(summary) => print_totals(&summary),
            Err(err) => {
                error!("{}", err);
                failed_folders += 1;
            }
        }
    }

    pause_if_requested(args.pause)?;

    if failed_folders > 0 {
        bail!("{} folder(s) could not be processed", failed_folders);
    }
    Ok(())
}

/// Folders from the command line, or one picked interactively.
fn resolve_folders(args: &Args) -> Option<Vec<PathBuf>> {
    if !args.folders.is_empty() {
        return Some(args.folders.clone());
    }

    let picker = default_picker();
    let picked = picker.as_deref().and_then(|picker| picker.pick_folder())?;
    Some(vec![picked])
}

fn run_folder(folder: &Path, options: &CompressionOptions) -> batch_squeeze::Result<JobSummary> {
    let pb = if is_quiet() {
        ProgressBar::hidden()
    } else {
        create_progress_spinner(&format!("{} {}", FOLDER_PREFIX, folder.display()))
    };

    let mut lines = 0usize;
    let result = compress_folder(folder, options, |line| {
        pb.suspend(|| {
            info!("{}", line);
        });
        lines += 1;
        pb.set_message(format!("{} {} ({} lines)", FOLDER_PREFIX, folder.display(), lines));
    });

    pb.finish_and_clear();
    result.map(|(_, summary)| summary)
}

fn print_totals(summary: &JobSummary) {
    if summary.success == 0 {
        return;
    }
    info!(
        "{} {} -> {} ({:.1}% smaller)",
        SUCCESS_PREFIX,
        format_file_size(summary.bytes_before),
        format_file_size(summary.bytes_after),
        summary.compression_ratio()
    );
}

fn pause_if_requested(pause: bool) -> io::Result<()> {
    if !pause {
        return Ok(());
    }
    print!("Press Enter to exit...");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
