//! Single-flight background runner for interactive front ends.
//!
//! A front end submits a [`JobRequest`], gets an immediate [`StartOutcome`]
//! and then receives [`JobEvent`]s through a [`JobSink`] while the folder is
//! processed on a dedicated thread. At most one job runs per [`JobRunner`].

use crate::batch::{compress_folder, JobSummary};
use crate::constants::{DEFAULT_QUALITY, TAG_ERROR};
use crate::processing::CompressionOptions;
use crossbeam_channel::Sender;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

/// Lifecycle of a runner: `Idle -> Running -> {Done, Error} -> Running ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobState {
    Idle = 0,
    Running = 1,
    Done = 2,
    Error = 3,
}

impl JobState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => JobState::Running,
            2 => JobState::Done,
            3 => JobState::Error,
            _ => JobState::Idle,
        }
    }
}

/// Status values reported to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

impl From<JobStatus> for JobState {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Running => JobState::Running,
            JobStatus::Done => JobState::Done,
            JobStatus::Error => JobState::Error,
        }
    }
}

/// One event of a job, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum JobEvent {
    Log(String),
    Status(JobStatus),
}

/// Receiver of job events. Called from the job thread.
pub trait JobSink: Send + 'static {
    fn log(&self, line: &str);
    fn status(&self, status: JobStatus);
}

impl JobSink for Sender<JobEvent> {
    fn log(&self, line: &str) {
        // A dropped receiver only means nobody is watching anymore.
        let _ = self.send(JobEvent::Log(line.to_string()));
    }

    fn status(&self, status: JobStatus) {
        let _ = self.send(JobEvent::Status(status));
    }
}

/// Start request as sent by a front end, e.g. `{"folder": "...", "pngLossy": true}`.
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobRequest {
    pub folder: String,
    #[serde(deserialize_with = "lenient_int")]
    pub quality: i64,
    pub png_lossy: bool,
    #[serde(deserialize_with = "lenient_opt_int")]
    pub png_colors: Option<i64>,
    pub keep_metadata: bool,
    pub copy_others: bool,
    pub dry_run: bool,
}

impl Default for JobRequest {
    fn default() -> Self {
        Self {
            folder: String::new(),
            quality: i64::from(DEFAULT_QUALITY),
            png_lossy: false,
            png_colors: None,
            keep_metadata: false,
            copy_others: false,
            dry_run: false,
        }
    }
}

impl JobRequest {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Job options; quality is clamped, a missing or negative colour count
    /// means "derive from quality".
    pub fn options(&self) -> CompressionOptions {
        let quality = self.quality.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let png_colors = self
            .png_colors
            .map(|colors| colors.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0);

        CompressionOptions {
            png_lossy: self.png_lossy,
            png_colors,
            keep_metadata: self.keep_metadata,
            copy_others: self.copy_others,
            dry_run: self.dry_run,
            ..CompressionOptions::new(quality)
        }
    }
}

/// A number as a web front end may send it: `75`, `75.0` or `"75"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LenientInt {
    /// `None` for an empty string.
    fn into_i64<E: de::Error>(self) -> Result<Option<i64>, E> {
        match self {
            LenientInt::Int(value) => Ok(Some(value)),
            LenientInt::Float(value) if value.is_finite() => Ok(Some(value.trunc() as i64)),
            LenientInt::Float(value) => Err(E::custom(format!("invalid number {}", value))),
            LenientInt::Text(text) if text.trim().is_empty() => Ok(None),
            LenientInt::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid integer {:?}", text))),
        }
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    LenientInt::deserialize(deserializer)?
        .into_i64()?
        .ok_or_else(|| de::Error::custom("expected an integer, got an empty string"))
}

fn lenient_opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<LenientInt>::deserialize(deserializer)? {
        Some(value) => value.into_i64(),
        None => Ok(None),
    }
}

/// Why a start request was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    AlreadyRunning,
    FolderRequired,
    Spawn(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::AlreadyRunning => write!(f, "already running"),
            RejectReason::FolderRequired => write!(f, "folder is required"),
            RejectReason::Spawn(err) => write!(f, "failed to start job thread: {}", err),
        }
    }
}

/// Handle to an accepted job.
pub struct JobHandle {
    thread: thread::JoinHandle<()>,
}

impl JobHandle {
    /// Blocks until the job thread exits. `false` if it died abnormally.
    pub fn join(self) -> bool {
        self.thread.join().is_ok()
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("thread", &self.thread.thread().name())
            .finish()
    }
}

#[derive(Debug)]
pub enum StartOutcome {
    Accepted(JobHandle),
    Rejected(RejectReason),
}

impl StartOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, StartOutcome::Accepted(_))
    }
}

/// Immediate reply to a start request, serialised as `{"ok": .., "message": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&StartOutcome> for StartReply {
    fn from(outcome: &StartOutcome) -> Self {
        match outcome {
            StartOutcome::Accepted(_) => StartReply {
                ok: true,
                message: None,
            },
            StartOutcome::Rejected(reason) => StartReply {
                ok: false,
                message: Some(reason.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobRunner {
    state: Arc<AtomicU8>,
    stack_size: Option<usize>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_stack_size(stack_size: usize) -> Self {
        Self {
            stack_size: Some(stack_size),
            ..Self::default()
        }
    }

    pub fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Starts a job for `request` unless one is already running.
    ///
    /// On acceptance the runner is `Running` before this returns. The job
    /// thread first sends a `running` status, then forwards every progress
    /// line, appends the output folder and the counters, and finishes with a
    /// `done` or `error` status. A rejected start sends nothing to `sink`. The runner leaves `Running` before the final
    /// status is sent, so a front end may start the next job as soon as it
    /// sees it.
    pub fn start<S: JobSink>(&self, request: &JobRequest, sink: S) -> StartOutcome {
        if self.state() == JobState::Running {
            return StartOutcome::Rejected(RejectReason::AlreadyRunning);
        }
        if request.folder.trim().is_empty() {
            return StartOutcome::Rejected(RejectReason::FolderRequired);
        }

        let previous = match self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current != JobState::Running as u8).then_some(JobState::Running as u8)
            }) {
            Ok(previous) => previous,
            Err(_) => return StartOutcome::Rejected(RejectReason::AlreadyRunning),
        };

        let state = Arc::clone(&self.state);
        let folder = PathBuf::from(&request.folder);
        let options = request.options();

        let mut builder = thread::Builder::new().name("batch-squeeze-job".into());
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let spawned = builder.spawn(move || {
            sink.status(JobStatus::Running);
            let status = run_job(&folder, &options, &sink);
            state.store(JobState::from(status) as u8, Ordering::SeqCst);
            sink.status(status);
        });

        match spawned {
            Ok(thread) => StartOutcome::Accepted(JobHandle { thread }),
            Err(err) => {
                self.state.store(previous, Ordering::SeqCst);
                StartOutcome::Rejected(RejectReason::Spawn(err.to_string()))
            }
        }
    }
}

fn run_job<S: JobSink>(folder: &Path, options: &CompressionOptions, sink: &S) -> JobStatus {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        compress_folder(folder, options, |line| sink.log(line))
    }));

    match outcome {
        Ok(Ok((output_dir, summary))) => {
            sink.log(&format!("Output: {}", output_dir.display()));
            sink.log(&summary_line(&summary));
            JobStatus::Done
        }
        Ok(Err(err)) => {
            sink.log(&format!("{} {}", TAG_ERROR, err));
            JobStatus::Error
        }
        Err(_) => {
            sink.log(&format!("{} job aborted unexpectedly", TAG_ERROR));
            JobStatus::Error
        }
    }
}

fn summary_line(summary: &JobSummary) -> String {
    format!(
        "Summary: Total={} Success={} Failed={} Skipped={}",
        summary.total, summary.success, summary.failed, summary.skipped
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_job_request_defaults() {
        let request = JobRequest::from_json(r#"{"folder": "/photos"}"#).unwrap();
        assert_eq!(request.folder, "/photos");
        assert_eq!(request.options(), CompressionOptions::default());
    }

    #[test]
    fn test_job_request_full() {
        let request = JobRequest::from_json(
            r#"{"folder": "x", "quality": 150, "pngLossy": true, "pngColors": 64,
                "keepMetadata": true, "copyOthers": true, "dryRun": true}"#,
        )
        .unwrap();
        let options = request.options();

        assert_eq!(options.quality, 95);
        assert!(options.png_lossy);
        assert_eq!(options.png_colors, 64);
        assert!(options.keep_metadata);
        assert!(options.copy_others);
        assert!(options.dry_run);
    }

    #[test]
    fn test_job_request_null_or_negative_colors_derive() {
        let null = JobRequest::from_json(r#"{"folder": "x", "pngColors": null}"#).unwrap();
        assert_eq!(null.options().png_colors, 0);

        let negative = JobRequest::from_json(r#"{"folder": "x", "pngColors": -5}"#).unwrap();
        assert_eq!(negative.options().png_colors, 0);
    }

    #[test]
    fn test_job_request_accepts_numbers_as_floats_or_text() {
        let request = JobRequest::from_json(
            r#"{"folder": "x", "quality": "60", "pngColors": 32.0}"#,
        )
        .unwrap();
        assert_eq!(request.quality, 60);
        assert_eq!(request.png_colors, Some(32));

        let request =
            JobRequest::from_json(r#"{"folder": "x", "quality": 80.7, "pngColors": ""}"#).unwrap();
        assert_eq!(request.quality, 80);
        assert_eq!(request.png_colors, None);
        assert_eq!(request.options().png_colors, 0);
    }

    #[test]
    fn test_job_request_rejects_non_numeric_text() {
        assert!(JobRequest::from_json(r#"{"folder": "x", "quality": "high"}"#).is_err());
        assert!(JobRequest::from_json(r#"{"folder": "x", "quality": ""}"#).is_err());
        assert!(JobRequest::from_json(r#"{"folder": "x", "pngColors": true}"#).is_err());
    }

    #[test]
    fn test_spawn_failure_leaves_sink_silent_and_state_unchanged() {
        let runner = JobRunner::with_stack_size(usize::MAX / 4);
        let (tx, rx) = unbounded();
        let request = JobRequest {
            folder: "/photos".to_string(),
            ..JobRequest::default()
        };

        let outcome = runner.start(&request, tx);

        assert!(matches!(
            outcome,
            StartOutcome::Rejected(RejectReason::Spawn(_))
        ));
        assert_eq!(runner.state(), JobState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_and_reply_serialization() {
        let log = serde_json::to_string(&JobEvent::Log("[OK] a.jpg".to_string())).unwrap();
        assert_eq!(log, r#"{"type":"log","payload":"[OK] a.jpg"}"#);

        let status = serde_json::to_string(&JobEvent::Status(JobStatus::Done)).unwrap();
        assert_eq!(status, r#"{"type":"status","payload":"done"}"#);

        let rejected = StartOutcome::Rejected(RejectReason::FolderRequired);
        let reply = serde_json::to_string(&StartReply::from(&rejected)).unwrap();
        assert_eq!(reply, r#"{"ok":false,"message":"folder is required"}"#);
    }

    #[test]
    fn test_start_rejects_empty_folder_without_state_change() {
        let runner = JobRunner::new();
        let (tx, rx) = unbounded();

        let outcome = runner.start(&JobRequest::default(), tx);

        assert!(matches!(
            outcome,
            StartOutcome::Rejected(RejectReason::FolderRequired)
        ));
        assert_eq!(runner.state(), JobState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_start_missing_folder_ends_in_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let runner = JobRunner::new();
        let (tx, rx) = unbounded();
        let request = JobRequest {
            folder: temp_dir.path().join("missing").display().to_string(),
            ..JobRequest::default()
        };

        match runner.start(&request, tx) {
            StartOutcome::Accepted(handle) => assert!(handle.join()),
            StartOutcome::Rejected(reason) => panic!("rejected: {}", reason),
        }

        let events: Vec<JobEvent> = rx.iter().collect();
        assert_eq!(events.first(), Some(&JobEvent::Status(JobStatus::Running)));
        assert_eq!(events.last(), Some(&JobEvent::Status(JobStatus::Error)));
        assert!(events.iter().any(|event| matches!(
            event,
            JobEvent::Log(line) if line.starts_with("[ERROR] Folder not found")
        )));
        assert_eq!(runner.state(), JobState::Error);
    }
}
