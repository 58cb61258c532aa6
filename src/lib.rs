pub mod batch;
pub mod cli;
pub mod codecs;
pub mod constants;
pub mod error;
pub mod formats;
pub mod job;
pub mod logger;
pub mod paths;
pub mod picker;
pub mod processing;
pub mod quality;
pub mod utils;
pub mod validation;

pub use batch::{compress_folder, FileDisposition, FileRecord, JobSummary};
pub use codecs::{CodecStrategy, DecodedImage};
pub use error::{CompressionError, Result};
pub use formats::{classify, FileClass, ImageKind};
pub use job::{
    JobEvent, JobHandle, JobRequest, JobRunner, JobSink, JobState, JobStatus, RejectReason,
    StartOutcome, StartReply,
};
pub use paths::{mirrored_destination, resolve_output_dir};
pub use picker::{default_picker, select_folder, FolderPicker};
pub use processing::{compress_file, load_image, CompressionOptions, FileReport};
pub use quality::{map_colors, normalize};
pub use validation::validate_source_folder;
