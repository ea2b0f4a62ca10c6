//! Error types for pdfmerge.
//!
//! Three layers of errors exist:
//!
//! - [`DecodeError`]: one staged entry could not be parsed as what its kind
//!   says it is (a PDF, or a PNG/JPEG raster).
//! - [`MergeError`]: fatal to the current merge attempt. A merge either
//!   produces a complete document or fails with one of these; there is no
//!   partial output.
//! - [`PreviewError`]: non-fatal. Preview generation falls back to a
//!   placeholder and never blocks intake or merging.
//!
//! [`Error`] wraps everything a front end can hit (file intake, output
//! dispatch, configuration) and maps each case to a process exit code.

use std::io;
use std::path::PathBuf;

use crate::classify::FileKind;

/// Result type alias for pdfmerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A staged entry whose payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to decode {kind} entry #{position} ({name})\n  Reason: {reason}")]
pub struct DecodeError {
    /// 1-based position of the entry in the merge order.
    pub position: usize,
    /// Display name of the entry.
    pub name: String,
    /// Kind the entry was classified as at intake.
    pub kind: FileKind,
    /// Decoder message.
    pub reason: String,
}

impl DecodeError {
    /// Create a decode error for the entry at `position` (1-based).
    pub fn new(
        position: usize,
        name: impl Into<String>,
        kind: FileKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            position,
            name: name.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Failure of a merge attempt.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The pipeline was called with no entries.
    #[error("No entries to merge")]
    Empty,

    /// An entry's payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The output page tree could not be built.
    #[error("Failed to assemble merged document: {reason}")]
    Assemble {
        /// What went wrong.
        reason: String,
    },

    /// The finished document could not be serialized.
    #[error("Failed to serialize merged document: {reason}")]
    Serialize {
        /// Serializer message.
        reason: String,
    },
}

impl MergeError {
    /// Create an Assemble error.
    pub fn assemble(reason: impl Into<String>) -> Self {
        Self::Assemble {
            reason: reason.into(),
        }
    }

    /// Position (1-based) of the entry that failed to decode, if any.
    pub fn failed_position(&self) -> Option<usize> {
        match self {
            Self::Decode(err) => Some(err.position),
            _ => None,
        }
    }
}

/// Non-fatal failure while generating a preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// The PDF rasterizer could not render the first page.
    #[error("PDF preview failed for {name}: {reason}")]
    Rasterize {
        /// Entry name.
        name: String,
        /// Rasterizer message.
        reason: String,
    },

    /// An image thumbnail could not be produced.
    #[error("Thumbnail generation failed for {name}: {reason}")]
    Thumbnail {
        /// Entry name.
        name: String,
        /// Encoder or decoder message.
        reason: String,
    },
}

/// Main error type for pdfmerge front ends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Input file could not be read.
    #[error("Failed to read input file: {}\n  Reason: {source}", path.display())]
    FailedToRead {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Fewer entries are staged than a merge requires.
    #[error(
        "At least {required} files are required to merge, found {found}\n  \
         Hint: Files other than .pdf, .png, .jpg and .jpeg are skipped"
    )]
    NotEnoughEntries {
        /// Number of staged entries.
        found: usize,
        /// Required minimum.
        required: usize,
    },

    /// A rotation that is not a multiple of 90 degrees.
    #[error("Invalid rotation: {degrees}. Must be a multiple of 90 degrees")]
    InvalidRotation {
        /// Requested degrees.
        degrees: i64,
    },

    /// An input argument could not be parsed.
    #[error("Invalid input '{input}': {details}")]
    InvalidInput {
        /// Raw argument.
        input: String,
        /// What is wrong with it.
        details: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Existing output path.
        path: PathBuf,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// The merge itself failed.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::Merge(MergeError::Decode(err))
    }
}

impl Error {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(input: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidInput {
            input: input.into(),
            details: details.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToRead { .. } => 2,
            Self::NotEnoughEntries { .. } => 1,
            Self::InvalidRotation { .. } => 1,
            Self::InvalidInput { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130,
            Self::Merge(MergeError::Decode(_)) => 3,
            Self::Merge(_) => 6,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
