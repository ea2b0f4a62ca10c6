//! Output dispatch.
//!
//! The merged bytes leave the library through an [`OutputDispatcher`]. The
//! CLI writes a local file with [`FileDispatcher`] (feature `fs`); the
//! browser binding triggers a download. Nothing is ever sent over the
//! network.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::io::writer::{FileDispatcher, DEFAULT_OUTPUT_NAME};
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = FileDispatcher::new(".");
//! let stats = dispatcher.save_with_stats(bytes, DEFAULT_OUTPUT_NAME).await?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;

#[cfg(feature = "fs")]
use crate::config::OverwriteMode;
#[cfg(feature = "fs")]
use crate::error::Error;
#[cfg(feature = "fs")]
use crate::utils::format_file_size;
#[cfg(feature = "fs")]
use std::io::Write;
#[cfg(feature = "fs")]
use std::path::{Path, PathBuf};
#[cfg(feature = "fs")]
use std::time::{Duration, Instant};

/// File name given to the merged document.
pub const DEFAULT_OUTPUT_NAME: &str = "merged-document.pdf";

/// Where a dispatched document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Human-readable location (a path, or the download name).
    pub location: String,

    /// Number of bytes handed over.
    pub bytes_written: u64,
}

/// Hands a finished document to the user.
pub trait OutputDispatcher {
    /// Deliver `bytes` under `file_name`.
    fn dispatch(&self, bytes: &[u8], file_name: &str) -> Result<DispatchReceipt>;
}

/// Options for writing output files.
#[cfg(feature = "fs")]
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// What to do when the target already exists.
    pub overwrite: OverwriteMode,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

#[cfg(feature = "fs")]
impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            overwrite: OverwriteMode::NoClobber,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[cfg(feature = "fs")]
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

#[cfg(feature = "fs")]
impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes merged documents into a directory on the local filesystem.
#[cfg(feature = "fs")]
#[derive(Debug, Clone)]
pub struct FileDispatcher {
    directory: PathBuf,
    options: WriteOptions,
}

#[cfg(feature = "fs")]
impl FileDispatcher {
    /// Create a dispatcher writing into `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            options: WriteOptions::default(),
        }
    }

    /// Create a dispatcher for an explicit output path.
    ///
    /// Returns the dispatcher together with the file name to dispatch under.
    pub fn for_path(path: &Path) -> (Self, String) {
        let directory = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string());

        (Self::new(directory), file_name)
    }

    /// Set the overwrite behavior.
    pub fn with_overwrite(mut self, overwrite: OverwriteMode) -> Self {
        self.options.overwrite = overwrite;
        self
    }

    /// Write directly to the target instead of via a temp file.
    pub fn non_atomic(mut self) -> Self {
        self.options.atomic = false;
        self
    }

    /// Full path a document named `file_name` would be written to.
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }

    /// Write in a blocking task and return statistics about the operation.
    pub async fn save_with_stats(&self, bytes: Vec<u8>, file_name: &str) -> Result<WriteStatistics> {
        let path = self.target_path(file_name);
        let options = self.options.clone();

        tokio::task::spawn_blocking(move || write_file(&bytes, &path, &options))
            .await
            .map_err(|e| Error::other(format!("Write task failed: {e}")))?
    }
}

#[cfg(feature = "fs")]
impl OutputDispatcher for FileDispatcher {
    fn dispatch(&self, bytes: &[u8], file_name: &str) -> Result<DispatchReceipt> {
        let stats = write_file(bytes, &self.target_path(file_name), &self.options)?;

        Ok(DispatchReceipt {
            location: stats.output_path.display().to_string(),
            bytes_written: stats.file_size,
        })
    }
}

#[cfg(feature = "fs")]
fn write_file(bytes: &[u8], path: &Path, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    if path.exists() && options.overwrite != OverwriteMode::Force {
        return Err(Error::output_exists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| Error::FailedToCreateOutput {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_path = if options.atomic {
        path.with_extension("pdf.tmp")
    } else {
        path.to_path_buf()
    };

    let file = std::fs::File::create(&write_path).map_err(|source| Error::FailedToCreateOutput {
        path: write_path.clone(),
        source,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .map_err(|source| Error::FailedToWrite {
            path: write_path.clone(),
            source,
        })?;
    drop(writer);

    if options.atomic {
        std::fs::rename(&write_path, path).map_err(|source| {
            let _ = std::fs::remove_file(&write_path);
            Error::FailedToWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;
    }

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size: bytes.len() as u64,
        output_path: path.to_path_buf(),
    })
}
