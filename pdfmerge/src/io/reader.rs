//! File intake.
//!
//! An [`IntakeFile`] is what a front end hands the collection controller:
//! a name, an optional declared media type, and the raw bytes. The browser
//! binding builds these from `File` objects; the CLI reads them from disk
//! with [`FileReader`] (feature `fs`).
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::io::reader::FileReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = FileReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("scan.jpg")];
//! let files = reader.read_all(&paths).await?;
//! assert_eq!(files.len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::classify;

#[cfg(feature = "fs")]
use crate::error::{Error, Result};
#[cfg(feature = "fs")]
use std::path::{Path, PathBuf};

/// A file offered for intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeFile {
    /// File name, used for display and the extension allow-list.
    pub name: String,

    /// Media type declared by the host, if any.
    pub media_type: Option<String>,

    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl IntakeFile {
    /// Create an intake file without a declared media type.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: None,
            bytes,
        }
    }

    /// Attach the host-declared media type. Empty strings are ignored.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        self.media_type = (!media_type.trim().is_empty()).then_some(media_type);
        self
    }

    /// Whether the name passes the extension allow-list.
    pub fn is_accepted(&self) -> bool {
        classify::is_accepted(&self.name)
    }

    /// The declared media type, falling back to one derived from the
    /// extension.
    pub fn declared_media_type(&self) -> Option<&str> {
        self.media_type
            .as_deref()
            .or_else(|| classify::media_type_for_name(&self.name))
    }
}

/// Reads intake files from the local filesystem.
#[cfg(feature = "fs")]
#[derive(Debug, Clone, Default)]
pub struct FileReader;

#[cfg(feature = "fs")]
impl FileReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Read one file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path is not a regular file
    /// - The file cannot be read
    pub async fn read(&self, path: &Path) -> Result<IntakeFile> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| Error::file_not_found(path.to_path_buf()))?;

        if !metadata.is_file() {
            return Err(Error::not_a_file(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| Error::FailedToRead {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("Read {} ({} bytes)", path.display(), bytes.len());

        Ok(IntakeFile::new(name, bytes))
    }

    /// Read several files sequentially, in the order given.
    ///
    /// Stops at the first failure.
    pub async fn read_all(&self, paths: &[PathBuf]) -> Result<Vec<IntakeFile>> {
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            files.push(self.read(path).await?);
        }

        Ok(files)
    }
}
