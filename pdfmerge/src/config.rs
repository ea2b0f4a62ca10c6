//! Configuration module for pdfmerge.
//!
//! This module holds the validated, normalized settings a front end derives
//! from its arguments before staging and merging. It handles:
//! - Parsing of `PATH[@DEGREES]` input arguments
//! - Validation of argument combinations
//! - Application of defaults

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::{path::PathBuf, str::FromStr};

use crate::collection::MIN_MERGE_ENTRIES;
use crate::error::Error;
use crate::merge::MergeOptions;
use crate::rotation::Rotation;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - streams are written as produced.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress and drop empty streams.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = Error;
    /// Parse compression level from string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation: "none", "standard", or "maximum"
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(Error::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// One input argument: a path or glob pattern, with an initial rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    /// Path or glob pattern.
    pub pattern: String,
    /// Rotation applied to every file the pattern yields.
    pub rotation: Rotation,
}

impl InputSpec {
    /// Parse an input argument of the form `PATH[@DEGREES]`.
    ///
    /// The suffix after the last `@` is only treated as a rotation when it
    /// looks like an integer, so names such as `me@home.pdf` stay intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or the rotation is not a
    /// multiple of 90.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmerge::config::InputSpec;
    /// use pdfmerge::rotation::Rotation;
    ///
    /// let spec = InputSpec::parse("scan.png@90").unwrap();
    /// assert_eq!(spec.pattern, "scan.png");
    /// assert_eq!(spec.rotation, Rotation::Clockwise90);
    ///
    /// let spec = InputSpec::parse("me@home.pdf").unwrap();
    /// assert_eq!(spec.pattern, "me@home.pdf");
    /// assert_eq!(spec.rotation, Rotation::None);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (pattern, rotation) = match s.rsplit_once('@') {
            Some((path, suffix)) if looks_like_degrees(suffix) => {
                let degrees: i64 = suffix
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid rotation: {suffix}"))?;
                let rotation = Rotation::from_degrees(degrees)
                    .with_context(|| format!("Invalid rotation for {path}"))?;
                (path, rotation)
            }
            _ => (s, Rotation::None),
        };

        if pattern.trim().is_empty() {
            bail!("Input path cannot be empty");
        }

        Ok(Self {
            pattern: pattern.to_string(),
            rotation,
        })
    }
}

fn looks_like_degrees(suffix: &str) -> bool {
    let digits = suffix.trim().strip_prefix(['-', '+']).unwrap_or(suffix.trim());
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl FromStr for InputSpec {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s).map_err(|err| Error::invalid_input(s, format!("{err:#}")))
    }
}

/// Complete configuration for a merge run.
///
/// This structure contains all settings needed to stage and merge,
/// derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input arguments (in merge order).
    pub inputs: Vec<InputSpec>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Dry run mode - stage and validate without writing output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// Allow merging a single entry.
    pub allow_single: bool,

    /// Print statistics as JSON.
    pub json: bool,
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[InputSpec] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies and invalid combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.output.as_os_str().is_empty() {
            bail!("Output path cannot be empty");
        }

        // Validate that output path is not in inputs
        for input in &self.inputs {
            if PathBuf::from(&input.pattern) == self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        Ok(())
    }

    /// Options for the merge pipeline.
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            compression: self.compression,
            metadata: self.metadata.clone(),
        }
    }

    /// Minimum number of staged entries required before merging.
    pub fn min_entries(&self) -> usize {
        if self.allow_single {
            1
        } else {
            MIN_MERGE_ENTRIES
        }
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
