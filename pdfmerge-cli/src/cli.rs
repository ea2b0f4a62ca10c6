//! CLI argument parsing for pdfmerge.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use pdfmerge::config::{CompressionLevel, Config, InputSpec, Metadata, OverwriteMode};
use pdfmerge::error::{Error, Result};
use pdfmerge::io::DEFAULT_OUTPUT_NAME;

/// Merge PDF documents and PNG/JPEG images into a single PDF.
///
/// Files are merged in the order given. Every page of a PDF input is
/// copied; every image becomes one page sized to the picture. Nothing
/// leaves the machine.
#[derive(Parser, Debug)]
#[command(name = "pdfmerge")]
#[command(version)]
#[command(about = "Merge PDF documents and images into a single PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input files to merge (in order), optionally rotated
    ///
    /// Accepts .pdf, .png, .jpg and .jpeg files or glob patterns.
    /// Append @DEGREES (a multiple of 90) to rotate that input clockwise.
    /// Other file types are skipped with a warning.
    ///
    /// Examples:
    ///   pdfmerge report.pdf scan.jpg@90
    ///   pdfmerge 'chapters/*.pdf' cover.png -o book.pdf
    #[arg(required = true, value_name = "FILE[@DEGREES]")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT_NAME)]
    pub output: PathBuf,

    /// Dry run - stage inputs and show the merge order without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show details for each staged file
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Compression level for output PDF
    ///
    /// - none: Write streams as produced
    /// - standard: Compress uncompressed streams (default)
    /// - maximum: Also drop empty streams and unused objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Allow a merge with a single input file
    #[arg(long)]
    pub allow_single: bool,

    /// Print merge statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input has an invalid rotation suffix
    /// - Compression level is invalid
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        let inputs = self
            .inputs
            .iter()
            .map(|input| InputSpec::from_str(input))
            .collect::<Result<Vec<_>>>()?;

        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            inputs,
            output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            compression,
            metadata,
            allow_single: self.allow_single,
            json: self.json,
        };

        config.validate().map_err(|e| {
            Error::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// # Errors
    ///
    /// Returns an error if no inputs are given or the compression level is
    /// unknown.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::invalid_config("No input files specified"));
        }

        if !["none", "standard", "maximum"].contains(&self.compression.as_str()) {
            return Err(Error::invalid_config(format!(
                "Invalid compression level: {}",
                self.compression
            )));
        }

        Ok(())
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmerge::rotation::Rotation;
    use rstest::rstest;

    fn create_test_cli(inputs: Vec<&str>, output: &str) -> Cli {
        Cli {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: PathBuf::from(output),
            dry_run: false,
            verbose: false,
            force: false,
            no_clobber: false,
            quiet: false,
            compression: "standard".to_string(),
            title: None,
            author: None,
            subject: None,
            keywords: None,
            allow_single: false,
            json: false,
        }
    }

    #[test]
    fn test_basic_cli_to_config() {
        let cli = create_test_cli(vec!["a.pdf", "b.png"], "out.pdf");
        let config = cli.to_config().unwrap();

        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.output, PathBuf::from("out.pdf"));
        assert_eq!(config.min_entries(), 2);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_parse_from_args() {
        let cli = Cli::try_parse_from(["pdfmerge", "a.pdf", "scan.jpg@270", "-c", "none"]).unwrap();

        assert_eq!(cli.output, PathBuf::from("merged-document.pdf"));
        let config = cli.to_config().unwrap();
        assert_eq!(config.inputs[1].pattern, "scan.jpg");
        assert_eq!(config.inputs[1].rotation, Rotation::Clockwise270);
        assert_eq!(config.compression, CompressionLevel::None);
    }

    #[rstest]
    #[case("scan.png@90", Rotation::Clockwise90)]
    #[case("scan.png@-90", Rotation::Clockwise270)]
    #[case("scan.png@450", Rotation::Clockwise90)]
    #[case("scan.png", Rotation::None)]
    fn test_input_rotation(#[case] input: &str, #[case] expected: Rotation) {
        let cli = create_test_cli(vec![input, "b.pdf"], "out.pdf");
        let config = cli.to_config().unwrap();

        assert_eq!(config.inputs[0].pattern, "scan.png");
        assert_eq!(config.inputs[0].rotation, expected);
    }

    #[test]
    fn test_invalid_input_rotation() {
        let cli = create_test_cli(vec!["scan.png@45"], "out.pdf");

        assert!(matches!(cli.to_config(), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_cli_with_invalid_compression() {
        let mut cli = create_test_cli(vec!["a.pdf"], "out.pdf");
        cli.compression = "invalid".to_string();

        assert!(cli.to_config().is_err());
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_overwrite_modes() {
        let mut cli = create_test_cli(vec!["a.pdf"], "out.pdf");

        let config = cli.to_config().unwrap();
        assert_eq!(config.overwrite_mode, OverwriteMode::Prompt);

        cli.force = true;
        let config = cli.to_config().unwrap();
        assert_eq!(config.overwrite_mode, OverwriteMode::Force);

        cli.force = false;
        cli.no_clobber = true;
        let config = cli.to_config().unwrap();
        assert_eq!(config.overwrite_mode, OverwriteMode::NoClobber);
    }

    #[test]
    fn test_cli_with_metadata() {
        let mut cli = create_test_cli(vec!["a.pdf"], "out.pdf");
        cli.title = Some("Test Title".to_string());
        cli.author = Some("  ".to_string());

        let config = cli.to_config().unwrap();
        assert_eq!(config.metadata.title, Some("Test Title".to_string()));
        assert_eq!(config.metadata.author, None);
    }

    #[test]
    fn test_allow_single_lowers_minimum() {
        let mut cli = create_test_cli(vec!["a.pdf"], "out.pdf");
        cli.allow_single = true;

        assert_eq!(cli.to_config().unwrap().min_entries(), 1);
    }

    #[test]
    fn test_output_same_as_input_rejected() {
        let cli = create_test_cli(vec!["a.pdf", "out.pdf"], "out.pdf");

        assert!(matches!(cli.to_config(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_cli_validate_no_inputs() {
        let mut cli = create_test_cli(vec!["a.pdf"], "out.pdf");
        cli.inputs.clear();

        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut cli = create_test_cli(vec!["a.pdf"], "out.pdf");
        assert_eq!(cli.log_level(), "warn");

        cli.verbose = true;
        assert_eq!(cli.log_level(), "debug");

        cli.verbose = false;
        cli.quiet = true;
        assert_eq!(cli.log_level(), "error");
    }
}
