//! pdfmerge - Merge PDF documents and images into a single PDF.
//!
//! Stages the given files in argument order, applies per-file rotation,
//! and writes one merged document locally.

mod cli;

use clap::Parser;
use std::process;

use crate::cli::Cli;
use pdfmerge::EntryList;
use pdfmerge::classify;
use pdfmerge::config::{Config, OverwriteMode};
use pdfmerge::error::{Error, Result};
use pdfmerge::io::{FileDispatcher, FileReader};
use pdfmerge::merge::MergePipeline;
use pdfmerge::output::{OutputFormatter, display_entry_list, display_merge_statistics};
use pdfmerge::preview::PreviewGenerator;
use pdfmerge::rotation::Rotation;
use pdfmerge::utils::collect_paths_for_patterns;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    let config = cli.to_config()?;

    // JSON mode keeps stdout for the report
    let formatter = if config.json {
        OutputFormatter::quiet()
    } else {
        OutputFormatter::from_config(&config)
    };

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfmerge::NAME, pdfmerge::VERSION));
        formatter.blank_line();
    }

    formatter.info("Reading input files...");
    let list = stage_inputs(&config, &formatter).await?;

    if list.len() < config.min_entries() {
        return Err(Error::NotEnoughEntries {
            found: list.len(),
            required: config.min_entries(),
        });
    }

    if formatter.should_print() {
        display_entry_list(&formatter, &list);
        formatter.blank_line();
    }

    if config.dry_run {
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output.display()));
        formatter.info("  Run without --dry-run to create the merged PDF");
        return Ok(());
    }

    handle_output_overwrite(&config, &formatter)?;

    formatter.info("Merging files...");
    let pipeline = MergePipeline::with_options(config.merge_options());
    let output = list.merge_with_progress(&pipeline, |progress| {
        formatter.progress(progress.position, progress.total, Some(progress.name));
    })?;

    if formatter.should_print() {
        formatter.blank_line();
        display_merge_statistics(&formatter, &output.statistics);
    }

    formatter.info(&format!("Writing to: {}", config.output.display()));

    // Existing output was either absent or confirmed above
    let (dispatcher, file_name) = FileDispatcher::for_path(&config.output);
    let write_stats = dispatcher
        .with_overwrite(OverwriteMode::Force)
        .save_with_stats(output.bytes, &file_name)
        .await?;

    if config.json {
        let report = serde_json::json!({
            "output": write_stats.output_path,
            "bytesWritten": write_stats.file_size,
            "statistics": output.statistics,
        });
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| Error::other(format!("Failed to render JSON: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    if formatter.should_print() {
        formatter.blank_line();
        formatter.success(&format!(
            "Successfully created {} ({})",
            write_stats.output_path.display(),
            write_stats.format_file_size()
        ));

        if formatter.is_verbose() {
            formatter.detail(
                "Write time",
                &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
            );
            if !config.metadata.is_empty() {
                formatter.detail("Metadata", "Set");
            }
        }
    }

    Ok(())
}

/// Expand every input, read the accepted files and stage them in order.
///
/// Files outside the allow-list are skipped with a warning. Nothing shows
/// previews here, so images are not decoded for thumbnails.
async fn stage_inputs(config: &Config, formatter: &OutputFormatter) -> Result<EntryList> {
    let reader = FileReader::new();
    let mut list = EntryList::with_previews(PreviewGenerator::new().without_image_thumbnails());

    for input in config.inputs() {
        for path in collect_paths_for_patterns([input.pattern.as_str()])? {
            if !classify::is_accepted(&path.to_string_lossy()) {
                formatter.warning(&format!(
                    "Skipping {}: only PDF, PNG and JPEG files are accepted",
                    path.display()
                ));
                continue;
            }

            let file = reader.read(&path).await?;
            let Some(id) = list.append_file(file) else {
                continue;
            };

            if input.rotation != Rotation::None {
                list.set_rotation(id, input.rotation);
            }
            formatter.debug(&format!("Staged {} as {id}", path.display()));
        }
    }

    Ok(list)
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    if !config.output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(Error::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask in quiet mode
            if formatter.is_quiet() {
                return Err(Error::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| Error::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(Error::Cancelled)
            }
        }
    }
}
