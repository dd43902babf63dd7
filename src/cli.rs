//! Command-line interface module for notetidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading and command-line overrides
//! - Input collection, the organize run and archive output
//! - Progress and warning display

use crate::archive::{default_archive_name, write_archive_to_path};
use crate::batch::{DocumentOutcome, RunError, run_batch};
use crate::config::Config;
use crate::input::InputCollector;
use crate::organizer::{OrganizeEvent, OrganizeObserver};
use crate::output::{OutputFormatter, folder_counts};
use chrono::Local;
use clap::Parser;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// Reorganize tagged markdown notes into a zip archive with one folder per tag.
#[derive(Parser, Debug, Clone)]
#[command(name = "notetidy", version, about)]
pub struct Args {
    /// Note files, ZIP exports, or directories containing them.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Where to write the archive. A directory gets the default file name.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file to use instead of the default lookup.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the planned archive contents without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Also write a `.url` shortcut next to every link stub.
    #[arg(long)]
    pub url_shortcuts: bool,
}

/// Progress bar and warning printer for one run.
struct CliObserver {
    pb: ProgressBar,
}

impl OrganizeObserver for CliObserver {
    fn on_event(&mut self, event: &OrganizeEvent) {
        match event {
            OrganizeEvent::DocumentStarted { filename, .. } => {
                self.pb.set_message(filename.clone());
            }
            OrganizeEvent::DocumentPlaced { .. } => self.pb.inc(1),
            OrganizeEvent::DocumentFailed {
                filename, reason, ..
            } => {
                self.pb.suspend(|| {
                    OutputFormatter::warning(&format!("Skipping {}: {}", filename, reason))
                });
                self.pb.inc(1);
            }
            OrganizeEvent::AttachmentMissing {
                filename,
                attachment,
            } => self.pb.suspend(|| {
                OutputFormatter::warning(&format!(
                    "{}: attachment {} was not found in the inputs",
                    filename, attachment
                ))
            }),
            OrganizeEvent::UndeclaredAttachment {
                filename,
                attachment,
            } => self.pb.suspend(|| {
                OutputFormatter::info(&format!(
                    "{}: {} is referenced but not listed in the header",
                    filename, attachment
                ))
            }),
            OrganizeEvent::PathOverwritten { path, filename } => self.pb.suspend(|| {
                OutputFormatter::warning(&format!(
                    "{} overwrites {} written by an earlier note",
                    filename, path
                ))
            }),
        }
    }
}

/// Runs the CLI application with the given arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use notetidy::cli::{Args, run_cli};
///
/// let args = Args::parse_from(["notetidy", "export.zip", "-o", "organized.zip"]);
/// if let Err(e) = run_cli(&args) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<(), String> {
    let mut config = Config::load(args.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    if args.url_shortcuts {
        config.organize.emit_url_shortcuts = true;
    }
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    let options = &config.organize;

    // Resolved up front so an earlier run's archive is not read back in.
    let output = resolve_output_path(args.output.as_deref());
    let inputs = InputCollector::new(options.document_extension(), &filters)
        .skipping(&output)
        .collect(&args.inputs)
        .map_err(|e| e.to_string())?;

    OutputFormatter::info(&format!(
        "Found {} note(s) and {} attachment(s)",
        inputs.documents.len(),
        inputs.registry.len()
    ));
    for (category, count) in &inputs.attachment_kinds {
        OutputFormatter::plain(&format!("  {}: {}", category.label(), count));
    }
    for archive in &inputs.archives {
        OutputFormatter::plain(&format!("  extracted {}", archive.display()));
    }

    let mut observer = CliObserver {
        pb: OutputFormatter::create_progress_bar(inputs.documents.len() as u64),
    };
    let result = run_batch(&inputs.documents, &inputs.registry, options, &mut observer);
    observer.pb.finish_and_clear();
    let report = result.map_err(|e| e.to_string())?;

    let counts = folder_counts(report.tree.paths());

    if args.dry_run {
        OutputFormatter::dry_run_notice("The archive would contain:");
        OutputFormatter::tree_listing(report.tree.paths());
        OutputFormatter::summary_table(&counts, report.tree.len());
        OutputFormatter::dry_run_notice("No archive was written.");
    } else {
        write_archive_to_path(&report.tree, &output, options.compression_level).map_err(
            |e| {
                RunError::ArchiveWrite {
                    path: output.clone(),
                    reason: e.to_string(),
                }
                .to_string()
            },
        )?;
        OutputFormatter::summary_table(&counts, report.tree.len());
        OutputFormatter::success(&format!("Archive written to {}", output.display()));
    }

    OutputFormatter::success(&format!(
        "{} folders created, {} files organized",
        report.folders().len(),
        report.organized_count()
    ));

    if report.failed_count() > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized:",
            report.failed_count()
        ));
        for outcome in &report.outcomes {
            if let DocumentOutcome::Failed { origin, error, .. } = outcome {
                OutputFormatter::plain(&format!("  - {}: {}", origin, error));
            }
        }
    }

    Ok(())
}

/// Picks the archive path: the requested one, the default name inside a
/// requested directory, or the default name in the working directory.
pub fn resolve_output_path(requested: Option<&Path>) -> PathBuf {
    let default_name = default_archive_name(Local::now().date_naive());
    match requested {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_name),
    }
}
