//! Output formatting and styling module.
//!
//! Every line the command-line tool prints goes through [`OutputFormatter`],
//! so the organizer core stays silent and the look of the tool can change in
//! one place.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars over the note batch
/// - Summary tables with per-folder counts
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use notetidy::output::OutputFormatter;
    /// OutputFormatter::success("Archive written");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use notetidy::output::OutputFormatter;
    /// OutputFormatter::error("No markdown files found");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar with one step per note.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use notetidy::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(12);
    /// pb.set_message("meeting.md");
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints one line per entry of the planned archive.
    pub fn tree_listing<'a>(paths: impl IntoIterator<Item = &'a str>) {
        for path in paths {
            let (folder, name) = match path.rsplit_once('/') {
                Some((folder, name)) => (format!("{}/", folder), name),
                None => (String::new(), path),
            };
            println!("  {}{}", folder.dimmed(), name);
        }
    }

    /// Prints a table of files written per folder.
    ///
    /// `folder_counts` maps a folder of the output archive (empty for the
    /// archive root) to the number of files it holds.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use notetidy::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("work".to_string(), 3);
    /// counts.insert("personal".to_string(), 1);
    /// OutputFormatter::summary_table(&counts, 4);
    /// ```
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let label = |folder: &str| {
            if folder.is_empty() {
                "(root)".to_string()
            } else {
                folder.to_string()
            }
        };

        let max_folder_len = folder_counts
            .keys()
            .map(|folder| label(folder).chars().count())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Folder" width

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in folder_counts {
            let file_word = if *count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                label(folder),
                count.to_string().green(),
                file_word,
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_folder_len
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

/// Counts the entries of each folder in a list of `/`-delimited paths.
pub fn folder_counts<'a>(paths: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for path in paths {
        let folder = path.rsplit_once('/').map_or("", |(folder, _)| folder);
        *counts.entry(folder.to_string()).or_insert(0) += 1;
    }
    counts
}
