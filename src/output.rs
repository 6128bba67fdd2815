//! Output formatting and styling module.
//!
//! Everything the CLI prints goes through here: colored status lines, the
//! progress bar over a batch, and the summary tables. [`ConsoleObserver`]
//! turns the events emitted by the sorters into these lines.

use crate::batch::SortReport;
use crate::events::{RouterEvent, RouterObserver};
use crate::router::RunReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// How much the console observer prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Only failures.
    Quiet,
    /// Moves, failures and skipped directories, with a progress bar.
    #[default]
    Normal,
    /// Every event, including extracted tags and match decisions.
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Consistent styling for all CLI output.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green line with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red line with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Progress bar for a batch of `total` files.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Summary table for a tag routing run.
    pub fn run_summary(report: &RunReport) {
        let s = &report.summary;
        let rows = [
            (if report.dry_run { "Would move" } else { "Moved" }, s.moved + s.planned),
            ("Already in place", s.already_in_place),
            ("Skipped (no tags)", s.skipped_no_tags),
            ("Skipped (no match)", s.skipped_no_match),
            ("Failed", s.failed),
        ];
        Self::table("Outcome", &rows, s.total());
    }

    /// Summary table for an extension or prefix sorting pass.
    pub fn sort_summary(report: &SortReport) {
        let mut rows: Vec<(&str, usize)> = report
            .category_counts
            .iter()
            .map(|(category, count)| (category.as_str(), *count))
            .collect();
        if report.unmatched > 0 {
            rows.push(("(left in place)", report.unmatched));
        }
        if report.failed > 0 {
            rows.push(("(failed)", report.failed));
        }
        Self::table("Category", &rows, report.files.len());
    }

    fn table(label: &str, rows: &[(&str, usize)], total: usize) {
        Self::header("SUMMARY");

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(label.len());

        println!("{:<width$} | {}", label.bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (name, count) in rows {
            println!(
                "{:<width$} | {} {}",
                name,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Prints sorter events to the terminal.
pub struct ConsoleObserver {
    verbosity: Verbosity,
    progress: Option<ProgressBar>,
}

impl ConsoleObserver {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            progress: None,
        }
    }

    /// Prints through the progress bar when one is active so lines do not
    /// tear it.
    fn line(&self, message: String) {
        match &self.progress {
            Some(pb) => pb.println(message),
            None => println!("{}", message),
        }
    }

    fn tick(&self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    pub fn finish(&mut self) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
    }
}

impl RouterObserver for ConsoleObserver {
    fn on_event(&mut self, event: &RouterEvent) {
        let verbose = self.verbosity >= Verbosity::Verbose;
        let normal = self.verbosity >= Verbosity::Normal;

        match event {
            RouterEvent::IndexBuilt { root, folders } => {
                if normal {
                    OutputFormatter::info(&format!(
                        "Indexed {} folders under {}",
                        folders,
                        root.display()
                    ));
                }
            }
            RouterEvent::DirectorySkipped { path, reason } => {
                if normal {
                    OutputFormatter::warning(&format!(
                        "Skipping unreadable directory {}: {}",
                        path.display(),
                        reason
                    ));
                }
            }
            RouterEvent::EntrySkipped { path, reason } => {
                if normal {
                    OutputFormatter::warning(&format!(
                        "Skipping unreadable entry in {}: {}",
                        path.display(),
                        reason
                    ));
                }
            }
            RouterEvent::FilesFound { dir, count } => {
                if normal {
                    OutputFormatter::info(&format!("Found {} files in {}", count, dir.display()));
                }
                if self.verbosity == Verbosity::Normal && *count > 0 {
                    self.progress = Some(OutputFormatter::create_progress_bar(*count as u64));
                }
            }
            RouterEvent::TagsExtracted {
                document,
                tags,
                source,
            } => {
                if verbose {
                    self.line(format!(
                        " - {} tags {:?} ({:?})",
                        name_of(document),
                        tags,
                        source
                    ));
                }
            }
            RouterEvent::DateTagsIgnored { document, ignored } => {
                if verbose {
                    self.line(format!(
                        "   {} ignoring date tags {:?}",
                        name_of(document),
                        ignored
                    ));
                }
            }
            RouterEvent::NoTags { document } => {
                if verbose {
                    self.line(format!(" - {}: no tags", name_of(document)).dimmed().to_string());
                }
                self.tick();
            }
            RouterEvent::ReadFailed { document, error } => {
                self.line(format!(
                    "{} Could not read {}: {}",
                    "✗".red(),
                    document.display(),
                    error
                ));
                self.tick();
            }
            RouterEvent::MatchChosen {
                document,
                tag,
                folder,
                depth,
                ..
            } => {
                if verbose {
                    self.line(format!(
                        "   {} matched [[{}]] -> {} (depth {})",
                        name_of(document),
                        tag,
                        folder.display(),
                        depth
                    ));
                }
            }
            RouterEvent::NoMatch { document, tags } => {
                if verbose {
                    self.line(
                        format!(" - {}: no folder for {:?}", name_of(document), tags)
                            .dimmed()
                            .to_string(),
                    );
                }
                self.tick();
            }
            RouterEvent::Categorized { file, category } => {
                if verbose {
                    self.line(format!(" - {} [{}]", name_of(file), category));
                }
            }
            RouterEvent::Moved { from, to } => {
                if normal {
                    self.line(format!(
                        "{} {} -> {}",
                        "✓".green(),
                        name_of(from),
                        to.display()
                    ));
                }
                self.tick();
            }
            RouterEvent::Planned { from, to } => {
                if normal {
                    self.line(
                        format!("[DRY RUN] {} -> {}", name_of(from), to.display())
                            .yellow()
                            .to_string(),
                    );
                }
                self.tick();
            }
            RouterEvent::AlreadyInPlace { path } => {
                if verbose {
                    self.line(format!("   {} already in place", name_of(path)));
                }
                self.tick();
            }
            RouterEvent::MoveFailed { file, error } => {
                self.line(format!("{} {}: {}", "✗".red(), name_of(file), error));
                self.tick();
            }
        }
    }
}
