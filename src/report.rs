//! Progress transcript.
//!
//! The cleaner emits one [`Event`] per distinct outcome. [`ConsoleSink`] turns
//! them into the colored lines the operator reads; [`RecordingSink`] keeps them
//! for inspection.

use colored::*;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::outcome::{CleanupStats, DeletionOutcome, DeletionStatus};
use crate::version::VersionToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RootNotFound { label: String, root: PathBuf },
    NoCandidates { label: String },
    KeeperSelected { label: String, version: String, path: PathBuf },
    NothingToDelete { label: String },
    Deleted(DeletionOutcome),
    ArchiveListingFailed { path: PathBuf, message: String },
    ConfigurationFailed { label: String, message: String },
    TargetNotFound { label: String, path: PathBuf },
    Section,
}

impl Event {
    pub fn keeper(label: &str, version: &VersionToken, path: &Path) -> Self {
        Event::KeeperSelected {
            label: label.to_string(),
            version: version.to_string(),
            path: path.to_path_buf(),
        }
    }
}

pub trait ReportSink {
    fn emit(&mut self, event: Event);

    /// Called right before a potentially slow delete starts.
    fn deleting(&mut self, _path: &Path) {}
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deletions(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.events.iter().filter_map(|e| match e {
            Event::Deleted(outcome) => Some(outcome),
            _ => None,
        })
    }
}

impl ReportSink for RecordingSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Colored terminal transcript.
pub struct ConsoleSink {
    verbose: bool,
    spinner: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new(verbose: bool) -> Self {
        ConsoleSink {
            verbose,
            spinner: None,
        }
    }

    fn log_action(&self, message: &str) {
        if self.verbose {
            println!("  {} {}", "→".green(), message);
        }
    }

    fn log_error(&self, message: &str) {
        println!("  {} {}", "✗".red(), message);
    }

    fn log_success(&self, message: &str) {
        println!("  {} {}", "✓".green(), message);
    }

    fn log_info(&self, message: &str) {
        println!("  {} {}", "ℹ".blue(), message);
    }

    fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print_deletion(&self, outcome: &DeletionOutcome) {
        let path = outcome.path.display();
        match &outcome.status {
            DeletionStatus::Succeeded { bytes } => self.log_success(&format!(
                "{}: Deleted {} ({})",
                outcome.name,
                path,
                format_size(*bytes, BINARY).green()
            )),
            DeletionStatus::PermissionDenied(_) => self.log_error(&format!(
                "{}: Access denied at {}. {}",
                outcome.name,
                path,
                "Try running with elevated privileges.".yellow()
            )),
            DeletionStatus::InUseOrIo(message) => self.log_error(&format!(
                "{}: In use or I/O error at {}: {}",
                outcome.name,
                path,
                message.red()
            )),
            DeletionStatus::Other(message) => self.log_error(&format!(
                "{}: Failed to delete {}: {}",
                outcome.name,
                path,
                message.red()
            )),
        }
    }

    pub fn print_banner(&self, started: &str) {
        println!("{}", "🧹 App Cleanup Tool (Rust Edition)".bold().blue());
        println!("{}", "===============================================".blue());
        println!("{} {}\n", "Started at".dimmed(), started.dimmed());
    }

    pub fn print_summary(&self, stats: &CleanupStats, finished: &str) {
        println!("\n{}", "=".repeat(60).green());
        println!("{}", "✨ Cleanup Complete!".bold().green());
        println!("{}", "=".repeat(60).green());
        println!(
            "  {} {}",
            "Items removed:".bold(),
            stats.removed.to_string().yellow()
        );
        if stats.failed > 0 {
            println!(
                "  {} {}",
                "Failed:".bold(),
                stats.failed.to_string().red()
            );
        }
        println!(
            "  {} {}",
            "Space freed:".bold(),
            format_size(stats.space_freed, BINARY).bold().green()
        );
        println!("  {} {}", "Finished at".dimmed(), finished.dimmed());
    }
}

impl ReportSink for ConsoleSink {
    fn emit(&mut self, event: Event) {
        self.finish_spinner();
        match event {
            Event::RootNotFound { label, root } => self.log_info(&format!(
                "{}: Directory not found at {}",
                label.bold(),
                root.display()
            )),
            Event::NoCandidates { label } => {
                self.log_info(&format!("{}: No versioned folders found", label.bold()))
            }
            Event::KeeperSelected {
                label,
                version,
                path,
            } => {
                self.log_info(&format!(
                    "{} - Latest version: {}",
                    label.bold(),
                    version.cyan()
                ));
                self.log_action(&format!("Keeping {}", path.display()));
            }
            Event::NothingToDelete { label } => {
                self.log_info(&format!("{}: No old versions to delete", label.bold()))
            }
            Event::Deleted(outcome) => self.print_deletion(&outcome),
            Event::ArchiveListingFailed { path, message } => self.log_error(&format!(
                "Error accessing installer directory {}: {}",
                path.display(),
                message.red()
            )),
            Event::ConfigurationFailed { label, message } => self.log_error(&format!(
                "Error processing {}: {}",
                label.bold(),
                message.red()
            )),
            Event::TargetNotFound { label, path } => self.log_info(&format!(
                "{}: Nothing to remove at {}",
                label.bold(),
                path.display()
            )),
            Event::Section => println!("{}", "─".repeat(40).dimmed()),
        }
    }

    fn deleting(&mut self, path: &Path) {
        self.finish_spinner();
        self.log_action(&format!("Deleting {}", path.display()));

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.yellow} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Deleting {}", path.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }
}
