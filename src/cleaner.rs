//! Versioned directory reconciliation.
//!
//! For each configured root the newest version folder is kept and every
//! strictly older sibling is deleted. Each deletion is isolated: a locked or
//! protected folder is reported and the loop moves on.

use std::path::Path;
use tracing::{debug, warn};

use crate::config::{CleanupPlan, RemovalTarget, ScanConfiguration, ARCHIVE_PATTERN, INSTALLER_DIR};
use crate::error::CleanupError;
use crate::fs::Filesystem;
use crate::outcome::{
    classify, CandidateEntry, CleanupStats, DeletionOutcome, DeletionStatus, ReconcileOutcome,
};
use crate::report::{Event, ReportSink};
use crate::version::parse_version;

pub struct CleanupContext<F, S> {
    fs: F,
    sink: S,
    stats: CleanupStats,
}

impl<F: Filesystem, S: ReportSink> CleanupContext<F, S> {
    pub fn new(fs: F, sink: S) -> Self {
        CleanupContext {
            fs,
            sink,
            stats: CleanupStats::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Totals of every configuration and target processed through [`Self::run`].
    pub fn stats(&self) -> &CleanupStats {
        &self.stats
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Process every configuration, then every unconditional target.
    ///
    /// A section break is reported after each run of configurations sharing a
    /// group, and after the unconditional targets.
    pub fn run(&mut self, plan: &CleanupPlan) -> CleanupStats {
        let mut configs = plan.versioned.iter().peekable();
        while let Some(config) = configs.next() {
            let outcome = self.reconcile(config);
            let totals = outcome.stats();
            debug!(label = %config.label, removed = totals.removed, failed = totals.failed, "Configuration done");
            self.stats.add(&totals);

            let group_ends = configs.peek().map_or(true, |next| next.group != config.group);
            if group_ends {
                self.sink.emit(Event::Section);
            }
        }

        for target in &plan.remove {
            if let Some(outcome) = self.remove_target(target) {
                self.stats.record(&outcome);
            }
        }
        self.sink.emit(Event::Section);

        self.stats
    }

    /// Keep the newest version folder under `config.root`, delete the older ones.
    pub fn reconcile(&mut self, config: &ScanConfiguration) -> ReconcileOutcome {
        if !self.fs.is_dir(&config.root) {
            self.sink.emit(Event::RootNotFound {
                label: config.label.clone(),
                root: config.root.clone(),
            });
            return ReconcileOutcome::RootNotFound;
        }

        let candidates = match self.discover(config) {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(label = %config.label, error = %err, "Discovery failed");
                self.sink.emit(Event::ConfigurationFailed {
                    label: config.label.clone(),
                    message: err.to_string(),
                });
                return ReconcileOutcome::Failed(err);
            }
        };

        let Some(keeper) = select_keeper(&candidates).cloned() else {
            self.sink.emit(Event::NoCandidates {
                label: config.label.clone(),
            });
            return ReconcileOutcome::NoCandidates;
        };
        self.sink
            .emit(Event::keeper(&config.label, &keeper.version, &keeper.path));

        let stale: Vec<&CandidateEntry> = candidates
            .iter()
            .filter(|c| c.version < keeper.version)
            .collect();

        let mut deletions = Vec::with_capacity(stale.len());
        if stale.is_empty() {
            self.sink.emit(Event::NothingToDelete {
                label: config.label.clone(),
            });
        } else {
            for entry in stale {
                deletions.push(self.delete_directory(&entry.path, &entry.name));
            }
        }

        let archives = if config.cleanup_archives {
            self.cleanup_archives(&keeper.path.join(INSTALLER_DIR))
        } else {
            Vec::new()
        };

        ReconcileOutcome::Pruned {
            keeper,
            deletions,
            archives,
        }
    }

    fn discover(&self, config: &ScanConfiguration) -> Result<Vec<CandidateEntry>, CleanupError> {
        let entries = self.fs.list_dirs(&config.root, &config.pattern)?;

        let candidates = entries
            .into_iter()
            .filter_map(|entry| match parse_version(&entry.name) {
                Some(version) => Some(CandidateEntry {
                    name: entry.name,
                    path: entry.path,
                    version,
                }),
                None => {
                    debug!(label = %config.label, folder = %entry.name, "Skipping unversioned folder");
                    None
                }
            })
            .collect();

        Ok(candidates)
    }

    /// Recursively delete `path`. Never fails; the outcome says what happened.
    pub fn delete_directory(&mut self, path: &Path, name: &str) -> DeletionOutcome {
        let bytes = self.fs.size_of(path);
        self.sink.deleting(path);
        let result = self.fs.remove_dir_all(path);
        self.finish(path, name, bytes, result)
    }

    /// Delete a single file. Never fails; the outcome says what happened.
    pub fn delete_file(&mut self, path: &Path, name: &str) -> DeletionOutcome {
        let bytes = self.fs.size_of(path);
        let result = self.fs.remove_file(path);
        self.finish(path, name, bytes, result)
    }

    fn finish(
        &mut self,
        path: &Path,
        name: &str,
        bytes: u64,
        result: std::io::Result<()>,
    ) -> DeletionOutcome {
        let status = match result {
            Ok(()) => DeletionStatus::Succeeded { bytes },
            Err(err) => {
                debug!(path = %path.display(), error = %err, "Delete failed");
                classify(&err)
            }
        };

        let outcome = DeletionOutcome {
            name: name.to_string(),
            path: path.to_path_buf(),
            status,
        };
        self.sink.emit(Event::Deleted(outcome.clone()));
        outcome
    }

    /// Delete every `*.7z` file directly under `installer`.
    pub fn cleanup_archives(&mut self, installer: &Path) -> Vec<DeletionOutcome> {
        if !self.fs.is_dir(installer) {
            return Vec::new();
        }

        let archives = match self.fs.list_files(installer, ARCHIVE_PATTERN) {
            Ok(archives) => archives,
            Err(err) => {
                self.sink.emit(Event::ArchiveListingFailed {
                    path: installer.to_path_buf(),
                    message: err.to_string(),
                });
                return Vec::new();
            }
        };

        archives
            .iter()
            .map(|archive| self.delete_file(&archive.path, &archive.name))
            .collect()
    }

    /// Delete an unversioned directory outright; an absent path is not an error.
    pub fn remove_target(&mut self, target: &RemovalTarget) -> Option<DeletionOutcome> {
        if !self.fs.exists(&target.path) {
            self.sink.emit(Event::TargetNotFound {
                label: target.label.clone(),
                path: target.path.clone(),
            });
            return None;
        }
        Some(self.delete_directory(&target.path, &target.label))
    }
}

/// Highest version wins; among equal versions the smallest folder name does.
pub fn select_keeper(candidates: &[CandidateEntry]) -> Option<&CandidateEntry> {
    candidates.iter().reduce(|best, next| {
        match next.version.cmp(&best.version) {
            std::cmp::Ordering::Greater => next,
            std::cmp::Ordering::Equal if next.name < best.name => next,
            _ => best,
        }
    })
}
