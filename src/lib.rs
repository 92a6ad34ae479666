//! App Cleanup - prune stale versioned install folders
//!
//! Desktop applications that self-update (browsers, Electron apps) leave one
//! folder per release behind. For each configured root this crate keeps the
//! newest version folder, deletes the older ones, and can sweep leftover
//! installer archives from the kept version.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod fs;
pub mod outcome;
pub mod report;
pub mod version;

// Re-export commonly used items
pub use cleaner::{select_keeper, CleanupContext};
pub use config::{CleanupPlan, RemovalTarget, ScanConfiguration};
pub use error::{CleanupError, ConfigError};
pub use fs::{DirEntry, Filesystem, LocalFs};
pub use outcome::{
    CandidateEntry, CleanupStats, DeletionOutcome, DeletionStatus, ReconcileOutcome,
};
pub use report::{ConsoleSink, Event, RecordingSink, ReportSink};
pub use version::{parse_version, VersionToken};
