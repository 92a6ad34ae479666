use std::io;
use std::path::PathBuf;

use crate::error::CleanupError;
use crate::version::VersionToken;

/// How a single deletion attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionStatus {
    Succeeded { bytes: u64 },
    PermissionDenied(String),
    /// Locked by another process, or the device reported an I/O failure.
    InUseOrIo(String),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub name: String,
    pub path: PathBuf,
    pub status: DeletionStatus,
}

#[cfg(target_os = "linux")]
const BUSY_OS_ERRORS: &[i32] = &[
    16, // EBUSY
    26, // ETXTBSY
    5,  // EIO
    39, // ENOTEMPTY, something wrote into the tree mid-delete
];

#[cfg(all(unix, not(target_os = "linux")))]
const BUSY_OS_ERRORS: &[i32] = &[
    16, // EBUSY
    26, // ETXTBSY
    5,  // EIO
    66, // ENOTEMPTY
];

#[cfg(windows)]
const BUSY_OS_ERRORS: &[i32] = &[
    32,   // ERROR_SHARING_VIOLATION
    33,   // ERROR_LOCK_VIOLATION
    145,  // ERROR_DIR_NOT_EMPTY
    1117, // ERROR_IO_DEVICE
];

#[cfg(not(any(unix, windows)))]
const BUSY_OS_ERRORS: &[i32] = &[];

/// Map an I/O error from a delete call onto a [`DeletionStatus`].
pub fn classify(err: &io::Error) -> DeletionStatus {
    let message = err.to_string();

    if err.kind() == io::ErrorKind::PermissionDenied {
        return DeletionStatus::PermissionDenied(message);
    }

    let busy_code = err
        .raw_os_error()
        .is_some_and(|code| BUSY_OS_ERRORS.contains(&code));
    let transient_kind = matches!(
        err.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::Interrupted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::WriteZero
    );

    if busy_code || transient_kind {
        DeletionStatus::InUseOrIo(message)
    } else {
        DeletionStatus::Other(message)
    }
}

/// Version folder picked as newest under a scan root.
#[derive(Debug, Clone)]
pub struct CandidateEntry {
    pub name: String,
    pub path: PathBuf,
    pub version: VersionToken,
}

/// Result of reconciling one configured root.
#[derive(Debug)]
pub enum ReconcileOutcome {
    RootNotFound,
    NoCandidates,
    Pruned {
        keeper: CandidateEntry,
        deletions: Vec<DeletionOutcome>,
        archives: Vec<DeletionOutcome>,
    },
    Failed(CleanupError),
}

impl ReconcileOutcome {
    /// Totals for the deletions this reconcile performed.
    pub fn stats(&self) -> CleanupStats {
        let mut stats = CleanupStats::new();
        if let ReconcileOutcome::Pruned {
            deletions,
            archives,
            ..
        } = self
        {
            for outcome in deletions.iter().chain(archives) {
                stats.record(outcome);
            }
        }
        stats
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub removed: usize,
    pub failed: usize,
    pub space_freed: u64,
}

impl CleanupStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &DeletionOutcome) {
        match outcome.status {
            DeletionStatus::Succeeded { bytes } => {
                self.removed += 1;
                self.space_freed += bytes;
            }
            _ => self.failed += 1,
        }
    }

    pub fn add(&mut self, other: &CleanupStats) {
        self.removed += other.removed;
        self.failed += other.failed;
        self.space_freed += other.space_freed;
    }
}
