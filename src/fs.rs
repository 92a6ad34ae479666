use glob::{MatchOptions, Pattern};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::CleanupError;

/// Installer folders come from Windows, where name filters ignore case.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One entry of a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Everything the cleaner needs from the host filesystem.
pub trait Filesystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `root` whose names match `pattern`, in listing order.
    fn list_dirs(&self, root: &Path, pattern: &str) -> Result<Vec<DirEntry>, CleanupError>;

    /// Regular files directly under `dir` whose names match `pattern`, in listing order.
    fn list_files(&self, dir: &Path, pattern: &str) -> Result<Vec<DirEntry>, CleanupError>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Total size in bytes of a file or directory tree. Unreadable parts count as zero.
    fn size_of(&self, path: &Path) -> u64;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl LocalFs {
    fn list(
        &self,
        dir: &Path,
        pattern: &str,
        keep: impl Fn(&fs::FileType) -> bool,
    ) -> Result<Vec<DirEntry>, CleanupError> {
        let matcher = Pattern::new(pattern).map_err(|source| CleanupError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let list_err = |source| CleanupError::ListDirectory {
            path: dir.to_path_buf(),
            source,
        };

        let mut found = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let file_type = entry.file_type().map_err(list_err)?;
            if !keep(&file_type) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if matcher.matches_with(&name, MATCH_OPTIONS) {
                found.push(DirEntry {
                    name,
                    path: entry.path(),
                });
            }
        }
        Ok(found)
    }
}

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dirs(&self, root: &Path, pattern: &str) -> Result<Vec<DirEntry>, CleanupError> {
        self.list(root, pattern, fs::FileType::is_dir)
    }

    fn list_files(&self, dir: &Path, pattern: &str) -> Result<Vec<DirEntry>, CleanupError> {
        self.list(dir, pattern, fs::FileType::is_file)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn size_of(&self, path: &Path) -> u64 {
        WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(entries: &[DirEntry]) -> Vec<String> {
        let mut names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_list_dirs_filters_by_pattern() {
        let dir = tempdir().unwrap();
        for name in ["app-1.0.0", "app-1.1.0", "packages", "App-2.0.0"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("app-9.9.9"), "not a dir").unwrap();

        let found = LocalFs.list_dirs(dir.path(), "app-*").unwrap();
        assert_eq!(names(&found), vec!["App-2.0.0", "app-1.0.0", "app-1.1.0"]);

        let all = LocalFs.list_dirs(dir.path(), "*").unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_list_files_skips_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("chrome.7z"), "a").unwrap();
        fs::write(dir.path().join("setup.exe"), "b").unwrap();
        fs::create_dir(dir.path().join("nested.7z")).unwrap();

        let found = LocalFs.list_files(dir.path(), "*.7z").unwrap();
        assert_eq!(names(&found), vec!["chrome.7z"]);
    }

    #[test]
    fn test_list_missing_dir_is_error() {
        let dir = tempdir().unwrap();
        let err = LocalFs
            .list_dirs(&dir.path().join("gone"), "*")
            .unwrap_err();
        assert!(matches!(err, CleanupError::ListDirectory { .. }));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let dir = tempdir().unwrap();
        let err = LocalFs.list_dirs(dir.path(), "[").unwrap_err();
        assert!(matches!(err, CleanupError::InvalidPattern { .. }));
    }

    #[test]
    fn test_size_of_counts_nested_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/one"), [0u8; 10]).unwrap();
        fs::write(dir.path().join("a/b/two"), [0u8; 32]).unwrap();

        assert_eq!(LocalFs.size_of(dir.path()), 42);
        assert_eq!(LocalFs.size_of(&dir.path().join("a/one")), 10);
    }
}
