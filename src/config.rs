use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// Embed the default plan directly in the binary at compile time
const TARGETS_TOML: &str = include_str!("../targets.toml");

/// Subfolder of the newest version that holds installer leftovers.
pub const INSTALLER_DIR: &str = "Installer";

/// Installer archives swept from [`INSTALLER_DIR`].
pub const ARCHIVE_PATTERN: &str = "*.7z";

/// One versioned root to prune.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfiguration {
    pub label: String,
    pub root: PathBuf,
    pub pattern: String,
    pub cleanup_archives: bool,
    /// Consecutive configurations with the same group share one transcript section.
    pub group: Option<String>,
}

impl ScanConfiguration {
    pub fn new(label: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        ScanConfiguration {
            label: label.into(),
            root: root.into(),
            pattern: "*".to_string(),
            cleanup_archives: false,
            group: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_archive_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_archives = enabled;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A directory deleted outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTarget {
    pub label: String,
    pub path: PathBuf,
}

/// Everything one run touches, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupPlan {
    pub versioned: Vec<ScanConfiguration>,
    pub remove: Vec<RemovalTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    #[serde(default)]
    versioned: Vec<VersionedEntry>,
    #[serde(default)]
    remove: Vec<RemoveEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VersionedEntry {
    label: String,
    root: String,
    #[serde(default = "default_pattern")]
    pattern: String,
    #[serde(default)]
    archives: bool,
    #[serde(default)]
    group: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RemoveEntry {
    label: String,
    path: String,
}

fn default_pattern() -> String {
    "*".to_string()
}

impl CleanupPlan {
    /// Parse a plan, expanding a leading `~` against `home`.
    pub fn from_toml(content: &str, home: &Path) -> Result<Self, ConfigError> {
        let file: PlanFile = toml::from_str(content)?;

        let versioned = file
            .versioned
            .into_iter()
            .map(|entry| ScanConfiguration {
                group: entry.group,
                ..ScanConfiguration::new(entry.label, expand_home(&entry.root, home))
                    .with_pattern(entry.pattern)
                    .with_archive_cleanup(entry.archives)
            })
            .collect();

        let remove = file
            .remove
            .into_iter()
            .map(|entry| RemovalTarget {
                label: entry.label,
                path: expand_home(&entry.path, home),
            })
            .collect();

        Ok(CleanupPlan { versioned, remove })
    }

    /// The plan compiled into the binary.
    pub fn embedded(home: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(TARGETS_TOML, home)
    }

    pub fn from_file(path: &Path, home: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, home)
    }
}

/// The profile directory every `~` path is anchored to.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)
}

fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_expansion() {
        let home = Path::new("/home/gappa");
        let plan = CleanupPlan::from_toml(
            r#"
            [[versioned]]
            label = "CapCut"
            root = "~/AppData/Local/CapCut/Apps"

            [[versioned]]
            label = "Discord"
            root = "~/AppData/Local/Discord"
            pattern = "app-*"

            [[versioned]]
            label = "Google Chrome"
            root = "/opt/chrome/Application"
            archives = true
            group = "browsers"

            [[remove]]
            label = "updater"
            path = "~/AppData/Local/updater"
            "#,
            home,
        )
        .unwrap();

        assert_eq!(
            plan.versioned,
            vec![
                ScanConfiguration::new("CapCut", "/home/gappa/AppData/Local/CapCut/Apps"),
                ScanConfiguration::new("Discord", "/home/gappa/AppData/Local/Discord")
                    .with_pattern("app-*"),
                ScanConfiguration::new("Google Chrome", "/opt/chrome/Application")
                    .with_archive_cleanup(true)
                    .with_group("browsers"),
            ]
        );
        assert_eq!(
            plan.remove,
            vec![RemovalTarget {
                label: "updater".into(),
                path: PathBuf::from("/home/gappa/AppData/Local/updater"),
            }]
        );
    }

    #[test]
    fn test_empty_plan() {
        let plan = CleanupPlan::from_toml("", Path::new("/h")).unwrap();
        assert_eq!(plan, CleanupPlan::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = CleanupPlan::from_toml(
            "[[versioned]]\nlabel = \"x\"\nroot = \"/x\"\nfilter = \"*\"\n",
            Path::new("/h"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_tilde_only_inside_prefix() {
        let home = Path::new("/h");
        assert_eq!(expand_home("~", home), PathBuf::from("/h"));
        assert_eq!(expand_home("/a/~/b", home), PathBuf::from("/a/~/b"));
        assert_eq!(expand_home("~user/x", home), PathBuf::from("~user/x"));
    }

    #[test]
    fn test_embedded_plan_parses() {
        let plan = CleanupPlan::embedded(Path::new("/h")).unwrap();
        assert!(plan
            .versioned
            .iter()
            .any(|c| c.pattern == "app-*" && c.label == "Discord"));
        assert!(plan.versioned.iter().any(|c| c.cleanup_archives));
        assert_eq!(plan.remove.len(), 1);
        assert!(plan
            .versioned
            .iter()
            .filter(|c| c.cleanup_archives)
            .all(|c| c.group.as_deref() == Some("browsers")));
    }

    #[test]
    fn test_missing_file() {
        let err =
            CleanupPlan::from_file(Path::new("/definitely/not/here.toml"), Path::new("/h"))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
