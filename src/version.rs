//! Version folder names.
//!
//! Application installers drop one folder per release next to each other,
//! either as a bare dotted number (`120.0.6099.130`) or with an `app-` marker
//! (`app-1.0.9035`). Only names that fully match the dotted-integer grammar
//! produce a [`VersionToken`].

use std::cmp::Ordering;
use std::fmt;

/// Marker some launchers put in front of the version in their folder names.
pub const APP_PREFIX: &str = "app-";

/// Dotted integer version, compared component by component.
///
/// Missing trailing components count as zero, so `1.2` and `1.2.0` are equal.
#[derive(Debug, Clone)]
pub struct VersionToken {
    components: Vec<u64>,
}

impl VersionToken {
    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

/// Parse a folder name into a version.
///
/// A leading `app-` is stripped once. Returns `None` for anything that is not
/// one or more dot-separated runs of ASCII digits.
pub fn parse_version(name: &str) -> Option<VersionToken> {
    let raw = name.strip_prefix(APP_PREFIX).unwrap_or(name);
    if raw.is_empty() {
        return None;
    }

    let components = raw
        .split('.')
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse::<u64>().ok()
        })
        .collect::<Option<Vec<_>>>()?;

    Some(VersionToken { components })
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionToken {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionToken {}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.components.iter().map(u64::to_string).collect();
        f.write_str(&rendered.join("."))
    }
}
