//! Selecting documentation files from a repository manifest.

use gowalker_go::{is_doc_file, is_package_dir};
use std::collections::BTreeSet;

/// Files directly in the requested directory and its immediate
/// subdirectories that hold documentation files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Repository-relative paths of the direct files.
    pub files: Vec<String>,
    /// Subdirectory names, sorted.
    pub dirs: Vec<String>,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    /// Whether the directory itself has at least one Go source file.
    pub fn has_go_files(&self) -> bool {
        self.files.iter().any(|f| f.ends_with(".go"))
    }
}

/// Turns `/a/b` into the manifest prefix `a/b/`, and `""` into `""`.
pub fn dir_prefix(dir: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        String::new()
    } else {
        format!("{}/", dir)
    }
}

/// Partitions repository-relative file paths against `prefix` (see
/// [`dir_prefix`]).
///
/// Only paths whose basename is a documentation file count. A
/// subdirectory is listed when a file inside it (at any depth) qualifies
/// and no directory on the way is hidden, `_`-prefixed or `testdata`.
///
/// # Examples
///
/// ```
/// use gowalker_vcs::tree::partition_manifest;
///
/// let paths = ["a/x.go", "a/sub/y.go", "a/testdata/z.go", "b/w.go"];
/// let part = partition_manifest(paths, "a/");
/// assert_eq!(part.files, vec!["a/x.go"]);
/// assert_eq!(part.dirs, vec!["sub"]);
/// ```
pub fn partition_manifest<I, S>(paths: I, prefix: &str) -> Partition
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut files = Vec::new();
    let mut dirs = BTreeSet::new();

    for path in paths {
        let path = path.as_ref();
        let Some(rest) = path.strip_prefix(prefix) else {
            continue;
        };
        let (parent, name) = match rest.rsplit_once('/') {
            Some((parent, name)) => (Some(parent), name),
            None => (None, rest),
        };
        if !is_doc_file(name) {
            continue;
        }

        match parent {
            None => files.push(path.to_string()),
            Some(parent) => {
                if parent.split('/').all(is_package_dir) {
                    let first = parent.split('/').next().unwrap_or(parent);
                    dirs.insert(first.to_string());
                }
            }
        }
    }

    files.sort();
    Partition {
        files,
        dirs: dirs.into_iter().collect(),
    }
}

/// Basename of a slash-separated path.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
