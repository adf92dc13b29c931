use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Default number of recently viewed projects kept in memory.
pub const DEFAULT_CAPACITY: usize = 20;

/// Summary of a recently viewed project shown on landing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentProject {
    pub path: String,
    pub synopsis: String,
    pub views: i64,
    pub viewed_time: i64,
}

/// Bounded most-recently-viewed list of projects.
///
/// Entries are ordered newest first. Upserting an existing path moves it to
/// the front; upserting a new path into a full list drops the oldest entry.
/// The cache is owned by the service that renders pages and shared through
/// an `Arc`.
///
/// # Examples
///
/// ```
/// use gowalker_core::cache::{RecentProject, RecentProjects};
///
/// let recent = RecentProjects::new(2);
/// for path in ["a", "b", "c"] {
///     recent.upsert(RecentProject {
///         path: path.into(),
///         synopsis: String::new(),
///         views: 0,
///         viewed_time: 0,
///     });
/// }
///
/// let paths: Vec<_> = recent.snapshot().into_iter().map(|p| p.path).collect();
/// assert_eq!(paths, vec!["c", "b"]);
/// ```
#[derive(Debug)]
pub struct RecentProjects {
    entries: Mutex<VecDeque<RecentProject>>,
    capacity: usize,
}

impl RecentProjects {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, path: &str) -> Option<RecentProject> {
        self.lock().iter().find(|p| p.path == path).cloned()
    }

    /// Puts `project` at the front, replacing any older entry for the same
    /// path and evicting the oldest entry when the list is full.
    pub fn upsert(&self, project: RecentProject) {
        let mut entries = self.lock();
        if let Some(index) = entries.iter().position(|p| p.path == project.path) {
            entries.remove(index);
        } else if entries.len() >= self.capacity {
            entries.pop_back();
        }
        entries.push_front(project);
    }

    /// Removes `path`, returning the evicted entry.
    pub fn evict(&self, path: &str) -> Option<RecentProject> {
        let mut entries = self.lock();
        let index = entries.iter().position(|p| p.path == path)?;
        entries.remove(index)
    }

    /// Copies the current list, newest first.
    pub fn snapshot(&self) -> Vec<RecentProject> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<RecentProject>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RecentProjects {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(path: &str, views: i64) -> RecentProject {
        RecentProject {
            path: path.into(),
            synopsis: format!("{} synopsis", path),
            views,
            viewed_time: 0,
        }
    }

    #[test]
    fn test_upsert_moves_existing_to_front() {
        let recent = RecentProjects::new(3);
        recent.upsert(project("a", 1));
        recent.upsert(project("b", 1));
        recent.upsert(project("a", 2));

        let snapshot = recent.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].path, "a");
        assert_eq!(snapshot[0].views, 2);
        assert_eq!(snapshot[1].path, "b");
    }

    #[test]
    fn test_upsert_evicts_oldest_when_full() {
        let recent = RecentProjects::new(2);
        recent.upsert(project("a", 0));
        recent.upsert(project("b", 0));
        recent.upsert(project("c", 0));

        assert!(recent.get("a").is_none());
        assert!(recent.get("b").is_some());
        assert!(recent.get("c").is_some());
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_upsert_existing_in_full_list_keeps_others() {
        let recent = RecentProjects::new(2);
        recent.upsert(project("a", 0));
        recent.upsert(project("b", 0));
        recent.upsert(project("a", 5));

        assert_eq!(recent.len(), 2);
        assert!(recent.get("b").is_some());
    }

    #[test]
    fn test_evict() {
        let recent = RecentProjects::default();
        recent.upsert(project("a", 0));
        assert_eq!(recent.evict("a").map(|p| p.path), Some("a".to_string()));
        assert!(recent.evict("a").is_none());
        assert!(recent.is_empty());
    }
}
