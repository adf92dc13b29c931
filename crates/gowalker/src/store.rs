//! Persistence contract for walked packages and an in-memory store.

use async_trait::async_trait;
use dashmap::DashMap;
use gowalker_core::{Package, Result, WalkerError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Weight of one importing package against one page view in `rank`.
const IMPORT_WEIGHT: i64 = 30;

/// The listing row of a stored package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub id: i64,
    pub path: String,
    pub tag: String,
    pub name: String,
    pub synopsis: String,
    pub project_name: String,
    pub project_url: String,
    pub view_dir_path: String,
    pub vcs: String,
    /// Revision with the codec version prefix, e.g. `2-<sha>`.
    pub etag: String,
    pub is_cmd: bool,
    pub created: i64,
    pub viewed_time: i64,
    pub views: i64,
    pub imported_num: i64,
    /// Ids of importing packages as `$id|` entries.
    pub import_pids: String,
    pub rank: i64,
    pub stars: i64,
}

impl PackageSummary {
    /// Summary of a freshly walked package stored under `etag`.
    pub fn from_package(pkg: &Package, etag: String) -> Self {
        Self {
            id: pkg.id,
            path: pkg.import_path.clone(),
            tag: pkg.tag.clone(),
            name: pkg.name.clone(),
            synopsis: pkg.synopsis.clone(),
            project_name: pkg.project_name.clone(),
            project_url: pkg.project_url.clone(),
            view_dir_path: pkg.view_dir_path.clone(),
            vcs: pkg.vcs.clone(),
            etag,
            is_cmd: pkg.is_cmd,
            created: pkg.created,
            viewed_time: pkg.viewed_time,
            views: pkg.views,
            imported_num: pkg.imported_num,
            import_pids: pkg.import_pids.clone(),
            rank: pkg.rank,
            stars: pkg.stars,
        }
    }

    /// Copies the listing fields onto a package rebuilt from its
    /// declaration record.
    pub fn apply_to(&self, pkg: &mut Package) {
        pkg.id = self.id;
        pkg.import_path.clone_from(&self.path);
        pkg.tag.clone_from(&self.tag);
        pkg.name.clone_from(&self.name);
        pkg.synopsis.clone_from(&self.synopsis);
        pkg.project_name.clone_from(&self.project_name);
        pkg.project_url.clone_from(&self.project_url);
        pkg.view_dir_path.clone_from(&self.view_dir_path);
        pkg.vcs.clone_from(&self.vcs);
        pkg.etag.clone_from(&self.etag);
        pkg.is_cmd = self.is_cmd;
        pkg.created = self.created;
        pkg.viewed_time = self.viewed_time;
        pkg.views = self.views;
        pkg.imported_num = self.imported_num;
        pkg.import_pids.clone_from(&self.import_pids);
        pkg.rank = self.rank;
        pkg.stars = self.stars;
    }

    fn update_rank(&mut self) {
        self.rank = self.imported_num * IMPORT_WEIGHT + self.views;
    }
}

/// Storage for package summaries and their encoded declaration records.
///
/// Rows are keyed by import path and tag; the empty tag is the default
/// branch.
#[async_trait]
pub trait PackageStore: Send + Sync {
    async fn get_summary(&self, path: &str, tag: &str) -> Result<Option<PackageSummary>>;

    /// Inserts or replaces the row for `summary.path`/`summary.tag` and
    /// returns its id. Replacing keeps the id and the counters.
    async fn save_package(&self, summary: PackageSummary, decl: String) -> Result<i64>;

    async fn load_decl(&self, path: &str, tag: &str) -> Result<Option<String>>;

    /// Removes every tag of `path`. Returns whether anything was removed.
    async fn delete_package(&self, path: &str) -> Result<bool>;

    async fn add_view(&self, path: &str, tag: &str, viewed_time: i64) -> Result<()>;

    /// Records that package `id` imports each of `imports`.
    async fn update_import_index(&self, id: i64, imports: &[String]) -> Result<()>;

    /// Every stored import path, sorted, for the search index.
    async fn all_paths(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
struct Row {
    summary: PackageSummary,
    decl: String,
}

/// [`PackageStore`] kept in process memory.
///
/// # Examples
///
/// ```
/// use gowalker::store::{MemoryStore, PackageStore, PackageSummary};
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new();
/// let summary = PackageSummary {
///     path: "github.com/a/b".into(),
///     ..PackageSummary::default()
/// };
/// let id = store.save_package(summary, "{}".into()).await.unwrap();
/// assert_eq!(id, 1);
/// assert_eq!(store.all_paths().await.unwrap(), vec!["github.com/a/b"]);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: DashMap<(String, String), Row>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn key(path: &str, tag: &str) -> (String, String) {
        (path.to_string(), tag.to_string())
    }
}

#[async_trait]
impl PackageStore for MemoryStore {
    async fn get_summary(&self, path: &str, tag: &str) -> Result<Option<PackageSummary>> {
        Ok(self
            .rows
            .get(&Self::key(path, tag))
            .map(|row| row.summary.clone()))
    }

    async fn save_package(&self, mut summary: PackageSummary, decl: String) -> Result<i64> {
        if summary.path.is_empty() {
            return Err(WalkerError::Store("cannot save a package without a path".into()));
        }
        let key = Self::key(&summary.path, &summary.tag);
        let mut entry = self.rows.entry(key).or_insert_with(|| Row {
            summary: PackageSummary {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                created: summary.created,
                ..PackageSummary::default()
            },
            decl: String::new(),
        });
        let previous = &entry.summary;
        summary.id = previous.id;
        summary.created = previous.created;
        summary.views = previous.views;
        summary.imported_num = previous.imported_num;
        summary.import_pids.clone_from(&previous.import_pids);
        summary.update_rank();

        let id = summary.id;
        entry.summary = summary;
        entry.decl = decl;
        Ok(id)
    }

    async fn load_decl(&self, path: &str, tag: &str) -> Result<Option<String>> {
        Ok(self.rows.get(&Self::key(path, tag)).map(|row| row.decl.clone()))
    }

    async fn delete_package(&self, path: &str) -> Result<bool> {
        let before = self.rows.len();
        self.rows.retain(|(p, _), _| p != path);
        Ok(self.rows.len() != before)
    }

    async fn add_view(&self, path: &str, tag: &str, viewed_time: i64) -> Result<()> {
        if let Some(mut row) = self.rows.get_mut(&Self::key(path, tag)) {
            row.summary.views += 1;
            row.summary.viewed_time = viewed_time;
            row.summary.update_rank();
        }
        Ok(())
    }

    async fn update_import_index(&self, id: i64, imports: &[String]) -> Result<()> {
        let marker = format!("${}|", id);
        for import in imports {
            let Some(mut row) = self.rows.get_mut(&Self::key(import, "")) else {
                continue;
            };
            if row.summary.import_pids.contains(&marker) {
                continue;
            }
            row.summary.import_pids.push_str(&marker);
            row.summary.imported_num += 1;
            row.summary.update_rank();
        }
        Ok(())
    }

    async fn all_paths(&self) -> Result<Vec<String>> {
        let mut paths: Vec<String> = self.rows.iter().map(|row| row.key().0.clone()).collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}
