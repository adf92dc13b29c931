use async_trait::async_trait;
use gowalker_core::{Package, Result};
use gowalker_vcs::Crawler;

/// Produces a freshly walked package for an import path.
///
/// `saved_revision` is the revision of the stored copy, or empty to force
/// a download. Implementations return `WalkerError::NotModified` when the
/// remote revision matches it.
#[async_trait]
pub trait PackageFetcher: Send + Sync + 'static {
    async fn fetch(&self, path: &str, tag: &str, saved_revision: &str) -> Result<Package>;
}

#[async_trait]
impl PackageFetcher for Crawler {
    async fn fetch(&self, path: &str, tag: &str, saved_revision: &str) -> Result<Package> {
        self.crawl(path, tag, saved_revision).await
    }
}
