//! gowalker: on-demand documentation for Go packages.
//!
//! [`DocService`] ties the pieces together. A request for an import path
//! is served from the [`PackageStore`] when a current copy exists;
//! otherwise a [`PackageFetcher`] (normally [`gowalker_vcs::Crawler`])
//! walks the package under a deadline, the page is rendered into
//! `document.write` shards and the summary and declaration record are
//! stored.

pub mod config;
pub mod fetcher;
pub mod service;
pub mod store;

pub use config::WalkerConfig;
pub use fetcher::PackageFetcher;
pub use service::{DocService, PACKAGE_VER, RequestKind, doc_path, normalize_path};
pub use store::{MemoryStore, PackageStore, PackageSummary};
