//! Hosting-service resolution and source fetching for gowalker.
//!
//! An import path is mapped to a [`Service`] by the [`ServiceRegistry`]:
//! known hosts by prefix and pattern, the standard library by shape, and
//! vanity paths through `go-import` meta tags. The service then fetches
//! the package directory at one revision, and the [`Crawler`] walks the
//! fetched files into a [`gowalker_core::Package`].
//!
//! # Examples
//!
//! ```
//! use gowalker_vcs::ServiceRegistry;
//!
//! let registry = ServiceRegistry::standard(Default::default(), Default::default());
//! let (service, groups) = registry
//!     .resolve_static("bitbucket.org/team/lib/sub")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(service.name(), "bitbucket");
//! assert_eq!(groups.owner(), "team");
//! ```

pub mod bitbucket;
pub mod crawler;
pub mod github;
pub mod groups;
pub mod meta;
pub mod oschina;
pub mod registry;
pub mod service;
pub mod tree;

pub use crawler::Crawler;
pub use groups::MatchGroups;
pub use registry::{Resolved, ServiceRegistry, ServiceRegistryBuilder};
pub use service::{FetchedTree, ProjectMeta, Service};
