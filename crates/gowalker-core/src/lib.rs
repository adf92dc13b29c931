//! Core abstractions for gowalker.
//!
//! This crate provides the pieces shared by every stage of the crawler:
//!
//! - **Model**: [`Package`] and its declarations, built by the extractor and
//!   decorated by the renderer
//! - **Codecs**: typed declaration records, the legacy delimiter format and
//!   binary snapshots
//! - **HTTP**: a shared client with bounded concurrent file downloads
//! - **Recent projects**: the bounded most-recently-viewed list
//! - **Errors**: one taxonomy the orchestrator classifies outcomes with
//!
//! # Examples
//!
//! ```
//! use gowalker_core::{Package, codec};
//!
//! let pkg = Package {
//!     doc: "Package demo does nothing.".into(),
//!     imports: vec!["fmt".into()],
//!     ..Package::default()
//! };
//!
//! let encoded = codec::record::encode(&pkg).unwrap();
//! let decoded = codec::record::decode(&encoded).unwrap();
//! assert_eq!(decoded.imports, pkg.imports);
//! ```

pub mod cache;
pub mod codec;
pub mod error;
pub mod http;
pub mod model;

pub use cache::{RecentProject, RecentProjects};
pub use error::{Result, WalkerError};
pub use http::{HttpConfig, HttpFetcher};
pub use model::{Example, Func, Package, Source, Type, Value, base_name};
