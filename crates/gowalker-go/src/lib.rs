//! Go source documentation extraction for gowalker.
//!
//! This crate turns the raw `.go` files of one directory into a
//! [`Package`](gowalker_core::Package): package documentation, exported and
//! unexported declarations, type-associated constructors and methods, and
//! runnable examples from test files.
//!
//! # Example
//!
//! ```
//! use gowalker_core::Source;
//! use gowalker_go::{WalkOptions, build, is_doc_file};
//!
//! let mut file = Source::new("conn.go", "https://example.com/conn.go", "");
//! file.data = b"package conn\n\n// Conn is a connection.\ntype Conn struct{}\n".to_vec();
//! assert!(is_doc_file(&file.name));
//!
//! let pkg = build(&[file], &WalkOptions::default()).unwrap();
//! assert_eq!(pkg.types[0].name, "Conn");
//! ```

pub mod doc;
pub mod error;
pub mod source;
pub mod walker;

pub use doc::synopsis;
pub use error::{ExtractError, Result};
pub use source::{is_doc_file, is_go_repo_path, is_package_dir, is_readme, readme_lang};
pub use walker::{WalkOptions, build, go_parser};
