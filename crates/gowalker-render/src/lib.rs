//! Rendering for gowalker.
//!
//! Takes a walked [`gowalker_core::Package`] to the files the web
//! front-end serves:
//!
//! 1. [`render_package`] highlights declarations and code, converts doc
//!    comments to HTML and attaches examples, producing a [`DocPage`]
//! 2. a [`PageTemplate`] lays the page out as HTML
//! 3. [`write_doc_shards`] and [`write_readmes`] store the HTML as
//!    `document.write` scripts
//!
//! # Examples
//!
//! ```
//! use gowalker_render::{Link, format_code};
//!
//! let links = vec![Link::new("Conn", "", "")];
//! let html = format_code("var c Conn", &links);
//! assert!(html.contains(r##"href="#Conn""##));
//! ```

pub mod comment;
pub mod escape;
pub mod examples;
pub mod highlight;
pub mod links;
pub mod page;
pub mod shard;
pub mod template;

pub use comment::comment_to_html;
pub use escape::{escape_html, html_to_js};
pub use examples::claim_examples;
pub use highlight::{Segment, SegmentKind, Tokenizer, format_code, keyword_class};
pub use links::{Link, find_link, package_links};
pub use page::{DocPage, render_package};
pub use shard::{
    SHARD_SIZE, SINGLE_SHARD_LIMIT, has_doc_shards, readme_path, shard_path, split_shards,
    write_doc_shards, write_readmes,
};
pub use template::{BasicTemplate, PageTemplate};
