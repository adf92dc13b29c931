//! Serialization formats for packages.
//!
//! - [`record`]: typed declaration records written for new data
//! - [`legacy`]: delimiter-based columns, read for compatibility
//! - [`snapshot`]: whole-package binary snapshots on local disk

pub mod legacy;
pub mod record;
pub mod snapshot;

pub use legacy::FlatDecl;
pub use record::DeclRecord;

use crate::error::Result;
use crate::model::Package;

/// Decodes a stored declaration column. Rows written before typed records
/// hold a serialized [`FlatDecl`] instead and are read through [`legacy`].
///
/// # Errors
///
/// The record error when the data is neither layout.
pub fn decode_decl(data: &str) -> Result<Package> {
    match record::decode(data) {
        Ok(pkg) => Ok(pkg),
        Err(e) => match serde_json::from_str::<FlatDecl>(data) {
            Ok(flat) => {
                tracing::debug!("decoding legacy declaration columns");
                legacy::decode(&flat)
            }
            Err(_) => Err(e),
        },
    }
}
