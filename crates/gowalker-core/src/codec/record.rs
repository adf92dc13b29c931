//! Typed declaration record, the storage format for newly written rows.

use crate::error::{Result, WalkerError};
use crate::model::{Example, Func, Package, Source, Type, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bumped whenever the record layout changes incompatibly.
pub const RECORD_VERSION: u32 = 1;

/// Declaration part of a [`Package`] with every field explicitly typed.
///
/// Field order is fixed by the struct definition, so encoding the same
/// package twice yields identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclRecord {
    pub version: u32,
    pub doc: String,
    pub truncated: bool,
    pub consts: Vec<Value>,
    pub iconsts: Vec<Value>,
    pub vars: Vec<Value>,
    pub ivars: Vec<Value>,
    pub funcs: Vec<Func>,
    pub ifuncs: Vec<Func>,
    pub types: Vec<Type>,
    pub itypes: Vec<Type>,
    pub examples: Vec<Example>,
    pub imports: Vec<String>,
    pub test_imports: Vec<String>,
    pub files: Vec<Source>,
    pub test_files: Vec<Source>,
    pub dirs: Vec<String>,
    /// README text by language, so a re-rendered page keeps it.
    #[serde(default)]
    pub readme: BTreeMap<String, String>,
}

impl From<&Package> for DeclRecord {
    fn from(pkg: &Package) -> Self {
        Self {
            version: RECORD_VERSION,
            doc: pkg.doc.clone(),
            truncated: pkg.truncated,
            consts: pkg.consts.clone(),
            iconsts: pkg.iconsts.clone(),
            vars: pkg.vars.clone(),
            ivars: pkg.ivars.clone(),
            funcs: pkg.funcs.clone(),
            ifuncs: pkg.ifuncs.clone(),
            types: pkg.types.clone(),
            itypes: pkg.itypes.clone(),
            examples: pkg.examples.clone(),
            imports: pkg.imports.clone(),
            test_imports: pkg.test_imports.clone(),
            files: pkg.files.clone(),
            test_files: pkg.test_files.clone(),
            dirs: pkg.dirs.clone(),
            readme: pkg.readme.clone(),
        }
    }
}

impl DeclRecord {
    /// Moves the declarations into a package with all other fields default.
    pub fn into_package(self) -> Package {
        Package {
            doc: self.doc,
            truncated: self.truncated,
            consts: self.consts,
            iconsts: self.iconsts,
            vars: self.vars,
            ivars: self.ivars,
            funcs: self.funcs,
            ifuncs: self.ifuncs,
            types: self.types,
            itypes: self.itypes,
            examples: self.examples,
            imports: self.imports,
            test_imports: self.test_imports,
            files: self.files,
            test_files: self.test_files,
            dirs: self.dirs,
            readme: self.readme,
            ..Package::default()
        }
    }
}

pub fn encode(pkg: &Package) -> Result<String> {
    Ok(serde_json::to_string(&DeclRecord::from(pkg))?)
}

/// Decodes a record written by [`encode`].
///
/// # Errors
///
/// Fails with `WalkerError::Codec` when the record was written by a newer
/// layout version.
pub fn decode(data: &str) -> Result<Package> {
    let record: DeclRecord = serde_json::from_str(data)?;
    if record.version > RECORD_VERSION {
        return Err(WalkerError::Codec(format!(
            "unsupported record version {}",
            record.version
        )));
    }
    Ok(record.into_package())
}
