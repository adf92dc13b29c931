//! Binary snapshot of a whole [`Package`], kept on local disk so pages can
//! be re-rendered without fetching again.

use crate::error::Result;
use crate::model::Package;
use std::path::{Path, PathBuf};

/// Location of the snapshot for `import_path` under `dir`.
pub fn snapshot_path(dir: &Path, import_path: &str) -> PathBuf {
    dir.join(format!("{}.bin", import_path))
}

pub fn encode(pkg: &Package) -> Result<Vec<u8>> {
    Ok(bincode::serialize(pkg)?)
}

pub fn decode(data: &[u8]) -> Result<Package> {
    Ok(bincode::deserialize(data)?)
}

/// Writes the snapshot, creating parent directories as needed.
pub async fn write(dir: &Path, pkg: &Package) -> Result<PathBuf> {
    let path = snapshot_path(dir, &pkg.import_path);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, encode(pkg)?).await?;
    tracing::debug!(path = %path.display(), "wrote snapshot");
    Ok(path)
}

/// Reads the snapshot for `import_path`, or `None` if there is none.
pub async fn read(dir: &Path, import_path: &str) -> Result<Option<Package>> {
    let path = snapshot_path(dir, import_path);
    match tokio::fs::read(&path).await {
        Ok(data) => decode(&data).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
