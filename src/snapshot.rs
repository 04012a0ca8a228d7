use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

use crate::paths::CertPaths;
use crate::store::{SNAPSHOT_KEY, SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Archive a whole directory tree as an in-memory gzip tarball, rooted at
/// `.` so extraction restores relative paths exactly as archived.
pub fn archive_dir(dir: &Path) -> Result<Vec<u8>, SnapshotError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::best());
    let mut archive = tar::Builder::new(encoder);
    archive.follow_symlinks(false);
    archive.append_dir_all(".", dir).map_err(|e| {
        SnapshotError::Archive(format!("failed to add {}: {}", dir.display(), e))
    })?;

    let encoder = archive
        .into_inner()
        .map_err(|e| SnapshotError::Archive(format!("failed to finish archive: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| SnapshotError::Archive(format!("failed to compress: {}", e)))
}

/// Extract a gzip tarball into a directory.
pub fn extract_into(data: &[u8], dest_dir: &Path) -> Result<(), SnapshotError> {
    std::fs::create_dir_all(dest_dir)?;

    let decoder = GzDecoder::new(data);
    let mut archive = tar::Archive::new(decoder);
    archive
        .unpack(dest_dir)
        .map_err(|e| SnapshotError::Archive(format!("failed to extract: {}", e)))?;
    Ok(())
}

/// Pull the last exported snapshot from the store and lay it down locally.
///
/// Replaces the certificate working directory wholesale. A missing snapshot
/// is normal for first runs and leaves the freshly created directories
/// empty. Removal errors on the stale directory are suppressed so a partial
/// leftover cannot block the fresh extract.
pub fn import(store: &dyn SnapshotStore, paths: &CertPaths) -> Result<(), SnapshotError> {
    paths.ensure_dirs()?;

    let Some(data) = store.fetch(SNAPSHOT_KEY)? else {
        tracing::info!("No certificate snapshot found in the shared store");
        return Ok(());
    };

    let _ = std::fs::remove_dir_all(&paths.cert_dir);
    std::fs::create_dir_all(&paths.cert_dir)?;
    extract_into(&data, &paths.cert_dir)?;
    tracing::info!("Restored certificate data from the shared store");
    Ok(())
}

/// Re-archive the certificate working directory and write it back to the
/// store under the fixed key, overwriting any previous snapshot.
pub fn export(store: &dyn SnapshotStore, paths: &CertPaths) -> Result<(), SnapshotError> {
    let data = archive_dir(&paths.cert_dir)?;
    store.store(SNAPSHOT_KEY, &data)?;
    Ok(())
}
