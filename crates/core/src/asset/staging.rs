use super::fingerprint::fingerprint_directory;
use std::path::Path;
use stratus_api::{AssetStager, BoxError, StagedAsset};
use tracing::debug;

/// Stages a directory by content hash.
///
/// No bytes are copied here; the staged path is the stack-relative name
/// the packager later materializes the directory under.
pub struct DirectoryStaging;

impl AssetStager for DirectoryStaging {
    fn stage(&self, source_directory: &Path) -> Result<StagedAsset, BoxError> {
        let source_hash = fingerprint_directory(source_directory)?;
        let staged_path = format!("asset.{source_hash}");
        debug!(
            "staged {} as {staged_path}",
            source_directory.display()
        );
        Ok(StagedAsset {
            source_hash,
            staged_path,
        })
    }
}
