//! Build-time collaborator contracts.
//!
//! The provider factory talks to the file system and the enclosing stack
//! only through these traits, so tests can stand in for either side.

use crate::asset::{AssetLocation, FileAssetSource, StagedAsset};
use std::path::{Path, PathBuf};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stages a source directory as a content-addressed asset.
pub trait AssetStager {
    /// Returns the deterministic content hash of `source_directory` and a
    /// stack-relative staged path for it. Identical directory contents
    /// must yield the same hash on every invocation.
    fn stage(&self, source_directory: &Path) -> Result<StagedAsset, BoxError>;
}

/// Records a staged asset for upload and yields its destination.
pub trait AssetPublisher {
    fn add_file_asset(&self, source: FileAssetSource) -> AssetLocation;
}

/// Prepares a caller-supplied code directory for packaging.
///
/// Contract: adds exactly one file with a reserved name to the directory,
/// mutating the caller's input in place, and returns the written path.
/// Fails if the destination is not writable. Nothing else in the
/// directory is touched.
pub trait EntrypointInstaller {
    fn install(&self, code_directory: &Path) -> Result<PathBuf, BoxError>;
}
