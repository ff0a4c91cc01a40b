use crate::token::Token;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Content-addressed reference to a packaged source directory.
///
/// Identical directory contents always produce the same `source_hash`,
/// regardless of when or where the directory was staged.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct StagedAsset {
    pub source_hash: String,
    /// Stack-relative path of the staged copy.
    pub staged_path: String,
}

/// How a staged asset is packaged for upload.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAssetPackaging {
    /// The staged directory is zipped into a single archive.
    ZipDirectory,
    /// The staged path is uploaded as-is.
    File,
}

impl FileAssetPackaging {
    pub fn extension(self) -> &'static str {
        match self {
            FileAssetPackaging::ZipDirectory => ".zip",
            FileAssetPackaging::File => "",
        }
    }
}

/// Input to the asset publisher.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct FileAssetSource {
    pub staged_path: String,
    pub source_hash: String,
    pub packaging: FileAssetPackaging,
}

/// Upload destination of a published asset.
///
/// The container name stays deferred until deploy time; the object key is
/// derived from the content hash.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct AssetLocation {
    pub bucket_name: Token,
    pub object_key: String,
}
