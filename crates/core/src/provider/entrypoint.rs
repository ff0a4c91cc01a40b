//! The entrypoint wrapper installed into provider code directories.

use std::fs;
use std::path::{Path, PathBuf};
use stratus_api::{BoxError, EntrypointInstaller};

/// Reserved file name the wrapper is written under.
pub const ENTRYPOINT_FILE_NAME: &str = "__entrypoint__.js";

/// Handler string pointing at the wrapper's exported function.
pub const ENTRYPOINT_HANDLER: &str = "__entrypoint__.handler";

/// Name of the user handler file that must exist directly inside the
/// code directory.
pub const INDEX_FILE_NAME: &str = "index.js";

const ENTRYPOINT_SOURCE: &str = include_str!("entrypoint.js");

/// Writes the embedded wrapper source into the code directory.
pub struct FsEntrypointInstaller;

impl EntrypointInstaller for FsEntrypointInstaller {
    fn install(&self, code_directory: &Path) -> Result<PathBuf, BoxError> {
        let destination = code_directory.join(ENTRYPOINT_FILE_NAME);
        fs::write(&destination, ENTRYPOINT_SOURCE)?;
        Ok(destination)
    }
}
