//! Content-addressed staging of code directories.
//!
//! Staging produces a [`stratus_api::StagedAsset`]: a deterministic hash
//! of a directory's contents plus the stack-relative path the packager
//! later materializes it under. Upload destinations are handed out by the
//! stack's asset manifest, not here.

pub mod fingerprint;
pub mod staging;

pub use fingerprint::fingerprint_directory;
pub use staging::DirectoryStaging;
