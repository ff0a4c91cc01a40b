use crate::error::{Result, StratusError};
use std::fs;
use std::hash::Hasher;
use std::path::Path;
use walkdir::WalkDir;
use xxhash_rust::xxh3::Xxh3;

/// Computes the content hash of a directory tree.
///
/// The walk visits entries in file-name order and folds each file's
/// root-relative path and bytes into one xxh3 digest. The result depends
/// only on relative layout and contents, not on timestamps or on where
/// `root` lives.
pub fn fingerprint_directory(root: &Path) -> Result<String> {
    let mut hasher = Xxh3::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).map_err(|_| {
            StratusError::Internal(format!("path {} outside walk root", entry.path().display()))
        })?;
        let relative = relative.to_string_lossy().replace('\\', "/");

        hasher.write(relative.as_bytes());
        hasher.write(&[0]);
        hasher.write(&fs::read(entry.path())?);
        hasher.write(&[0]);
    }

    Ok(format!("{:016x}", hasher.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_identical_contents_hash_identically() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        for dir in [&a, &b] {
            fs::create_dir(dir.path().join("nested")).unwrap();
            fs::write(dir.path().join("index.js"), "module.exports = 1;\n").unwrap();
            fs::write(dir.path().join("nested/util.js"), "// helper\n").unwrap();
        }

        let hash_a = fingerprint_directory(a.path()).unwrap();
        let hash_b = fingerprint_directory(b.path()).unwrap();
        assert_eq!(hash_a, hash_b);
    }

    #[test]
    fn test_content_change_changes_hash() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.js"), "module.exports = 1;\n").unwrap();
        let before = fingerprint_directory(dir.path()).unwrap();

        fs::write(dir.path().join("index.js"), "module.exports = 2;\n").unwrap();
        let after = fingerprint_directory(dir.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_rename_changes_hash() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.js"), "module.exports = 1;\n").unwrap();
        let before = fingerprint_directory(dir.path()).unwrap();

        fs::rename(dir.path().join("index.js"), dir.path().join("main.js")).unwrap();
        let after = fingerprint_directory(dir.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = fingerprint_directory(&missing).unwrap_err();
        assert!(matches!(err, StratusError::Io(_)));
    }
}
