//! Filesystem helpers.

use std::path::Path;

/// Whether `path` exists (file or directory).
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_existing_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert!(file_exists(dir.path()));

        let file = dir.path().join("present.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(file_exists(&file));

        assert!(!file_exists(dir.path().join("absent.txt")));
    }
}
