//! Path utilities for tests.

use std::path::PathBuf;

use tempfile::TempDir;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils crate's manifest
/// directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the static UI directory served by `bench-api`.
pub fn static_assets_dir() -> PathBuf {
    workspace_root()
        .join("services")
        .join("bench-api")
        .join("static")
}

/// A database path inside a fresh temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped, so keep
/// it alive for the duration of the test. The database file itself is not
/// created, and its parent is nested one level so callers exercise
/// directory creation.
pub fn temp_database() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("experiments.db");
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_temp_database_not_created() {
        let (dir, path) = temp_database();
        assert!(path.starts_with(dir.path()));
        assert!(!path.exists());
    }
}
