//! Tests for error handling under adverse filesystem conditions

use openpype_fs::{NormalizedPath, io};
use tempfile::tempdir;

#[test]
fn write_text_through_missing_parents_creates_directories() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("venv").join("locks").join("poetry.lock"));

    io::write_text(&path, "deep content").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "deep content");
}

#[test]
fn write_text_over_directory_fails() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("pyproject.toml");
    std::fs::create_dir(&target).unwrap();

    let result = io::write_text(&NormalizedPath::new(&target), "content");

    assert!(result.is_err(), "Replacing a directory with a file must fail");
    assert!(target.is_dir());
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn read_text_permission_denied_is_not_reported_as_missing() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("pyproject.toml");
        fs::write(&file_path, "[tool.poetry]").unwrap();
        fs::set_permissions(&file_path, Permissions::from_mode(0o000)).unwrap();

        let result = io::read_text(&NormalizedPath::new(&file_path));

        let _ = fs::set_permissions(&file_path, Permissions::from_mode(0o644));

        let err = result.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn write_atomic_unwritable_parent_preserves_original() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let parent = dir.path().join("target");
        fs::create_dir(&parent).unwrap();
        let file_path = parent.join("pyproject.toml");
        fs::write(&file_path, "original").unwrap();
        fs::set_permissions(&parent, Permissions::from_mode(0o555)).unwrap();

        let result = io::write_text(&NormalizedPath::new(&file_path), "new content");

        let _ = fs::set_permissions(&parent, Permissions::from_mode(0o755));

        assert!(result.is_err(), "Writing when parent is read-only should fail");
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");
    }
}
