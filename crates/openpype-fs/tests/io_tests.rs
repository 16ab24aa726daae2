use openpype_fs::{NormalizedPath, RobustnessConfig, io};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("pyproject.toml"));

    io::write_atomic(&path, b"[tool.poetry]\n", RobustnessConfig::default()).unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "[tool.poetry]\n");
}

#[test]
fn write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("pyproject.toml");
    fs::write(&file_path, "original").unwrap();

    let config = RobustnessConfig {
        lock_timeout: Duration::from_millis(200),
        enable_fsync: false,
    };
    io::write_atomic(&NormalizedPath::new(&file_path), b"updated", config).unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("poetry.lock"));

    io::write_text(&path, "content").unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(
        leftovers.is_empty(),
        "No temp files should remain, found: {:?}",
        leftovers.iter().map(|e| e.file_name()).collect::<Vec<_>>()
    );
}

#[test]
fn read_text_existing_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("test.txt");
    fs::write(&file_path, "hello").unwrap();

    assert_eq!(io::read_text(&NormalizedPath::new(&file_path)).unwrap(), "hello");
}

#[test]
fn read_text_nonexistent_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("missing.toml"));

    let err = io::read_text(&path).unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn copy_atomic_duplicates_content() {
    let temp = TempDir::new().unwrap();
    let from = NormalizedPath::new(temp.path().join("work/poetry.lock"));
    let to = NormalizedPath::new(temp.path().join("target/poetry.lock"));
    io::write_text(&from, "[[package]]\nname = \"click\"\n").unwrap();

    io::copy_atomic(&from, &to).unwrap();

    assert_eq!(
        io::read_text(&to).unwrap(),
        "[[package]]\nname = \"click\"\n"
    );
}
