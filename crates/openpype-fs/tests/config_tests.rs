use openpype_fs::{ConfigFormat, ConfigStore, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Poetry {
    name: String,
    dependencies: BTreeMap<String, String>,
}

#[rstest]
#[case("pyproject.toml", "name = \"addon\"\n[dependencies]\nclick = \"^7\"\n")]
#[case("pyproject.json", r#"{"name": "addon", "dependencies": {"click": "^7"}}"#)]
#[case("pyproject.yaml", "name: addon\ndependencies:\n  click: ^7\n")]
#[case("pyproject.YML", "name: addon\ndependencies:\n  click: ^7\n")]
fn load_detects_format_from_extension(#[case] file_name: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join(file_name);
    fs::write(&file_path, content).unwrap();

    let config: Poetry = ConfigStore::new()
        .load(&NormalizedPath::new(&file_path))
        .unwrap();

    assert_eq!(config.name, "addon");
    assert_eq!(config.dependencies["click"], "^7");
}

#[test]
fn save_toml_writes_tables() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("out.toml");
    let path = NormalizedPath::new(&file_path);

    let config = Poetry {
        name: "resolved".into(),
        dependencies: BTreeMap::from([("aiohttp".to_string(), "3.6.*".to_string())]),
    };
    ConfigStore::new().save(&path, &config).unwrap();

    let content = fs::read_to_string(&file_path).unwrap();
    assert!(content.contains("name = \"resolved\""));
    assert!(content.contains("[dependencies]"));
    assert!(content.contains("aiohttp = \"3.6.*\""));
}

#[test]
fn save_then_load_preserves_value() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("nested/dir/out.json"));

    let original = Poetry {
        name: "roundtrip".into(),
        dependencies: BTreeMap::new(),
    };
    let store = ConfigStore::new();
    store.save(&path, &original).unwrap();
    let loaded: Poetry = store.load(&path).unwrap();

    assert_eq!(original, loaded);
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("pyproject.ini");
    fs::write(&file_path, "data").unwrap();

    let result: openpype_fs::Result<Poetry> =
        ConfigStore::new().load(&NormalizedPath::new(&file_path));

    assert!(matches!(
        result,
        Err(openpype_fs::Error::UnsupportedFormat { ref extension }) if extension == "ini"
    ));
}

#[test]
fn malformed_toml_reports_format_and_path() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("broken.toml");
    fs::write(&file_path, "[tool.poetry\nname = ").unwrap();

    let err = ConfigStore::new()
        .load::<Poetry>(&NormalizedPath::new(&file_path))
        .unwrap_err();

    match err {
        openpype_fs::Error::ConfigParse { path, format, .. } => {
            assert_eq!(format, "TOML");
            assert_eq!(path, file_path);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn format_display_names() {
    assert_eq!(ConfigFormat::Toml.to_string(), "TOML");
    assert_eq!(ConfigFormat::Json.to_string(), "JSON");
    assert_eq!(ConfigFormat::Yaml.to_string(), "YAML");
    assert_eq!(ConfigFormat::from_extension("Toml"), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_extension("lock"), None);
}
