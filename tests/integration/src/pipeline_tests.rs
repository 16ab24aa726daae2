//! Pipeline integration tests
//!
//! Each test runs the whole flow a studio deployment goes through: read the
//! base, fold addons from disk, resolve for a platform and, where a shell is
//! available, materialize an environment with a scripted installer.

use openpype_deps::{
    ConfigMerger, ConfigSource, ConflictPolicy, Context, DependencyResolver, Error,
    FileConfigSource, Platform, Settings, SettingsLoader, get_full_config, load_full_config,
};
use openpype_env::{
    CommandInstaller, ENVIRONMENT_RECORD, EnvironmentMaterializer, EnvironmentRecord,
    InstallerCommand, MANIFEST_FILE, ProvisionStatus,
};
use openpype_fs::NormalizedPath;
use openpype_test_utils::fixtures;
use openpype_test_utils::studio::TestStudio;
use tempfile::TempDir;

const FTRACK_ADDON: &str = r#"
[tool.poetry.dependencies]
ftrack-python-api = "^2.3"
aiohttp = "3.7.*"

[tool.poetry.dev-dependencies]
"#;

const DEADLINE_ADDON: &str = r#"
[tool.poetry.dependencies]
aiohttp = "3.8.*"
requests = "^2.25"

[tool.poetry.dev-dependencies]
pytest-print = "*"
"#;

fn studio_with_two_addons() -> TestStudio {
    let mut studio = TestStudio::with_fixtures();
    studio.add_addon("ftrack", FTRACK_ADDON);
    studio.add_addon("deadline", DEADLINE_ADDON);
    studio
}

// =============================================================================
// Merge and resolve
// =============================================================================

#[test]
fn addons_fold_in_registration_order() {
    let studio = studio_with_two_addons();
    let context = Context::default().with_platform(Platform::Linux);

    let resolved = load_full_config(
        &context,
        &studio.base_location(),
        &studio.addon_locations(),
        &FileConfigSource::new(),
    )
    .unwrap();
    let set = DependencyResolver::new(context).resolve(&resolved).unwrap();

    // deadline is registered last and wins the shared constraint
    assert_eq!(set.runtime["aiohttp"].constraint(), Some("3.8.*"));
    assert_eq!(set.runtime["ftrack-python-api"].constraint(), Some("^2.3"));
    assert_eq!(set.runtime["requests"].constraint(), Some("^2.25"));
    assert_eq!(set.runtime["new_dependency"].constraint(), Some("^1.0.0"));
    assert_eq!(set.dev["new_dependency"].constraint(), Some("^2.0.0"));
    assert_eq!(set.dev["pytest-print"].constraint(), Some("*"));
    assert_eq!(set.thirdparty["ffmpeg"].version, "4.4");
}

#[test]
fn reversed_registration_changes_the_winner() {
    let studio = studio_with_two_addons();
    let mut addons = studio.addon_locations();
    addons.reverse();
    let context = Context::default().with_platform(Platform::Linux);

    let resolved = load_full_config(&context, &studio.base_location(), &addons, &FileConfigSource::new())
        .unwrap();

    assert_eq!(
        resolved.dependencies().unwrap()["aiohttp"].as_str(),
        Some("3.7.*")
    );
}

#[test]
fn reports_describe_each_addon() {
    let studio = studio_with_two_addons();
    let context = Context::default().with_platform(Platform::Linux);
    let source = FileConfigSource::new();
    let base = source.get_configuration(&studio.base_location()).unwrap();

    let (_, reports) = ConfigMerger::new(context)
        .merge_addons_with_reports(&base, &studio.addon_locations(), &source)
        .unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].thirdparty_conflicts().count(), 1);
    assert!(reports[1].overridden.contains(&"tool.poetry.dependencies.aiohttp".to_string()));
    assert!(reports[2].overridden.contains(&"tool.poetry.dependencies.aiohttp".to_string()));
    assert!(reports[2].location.as_deref().unwrap().contains("deadline"));
}

#[test]
fn every_platform_resolves_from_fixtures() {
    let source = FileConfigSource::new();
    let base = source
        .get_configuration(&fixtures::base_path().to_string_lossy())
        .unwrap();
    let addons = [fixtures::addon_dir("example").to_string_lossy().into_owned()];

    for platform in Platform::ALL {
        let context = Context::default().with_platform(platform);
        let resolved = get_full_config(&context, &base, &addons, &source).unwrap();
        let set = DependencyResolver::new(context).resolve(&resolved).unwrap();

        assert_eq!(set.platform, platform);
        assert_eq!(set.thirdparty["oiio"].version, "2.1.0");
        assert!(set.thirdparty["ffmpeg"].url.is_some(), "{platform}: ffmpeg url");
    }
}

#[test]
fn settings_drive_the_conflict_policy() {
    let global = TempDir::new().unwrap();
    std::fs::write(
        global.path().join("config.toml"),
        "conflict_policy = \"reject\"\nplatform = \"linux\"\n",
    )
    .unwrap();
    let settings: Settings = SettingsLoader::with_global_config_dir(global.path())
        .load(None)
        .unwrap();
    assert_eq!(settings.conflict_policy, ConflictPolicy::Reject);

    let studio = TestStudio::with_fixtures();
    let err = load_full_config(
        &settings.to_context(),
        &studio.base_location(),
        &studio.addon_locations(),
        &FileConfigSource::new(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::ThirdpartyConflict { .. }), "{err:?}");
}

// =============================================================================
// Materialize
// =============================================================================

#[cfg(unix)]
#[tokio::test]
async fn provision_from_merged_studio_config() {
    let studio = studio_with_two_addons();
    let context = Context::default().with_platform(Platform::Linux);
    let resolved = load_full_config(
        &context,
        &studio.base_location(),
        &studio.addon_locations(),
        &FileConfigSource::new(),
    )
    .unwrap();
    let set = DependencyResolver::new(context).resolve(&resolved).unwrap();
    let target = NormalizedPath::new(studio.target_dir("linux"));

    // The lock step echoes every runtime dependency name into a lock file
    let lock_script = "python_free_lock() { \
        printf '[[package]]\\nname = \"%s\"\\nversion = \"0.0.0\"\\n\\n' aiohttp requests ftrack-python-api; }; \
        test -f pyproject.toml && python_free_lock > poetry.lock";
    let installer = CommandInstaller::new(
        InstallerCommand::new("sh").args(["-c", lock_script]),
        InstallerCommand::new("sh").args(["-c", "grep -q requests poetry.lock"]),
    )
    .with_name("scripted");

    let report = EnvironmentMaterializer::new(installer)
        .provision(&set, &target)
        .await
        .unwrap();

    assert_eq!(report.status, ProvisionStatus::Installed, "{}", report.stderr);
    assert_eq!(report.installer, "scripted");
    assert_eq!(report.locked_packages.len(), 3);
    assert!(!report.scratch_dir.exists());

    let manifest = std::fs::read_to_string(target.join(MANIFEST_FILE).to_native()).unwrap();
    let manifest: toml::Table = manifest.parse().unwrap();
    assert_eq!(
        manifest["tool"]["poetry"]["dependencies"]["aiohttp"].as_str(),
        Some("3.8.*")
    );

    let record: EnvironmentRecord = serde_json::from_str(
        &std::fs::read_to_string(target.join(ENVIRONMENT_RECORD).to_native()).unwrap(),
    )
    .unwrap();
    assert_eq!(record.installer, "scripted");
    assert_eq!(record.thirdparty["ocioconfig"], "1.0.0");
    assert_eq!(record.manifest_checksum, report.manifest_checksum);
}

#[cfg(unix)]
#[tokio::test]
async fn reprovisioning_same_set_gives_same_manifest_checksum() {
    let studio = TestStudio::with_fixtures();
    let context = Context::default().with_platform(Platform::Darwin);
    let resolved = load_full_config(
        &context,
        &studio.base_location(),
        &studio.addon_locations(),
        &FileConfigSource::new(),
    )
    .unwrap();
    let set = DependencyResolver::new(context).resolve(&resolved).unwrap();

    let mut checksums = Vec::new();
    for name in ["first", "second"] {
        let target = NormalizedPath::new(studio.target_dir(name));
        let installer = CommandInstaller::new(
            InstallerCommand::new("sh").args(["-c", "touch poetry.lock"]),
            InstallerCommand::new("true"),
        );
        let report = EnvironmentMaterializer::new(installer)
            .provision(&set, &target)
            .await
            .unwrap();
        assert!(report.is_success(), "{}", report.stderr);
        checksums.push(report.manifest_checksum);
    }

    assert_eq!(checksums[0], checksums[1]);
}
