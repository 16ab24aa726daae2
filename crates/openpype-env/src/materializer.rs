//! Building an installed environment from a dependency set

use crate::installer::{InstallStep, Installer, PoetryInstaller};
use crate::lock::read_lock;
use crate::manifest::{MANIFEST_FILE, render_manifest};
use crate::report::{ENVIRONMENT_RECORD, EnvironmentRecord, ProvisionReport, ProvisionStatus};
use crate::{Error, Result};
use openpype_deps::{DEFAULT_PRODUCT, DependencySet, InstallerSettings};
use openpype_fs::{ConfigStore, NormalizedPath, RobustnessConfig, checksum, io};
use std::time::Duration;
use tempfile::TempDir;

/// Provisions environments with an [`Installer`].
///
/// The lock step runs in a scratch directory so a failed resolve never
/// leaves a half-written lock file in the target. The scratch directory is
/// removed when [`provision`](Self::provision) returns, whatever the outcome.
pub struct EnvironmentMaterializer {
    installer: Box<dyn Installer>,
    timeout: Option<Duration>,
    product: String,
    robustness: RobustnessConfig,
}

impl Default for EnvironmentMaterializer {
    fn default() -> Self {
        Self::new(PoetryInstaller::new())
    }
}

impl EnvironmentMaterializer {
    pub fn new(installer: impl Installer + 'static) -> Self {
        Self {
            installer: Box::new(installer),
            timeout: None,
            product: DEFAULT_PRODUCT.to_string(),
            robustness: RobustnessConfig::default(),
        }
    }

    /// A Poetry materializer configured from settings.
    pub fn from_settings(settings: &InstallerSettings, product: &str) -> Self {
        Self::new(PoetryInstaller::with_program(&settings.program))
            .with_timeout(settings.timeout())
            .with_product(product)
    }

    /// Limit each installer step; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    /// Materialize `set` into `target`.
    ///
    /// Only an unusable target or a failure writing the manifest is
    /// returned as an error. Installer failures are described by the
    /// returned report. Once the install step succeeds the status stays
    /// `Installed`; an unreadable lock file leaves `locked_packages` empty
    /// and is noted in `stderr`.
    pub async fn provision(&self, set: &DependencySet, target: &NormalizedPath) -> Result<ProvisionReport> {
        self.prepare_target(target).await?;

        let scratch = TempDir::new().map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let scratch_path = NormalizedPath::new(scratch.path());

        let manifest = render_manifest(set, &self.product)?;
        let manifest_checksum = checksum::content_checksum(manifest.as_bytes());
        io::write_atomic(&target.join(MANIFEST_FILE), manifest.as_bytes(), self.robustness)?;
        io::write_atomic(&scratch_path.join(MANIFEST_FILE), manifest.as_bytes(), self.robustness)?;
        tracing::debug!(target_dir = %target, checksum = %manifest_checksum, "Wrote manifest");

        let mut report = ProvisionReport {
            status: ProvisionStatus::Installed,
            platform: set.platform,
            target: target.to_string(),
            installer: self.installer.name().to_string(),
            manifest_checksum,
            failed_step: None,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            locked_packages: Vec::new(),
            scratch_dir: scratch.path().to_path_buf(),
        };

        let lock = self
            .installer
            .run(InstallStep::Lock, scratch.path(), self.timeout)
            .await;
        report.record_step(lock);
        if !report.is_success() {
            return Ok(self.finish(report));
        }

        let lock_file = self.installer.lock_file();
        let scratch_lock = scratch_path.join(lock_file);
        if !scratch_lock.is_file() {
            report.status = ProvisionStatus::Failed;
            report.failed_step = Some(InstallStep::Lock);
            report
                .stderr
                .push_str(&format!("{} produced no {lock_file}\n", self.installer.name()));
            return Ok(self.finish(report));
        }
        if let Err(e) = io::copy_atomic(&scratch_lock, &target.join(lock_file)) {
            report.status = ProvisionStatus::Failed;
            report.failed_step = Some(InstallStep::Lock);
            report.stderr.push_str(&format!("{e}\n"));
            return Ok(self.finish(report));
        }

        let install = self
            .installer
            .run(InstallStep::Install, &target.to_native(), self.timeout)
            .await;
        report.record_step(install);
        if !report.is_success() {
            return Ok(self.finish(report));
        }

        // The environment is installed at this point; bookkeeping failures
        // are diagnostics on the report.
        match read_lock(&target.join(lock_file)) {
            Ok(packages) => report.locked_packages = packages,
            Err(e) => {
                tracing::warn!(target_dir = %target, error = %e, "Installed lock file could not be read");
                report.stderr.push_str(&format!("{e}\n"));
            }
        }
        if let Err(e) = self.write_record(set, &report, target) {
            tracing::warn!(target_dir = %target, error = %e, "Failed to write environment record");
            report.stderr.push_str(&format!("{e}\n"));
        }

        Ok(self.finish(report))
    }

    async fn prepare_target(&self, target: &NormalizedPath) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidTarget {
            path: target.to_string(),
            reason: reason.to_string(),
        };

        if target.as_str().is_empty() {
            return Err(invalid("path is empty"));
        }
        if target.exists() && !target.is_dir() {
            return Err(invalid("exists and is not a directory"));
        }
        tokio::fs::create_dir_all(target.to_native())
            .await
            .map_err(|e| invalid(&e.to_string()))
    }

    fn write_record(&self, set: &DependencySet, report: &ProvisionReport, target: &NormalizedPath) -> Result<()> {
        let record = EnvironmentRecord {
            platform: set.platform,
            manifest_checksum: report.manifest_checksum.clone(),
            created_at: chrono::Utc::now(),
            installer: report.installer.clone(),
            packages: report.locked_packages.clone(),
            thirdparty: set
                .thirdparty
                .iter()
                .map(|(name, tool)| (name.clone(), tool.version.clone()))
                .collect(),
        };
        ConfigStore::with_robustness(self.robustness).save(&target.join(ENVIRONMENT_RECORD), &record)?;
        Ok(())
    }

    fn finish(&self, report: ProvisionReport) -> ProvisionReport {
        match report.status {
            ProvisionStatus::Installed => tracing::info!(
                target_dir = %report.target,
                packages = report.locked_packages.len(),
                "Environment installed"
            ),
            status => tracing::info!(
                target_dir = %report.target,
                ?status,
                step = ?report.failed_step,
                exit_code = ?report.exit_code,
                "Environment provisioning failed"
            ),
        }
        report
    }
}
