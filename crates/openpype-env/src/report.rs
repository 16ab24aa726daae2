//! Provisioning outcomes

use crate::installer::{InstallStep, StepOutput, StepStatus};
use crate::lock::LockedPackage;
use chrono::{DateTime, Utc};
use openpype_deps::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Record written into a successfully provisioned target
pub const ENVIRONMENT_RECORD: &str = "environment.json";

/// Overall result of a provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionStatus {
    Installed,
    /// A step exited unsuccessfully or produced no lock file
    Failed,
    TimedOut,
    InstallerMissing,
}

/// What happened when materializing one environment.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub status: ProvisionStatus,
    pub platform: Platform,
    pub target: String,
    pub installer: String,
    pub manifest_checksum: String,
    /// The step that ended the run unsuccessfully
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<InstallStep>,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub locked_packages: Vec<LockedPackage>,
    /// Scratch directory used for locking; removed when provisioning returns
    #[serde(skip)]
    pub scratch_dir: PathBuf,
}

impl ProvisionReport {
    pub fn is_success(&self) -> bool {
        self.status == ProvisionStatus::Installed
    }

    /// Process exit code a caller should propagate.
    pub fn exit_code_or_default(&self) -> i32 {
        match (self.status, self.exit_code) {
            (ProvisionStatus::Installed, _) => 0,
            (_, Some(code)) if code != 0 => code,
            _ => 1,
        }
    }

    pub(crate) fn record_step(&mut self, output: StepOutput) {
        self.exit_code = output.exit_code;
        self.stdout.push_str(&output.stdout);
        self.stderr.push_str(&output.stderr);
        let status = match output.status {
            StepStatus::Succeeded => return,
            StepStatus::Failed => ProvisionStatus::Failed,
            StepStatus::TimedOut => ProvisionStatus::TimedOut,
            StepStatus::Missing => ProvisionStatus::InstallerMissing,
        };
        self.status = status;
        self.failed_step = Some(output.step);
    }
}

/// Metadata persisted as `environment.json` beside the installed manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub platform: Platform,
    pub manifest_checksum: String,
    pub created_at: DateTime<Utc>,
    pub installer: String,
    pub packages: Vec<LockedPackage>,
    /// Selected third-party versions by tool
    pub thirdparty: BTreeMap<String, String>,
}
