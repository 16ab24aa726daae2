//! Installer backends driven as child processes

use crate::lock::LOCK_FILE;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Exit code reported when the installer program cannot be found
pub const EXIT_INSTALLER_MISSING: i32 = 127;

/// Exit code reported when a step exceeds its timeout
pub const EXIT_TIMED_OUT: i32 = 124;

/// The two installer invocations of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallStep {
    /// Resolve the manifest into a lock file
    Lock,
    /// Install the locked packages
    Install,
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStep::Lock => write!(f, "lock"),
            InstallStep::Install => write!(f, "install"),
        }
    }
}

/// How a single step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed,
    TimedOut,
    Missing,
}

/// Captured result of one installer step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub step: InstallStep,
    pub status: StepStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    fn from_output(step: InstallStep, output: Output) -> Self {
        let status = if output.status.success() {
            StepStatus::Succeeded
        } else {
            StepStatus::Failed
        };
        Self {
            step,
            status,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    fn missing(step: InstallStep, program: &str) -> Self {
        Self {
            step,
            status: StepStatus::Missing,
            exit_code: Some(EXIT_INSTALLER_MISSING),
            stdout: String::new(),
            stderr: format!("installer `{program}` not found"),
        }
    }

    fn timed_out(step: InstallStep, limit: Duration) -> Self {
        Self {
            step,
            status: StepStatus::TimedOut,
            exit_code: Some(EXIT_TIMED_OUT),
            stdout: String::new(),
            stderr: format!("{step} step timed out after {}s", limit.as_secs_f64()),
        }
    }

    fn os_error(step: InstallStep, program: &str, error: std::io::Error) -> Self {
        Self {
            step,
            status: StepStatus::Failed,
            exit_code: None,
            stdout: String::new(),
            stderr: format!("failed to run `{program}`: {error}"),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == StepStatus::Succeeded
    }
}

/// A program invocation: program, arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl InstallerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run in `cwd`, capturing output. The child is killed if `timeout`
    /// elapses first.
    pub async fn run(&self, step: InstallStep, cwd: &Path, timeout: Option<Duration>) -> StepOutput {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            %step,
            program = %self.program,
            args = ?self.args,
            cwd = %cwd.display(),
            "Running installer step"
        );

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return StepOutput::missing(step, &self.program);
            }
            Err(e) => return StepOutput::os_error(step, &self.program, e),
        };

        let output = child.wait_with_output();
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, output).await {
                Ok(result) => result,
                Err(_) => return StepOutput::timed_out(step, limit),
            },
            None => output.await,
        };

        match result {
            Ok(output) => StepOutput::from_output(step, output),
            Err(e) => StepOutput::os_error(step, &self.program, e),
        }
    }
}

/// A tool that can lock and install a Poetry-style manifest.
#[async_trait]
pub trait Installer: Send + Sync {
    fn name(&self) -> &str;

    /// The invocation for `step`.
    fn command(&self, step: InstallStep) -> InstallerCommand;

    /// File the lock step leaves next to the manifest.
    fn lock_file(&self) -> &str {
        LOCK_FILE
    }

    async fn run(&self, step: InstallStep, cwd: &Path, timeout: Option<Duration>) -> StepOutput {
        self.command(step).run(step, cwd, timeout).await
    }
}

/// Installs with Poetry, keeping the virtualenv inside the target directory.
#[derive(Debug, Clone)]
pub struct PoetryInstaller {
    program: String,
}

impl PoetryInstaller {
    pub fn new() -> Self {
        Self {
            program: "poetry".to_string(),
        }
    }

    /// Use a specific Poetry executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PoetryInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Installer for PoetryInstaller {
    fn name(&self) -> &str {
        "poetry"
    }

    fn command(&self, step: InstallStep) -> InstallerCommand {
        let command = InstallerCommand::new(&self.program)
            .env("POETRY_VIRTUALENVS_CREATE", "true")
            .env("POETRY_VIRTUALENVS_IN_PROJECT", "true");
        match step {
            InstallStep::Lock => command.args(["lock", "--no-interaction"]),
            InstallStep::Install => command.args(["install", "--no-interaction", "--no-root"]),
        }
    }
}

/// Runs arbitrary commands for each step.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    name: String,
    lock: InstallerCommand,
    install: InstallerCommand,
}

impl CommandInstaller {
    pub fn new(lock: InstallerCommand, install: InstallerCommand) -> Self {
        Self {
            name: lock.program.clone(),
            lock,
            install,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Installer for CommandInstaller {
    fn name(&self) -> &str {
        &self.name
    }

    fn command(&self, step: InstallStep) -> InstallerCommand {
        match step {
            InstallStep::Lock => self.lock.clone(),
            InstallStep::Install => self.install.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poetry_commands() {
        let poetry = PoetryInstaller::new();
        let lock = poetry.command(InstallStep::Lock);
        assert_eq!(lock.program, "poetry");
        assert_eq!(lock.args, vec!["lock", "--no-interaction"]);
        assert!(
            lock.env
                .contains(&("POETRY_VIRTUALENVS_IN_PROJECT".to_string(), "true".to_string()))
        );

        let install = PoetryInstaller::with_program("/opt/poetry/bin/poetry").command(InstallStep::Install);
        assert_eq!(install.program, "/opt/poetry/bin/poetry");
        assert_eq!(install.args[0], "install");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(InstallStep::Lock.to_string(), "lock");
        assert_eq!(InstallStep::Install.to_string(), "install");
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let cwd = std::env::temp_dir();
        let output = InstallerCommand::new("openpype-no-such-installer")
            .run(InstallStep::Lock, &cwd, None)
            .await;

        assert_eq!(output.status, StepStatus::Missing);
        assert_eq!(output.exit_code, Some(EXIT_INSTALLER_MISSING));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_is_captured() {
        let cwd = std::env::temp_dir();
        let output = InstallerCommand::new("sh")
            .args(["-c", "echo resolving; echo broken >&2; exit 3"])
            .run(InstallStep::Install, &cwd, None)
            .await;

        assert_eq!(output.status, StepStatus::Failed);
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "resolving");
        assert_eq!(output.stderr.trim(), "broken");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_step() {
        let cwd = std::env::temp_dir();
        let output = InstallerCommand::new("sleep")
            .arg("5")
            .run(InstallStep::Install, &cwd, Some(Duration::from_millis(100)))
            .await;

        assert_eq!(output.status, StepStatus::TimedOut);
        assert_eq!(output.exit_code, Some(EXIT_TIMED_OUT));
    }
}
