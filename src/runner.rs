//! Validation Runner
//!
//! Sequences one checker run: file-list check, Java probe, checker
//! invocation, report decoding and reporting. The runner never exits the
//! process; it hands back a [`RunOutcome`] for the caller to act on.

use std::path::PathBuf;

use crate::command::{self, Invocation};
use crate::config::{Config, DEFAULT_IGNORE_PATTERNS, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_VNU_JAR};
use crate::error::{Result, RunError};
use crate::java::JavaRuntime;
use crate::launcher::{LaunchError, Launcher, ProcessOutput, SystemLauncher};
use crate::report::ValidationReport;
use crate::reporter::{NuReporter, Reporter};

/// Exit code used when the checker was killed by a signal
const SIGNALED_EXIT_CODE: i32 = 1;

/// What to check and how to report it
pub struct RunConfiguration {
    pub files: Vec<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub reporter: Box<dyn Reporter>,
}

impl RunConfiguration {
    /// Built-in ignore list and the default reporter
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            reporter: Box::new(NuReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }
}

/// Where the runtime and checker live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub java: String,
    pub vnu_jar: PathBuf,
    pub max_output_bytes: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            vnu_jar: PathBuf::from(DEFAULT_VNU_JAR),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl From<&Config> for RuntimeSettings {
    fn from(config: &Config) -> Self {
        Self {
            java: config.java.clone(),
            vnu_jar: config.vnu_jar.clone(),
            max_output_bytes: config.max_output_bytes,
        }
    }
}

/// Result of one run
#[derive(Debug)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub report: Option<ValidationReport>,
    pub error: Option<RunError>,
}

impl RunOutcome {
    fn failed(error: RunError) -> Self {
        Self {
            exit_code: error.exit_code(),
            report: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Drives the checker through a [`Launcher`]
#[derive(Debug, Clone)]
pub struct Runner<L = SystemLauncher> {
    settings: RuntimeSettings,
    launcher: L,
}

impl Runner<SystemLauncher> {
    pub fn new(settings: RuntimeSettings) -> Self {
        let launcher = SystemLauncher::new(settings.max_output_bytes);
        Self { settings, launcher }
    }
}

impl<L: Launcher> Runner<L> {
    pub fn with_launcher(settings: RuntimeSettings, launcher: L) -> Self {
        Self { settings, launcher }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Run the checker once over `config.files`.
    pub async fn run(&self, config: RunConfiguration) -> RunOutcome {
        match self.try_run(&config).await {
            Ok((exit_code, report)) => RunOutcome {
                exit_code,
                report: Some(report),
                error: None,
            },
            Err(e) => {
                log::debug!("Run failed: {:?}", e);
                RunOutcome::failed(e)
            }
        }
    }

    async fn try_run(&self, config: &RunConfiguration) -> Result<(i32, ValidationReport)> {
        if config.files.is_empty() {
            return Err(RunError::NoFiles);
        }

        let runtime = self.probe().await?;
        log::info!(
            "Found Java {} ({})",
            runtime.version,
            if runtime.is_64bit { "64-bit" } else { "32-bit" }
        );

        let invocation = command::checker_invocation(
            &self.settings.java,
            &runtime,
            &self.settings.vnu_jar,
            &config.ignore_patterns,
            &config.files,
        );

        config.reporter.started(&config.files);

        let output = self.launch(&invocation).await?;
        let exit_code = output.code.unwrap_or(SIGNALED_EXIT_CODE);
        let text = output.stderr_text().unwrap_or_default();
        let report = ValidationReport::from_json(&text)?;
        log::debug!(
            "Checker exited with {} and {} message(s)",
            exit_code,
            report.messages.len()
        );

        config.reporter.report(&report, &config.files);

        Ok((exit_code, report))
    }

    async fn probe(&self) -> Result<JavaRuntime> {
        let invocation = command::probe_invocation(&self.settings.java);
        let output = self
            .launcher
            .execute(&invocation)
            .await
            .map_err(|e| match e {
                LaunchError::Io(e) => RunError::RuntimeUnavailable(e),
                LaunchError::OutputLimit(limit) => RunError::OutputLimit { limit },
            })?;

        if !output.success() {
            return Err(RunError::RuntimeFailed {
                program: self.settings.java.clone(),
                status: describe_status(&output),
            });
        }

        let text = output.stderr_text().ok_or(RunError::ProbeOutputMissing)?;
        JavaRuntime::from_probe(&text)
    }

    async fn launch(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        self.launcher
            .execute(invocation)
            .await
            .map_err(|e| match e {
                LaunchError::Io(e) => RunError::Launch(e),
                LaunchError::OutputLimit(limit) => RunError::OutputLimit { limit },
            })
    }
}

fn describe_status(output: &ProcessOutput) -> String {
    match output.code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}
