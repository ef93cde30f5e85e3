//! Command-line entry point.
//!
//! The only place that turns a run into a process exit code.

use std::io;
use std::path::PathBuf;

use anyhow::Result;

use crate::config::{Config, OutputFormat};
use crate::discovery::{self, Excludes};
use crate::reporter;
use crate::runner::{RunConfiguration, Runner, RuntimeSettings};

/// Resolve files from the configured paths and run the checker.
pub async fn run(config: &Config) -> Result<i32> {
    let excludes = Excludes::new(&config.exclude)?;
    let files: Vec<PathBuf> = discovery::discover(&config.paths, &excludes)?;
    log::debug!("Discovered {} file(s)", files.len());

    let reporter = reporter::for_profile(config.profile, config.format == OutputFormat::Json);
    let run_config = RunConfiguration {
        files,
        ignore_patterns: config.ignore_patterns.clone(),
        reporter,
    };

    let runner = Runner::new(RuntimeSettings::from(config));
    let outcome = runner.run(run_config).await;

    if let Some(error) = &outcome.error {
        reporter::render_error(config.profile, error, &mut io::stderr().lock())?;
    }

    Ok(outcome.exit_code)
}

/// Parse arguments, set up logging and run; returns the process exit code.
pub async fn main() -> i32 {
    let config = match Config::from_args_and_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match run(&config).await {
        Ok(code) => code,
        Err(e) => {
            log::debug!("Run aborted: {:?}", e);
            let message = format!("{:#}", e);
            if let Err(write_err) =
                reporter::render_error(config.profile, &message, &mut io::stderr().lock())
            {
                log::warn!("Failed to write error: {}", write_err);
            }
            1
        }
    }
}
