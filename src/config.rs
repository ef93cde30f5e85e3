//! Configuration management for the HTML checker.
//!
//! Handles:
//! - Command-line argument parsing
//! - Environment overrides for the Java and jar locations
//! - Project (`.nu-check.toml`) and user-level config files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Name of the project-level config file
pub const PROJECT_CONFIG_FILE: &str = ".nu-check.toml";

/// Where the `vnu-jar` npm package installs the checker
pub const DEFAULT_VNU_JAR: &str = "node_modules/vnu-jar/build/dist/vnu.jar";

/// Room for large diagnostic volumes
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 20_000 * 1024;

/// Known false positives suppressed by default.
///
/// `autocomplete` shows up on buttons and checkbox/radio inputs because of
/// Firefox's non-standard behavior. `aria-disabled` on a link is discouraged
/// but valid.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "Attribute “autocomplete” is only allowed when the input type is.*",
    "Attribute “autocomplete” not allowed on element “button” at this point.",
    "An “aria-disabled” attribute whose value is “true” should not be specified on an “a” element that has an “href” attribute.",
];

/// Search-engine verification stubs, not real documents
pub const DEFAULT_EXCLUDES: &[&str] = &["**/google*.html", "**/yandex_*.html"];

/// Message wording and default reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Nu,
    W3c,
}

impl Profile {
    /// Suffix appended to fatal error messages
    pub fn stop_notice(self) -> &'static str {
        match self {
            Profile::Nu => "Nu validation stopped.",
            Profile::W3c => "W3C test stop running.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Command-line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "nu-check")]
#[command(about = "Validate HTML files with the Nu Html Checker")]
#[command(version)]
pub struct Args {
    /// Files, directories or glob patterns to check
    pub paths: Vec<String>,

    #[arg(long, value_enum, help = "Output style (nu, w3c)")]
    pub profile: Option<Profile>,

    #[arg(long, value_enum, help = "Report format (human, json)")]
    pub format: Option<OutputFormat>,

    #[arg(long, env = "NU_CHECK_JAVA", help = "Java executable")]
    pub java: Option<String>,

    #[arg(long, env = "VNU_JAR", help = "Path to vnu.jar")]
    pub vnu_jar: Option<PathBuf>,

    /// Replaces the built-in ignore list
    #[arg(long = "ignore", value_name = "REGEX")]
    pub ignore: Vec<String>,

    #[arg(long, help = "Don't suppress the built-in false positives")]
    pub no_default_ignores: bool,

    /// Replaces the built-in exclusion globs
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    #[arg(long, help = "Config file to use instead of the discovered one")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Settings read from a TOML config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub java: Option<String>,
    pub vnu_jar: Option<PathBuf>,
    pub profile: Option<Profile>,
    pub format: Option<OutputFormat>,
    pub ignore_patterns: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub max_output_bytes: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Explicit path, else project file, else user config dir.
    pub fn discover(explicit: Option<&Path>, project_dir: &Path) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }

        let project = project_dir.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            log::debug!("Using project config {}", project.display());
            return Self::load(&project).map(Some);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("nu-check").join("config.toml");
            if user.is_file() {
                log::debug!("Using user config {}", user.display());
                return Self::load(&user).map(Some);
            }
        }

        Ok(None)
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub paths: Vec<String>,
    pub profile: Profile,
    pub format: OutputFormat,
    pub java: String,
    pub vnu_jar: PathBuf,
    pub ignore_patterns: Vec<String>,
    pub exclude: Vec<String>,
    pub max_output_bytes: usize,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command line, environment and config files
    pub fn from_args_and_env() -> Result<Self> {
        let args = Args::parse();
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let file = FileConfig::discover(args.config.as_deref(), &cwd)?;
        Ok(Self::merge(args, file.unwrap_or_default()))
    }

    /// Layer explicit arguments over file settings and defaults
    pub fn merge(args: Args, file: FileConfig) -> Self {
        let ignore_patterns = if args.no_default_ignores || !args.ignore.is_empty() {
            args.ignore
        } else {
            file.ignore_patterns
                .unwrap_or_else(|| to_strings(DEFAULT_IGNORE_PATTERNS))
        };

        let exclude = if !args.exclude.is_empty() {
            args.exclude
        } else {
            file.exclude.unwrap_or_else(|| to_strings(DEFAULT_EXCLUDES))
        };

        Config {
            paths: args.paths,
            profile: args.profile.or(file.profile).unwrap_or_default(),
            format: args.format.or(file.format).unwrap_or_default(),
            java: args.java.or(file.java).unwrap_or_else(|| "java".to_string()),
            vnu_jar: args
                .vnu_jar
                .or(file.vnu_jar)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VNU_JAR)),
            ignore_patterns,
            exclude,
            max_output_bytes: file.max_output_bytes.unwrap_or(DEFAULT_MAX_OUTPUT_BYTES),
            log_level: args.log_level,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::merge(Args::default(), FileConfig::default());
        assert_eq!(config.profile, Profile::Nu);
        assert_eq!(config.format, OutputFormat::Human);
        assert_eq!(config.java, "java");
        assert_eq!(config.vnu_jar, PathBuf::from(DEFAULT_VNU_JAR));
        assert_eq!(config.ignore_patterns.len(), DEFAULT_IGNORE_PATTERNS.len());
        assert_eq!(config.exclude, vec!["**/google*.html", "**/yandex_*.html"]);
        assert_eq!(config.max_output_bytes, 20_480_000);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "nu-check",
            "--profile",
            "w3c",
            "--ignore",
            "A",
            "--ignore",
            "B",
            "dist",
        ])
        .unwrap();
        assert_eq!(args.profile, Some(Profile::W3c));
        assert_eq!(args.ignore, vec!["A", "B"]);
        assert_eq!(args.paths, vec!["dist"]);
    }

    #[test]
    fn test_no_default_ignores() {
        let args = Args {
            no_default_ignores: true,
            ..Args::default()
        };
        let file = FileConfig {
            ignore_patterns: Some(vec!["from-file".to_string()]),
            ..FileConfig::default()
        };
        assert!(Config::merge(args, file).ignore_patterns.is_empty());
    }

    #[test]
    fn test_file_config_parse() {
        let file: FileConfig = toml::from_str(
            r#"
java = "/opt/jdk/bin/java"
profile = "w3c"
ignore_patterns = ["foo.*"]
max_output_bytes = 1024
"#,
        )
        .unwrap();
        assert_eq!(file.java.as_deref(), Some("/opt/jdk/bin/java"));
        assert_eq!(file.profile, Some(Profile::W3c));
        assert_eq!(file.max_output_bytes, Some(1024));

        assert!(toml::from_str::<FileConfig>("colour = true").is_err());
    }
}
