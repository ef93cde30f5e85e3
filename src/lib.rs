//! Nu Html Checker runner
//!
//! Runs the Nu Html Checker (`vnu.jar`) over a set of HTML files and turns
//! its JSON output into a typed report.
//!
//! This library provides:
//! - Java runtime probing (version and bitness)
//! - Checker invocation with streamed output collection
//! - Report decoding with normalized message kinds
//! - Pluggable reporters and configuration management

pub mod cli;
pub mod command;
pub mod config;
pub mod discovery;
pub mod error;
pub mod java;
pub mod launcher;
pub mod report;
pub mod reporter;
pub mod runner;

// Re-exports for the public API
pub use config::{Config, DEFAULT_IGNORE_PATTERNS, Profile};
pub use error::RunError;
pub use report::{MessageKind, ValidationMessage, ValidationReport};
pub use reporter::{JsonReporter, NuReporter, Reporter, W3cReporter};
pub use runner::{RunConfiguration, RunOutcome, Runner, RuntimeSettings};
