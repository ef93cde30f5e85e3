//! Report rendering.
//!
//! A [`Reporter`] receives the decoded report once the checker has exited.
//! Plain closures work as reporters, so callers can plug in their own output.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;

use colored::{ColoredString, Colorize};

use crate::config::Profile;
use crate::report::{Location, MessageKind, ValidationMessage, ValidationReport};

/// Receives the outcome of a validation run
pub trait Reporter {
    /// Called once before the checker is spawned
    fn started(&self, _files: &[PathBuf]) {}

    fn report(&self, report: &ValidationReport, files: &[PathBuf]);
}

impl<F> Reporter for F
where
    F: Fn(&ValidationReport, &[PathBuf]),
{
    fn report(&self, report: &ValidationReport, files: &[PathBuf]) {
        self(report, files)
    }
}

/// Build the reporter matching a profile and output format.
pub fn for_profile(profile: Profile, json: bool) -> Box<dyn Reporter> {
    match (profile, json) {
        (_, true) => Box::new(JsonReporter),
        (Profile::Nu, false) => Box::new(NuReporter),
        (Profile::W3c, false) => Box::new(W3cReporter),
    }
}

fn paint(kind: MessageKind, text: String) -> ColoredString {
    match kind {
        MessageKind::Error | MessageKind::NonDocumentError => text.red(),
        MessageKind::Warning => text.yellow(),
        MessageKind::Info => text.white(),
    }
}

fn list_files(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `url:line:column`, leaving out whatever the checker didn't send
fn location_line(location: &Location) -> String {
    let mut line = location.display_url().to_string();
    if let Some(last_line) = location.last_line {
        line.push_str(&format!(":{}", last_line));
    }
    if let Some(column) = location.first_column {
        line.push_str(&format!(":{}", column));
    }
    line
}

/// Default reporter: per-message blocks on stderr, summary on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct NuReporter;

impl NuReporter {
    pub fn render_message(message: &ValidationMessage) -> String {
        let mut lines = Vec::new();
        if let Some(location) = &message.location {
            lines.push(location_line(location));
        }
        let heading = match &message.text {
            Some(text) => format!("[{}] {}", message.kind.label(), text),
            None => format!("[{}]", message.kind.label()),
        };
        lines.push(paint(message.kind, heading).to_string());
        if let Some(snippet) = &message.snippet {
            lines.push(snippet.clone());
        }
        lines.join("\n")
    }

    pub fn render(
        &self,
        report: &ValidationReport,
        files: &[PathBuf],
        details: &mut dyn Write,
        summary: &mut dyn Write,
    ) -> io::Result<()> {
        if !report.messages.is_empty() {
            let blocks: Vec<String> = report.messages.iter().map(Self::render_message).collect();
            writeln!(details)?;
            writeln!(details, "{}", blocks.join("\n\n"))?;
            writeln!(details)?;
        }

        let errors = report.count(MessageKind::Error);
        let warnings = report.count(MessageKind::Warning);
        let infos = report.count(MessageKind::Info);
        let non_document = report.count(MessageKind::NonDocumentError);

        writeln!(
            summary,
            "{}",
            format!("Checked {} file(s)", files.len()).blue()
        )?;
        if non_document > 0 {
            writeln!(
                summary,
                "{}",
                format!("{} document(s) could not be checked.", non_document).red()
            )?;
        }

        if errors == 0 && warnings == 0 && non_document == 0 {
            writeln!(summary)?;
            writeln!(
                summary,
                "{}",
                "Nu checker found no errors or warnings.".green()
            )?;
            writeln!(summary)?;
            return Ok(());
        }

        if errors > 0 {
            writeln!(summary, "{}", format!("Found {} error(s).", errors).red())?;
        }
        if warnings > 0 {
            writeln!(
                summary,
                "{}",
                format!("Found {} warning(s).", warnings).yellow()
            )?;
        }
        if infos > 0 {
            writeln!(summary, "{}", format!("Found {} tip(s).", infos).white())?;
        }
        Ok(())
    }
}

impl Reporter for NuReporter {
    fn started(&self, files: &[PathBuf]) {
        println!("{}", "Nu validation start running...".blue());
        println!("{}\n {}", "Files to check:".blue(), list_files(files));
    }

    fn report(&self, report: &ValidationReport, files: &[PathBuf]) {
        let stderr = io::stderr();
        let stdout = io::stdout();
        if let Err(e) = self.render(report, files, &mut stderr.lock(), &mut stdout.lock()) {
            log::warn!("Failed to write report: {}", e);
        }
    }
}

/// W3C-style reporter: one header line and a block per message
#[derive(Debug, Clone, Copy, Default)]
pub struct W3cReporter;

impl W3cReporter {
    pub fn render_message(message: &ValidationMessage) -> String {
        let kind = match message.kind {
            MessageKind::Error => "Error",
            MessageKind::Warning => "Warning",
            MessageKind::Info => "Info",
            MessageKind::NonDocumentError => "Non-document-error",
        };
        let color_kind = if message.kind.is_error() {
            MessageKind::Error
        } else {
            MessageKind::Warning
        };

        let mut heading = paint(color_kind, format!("{} in ", kind)).to_string();
        match &message.location {
            Some(location) => {
                let line = location.last_line.unwrap_or(0);
                let (start, length) = location
                    .highlight
                    .map(|h| (h.start, h.length))
                    .unwrap_or((0, 0));
                heading.push_str(&format!(
                    "{} at line {}:{}-{}:{}",
                    location.url.as_deref().unwrap_or(""),
                    line,
                    start,
                    line,
                    length
                ));
            }
            None => heading.push_str("unknown location"),
        }

        let mut lines = vec![heading];
        lines.extend(message.text.clone());
        lines.extend(message.snippet.clone());
        lines.join("\n")
    }

    pub fn render(
        &self,
        report: &ValidationReport,
        details: &mut dyn Write,
        summary: &mut dyn Write,
    ) -> io::Result<()> {
        if report.messages.is_empty() {
            writeln!(summary)?;
            writeln!(
                summary,
                "{}",
                "The W3C validator found no errors. Good job!".green()
            )?;
            writeln!(summary)?;
            return Ok(());
        }

        let errors = report.count(MessageKind::Error) + report.count(MessageKind::NonDocumentError);
        let warnings = report.count(MessageKind::Warning);
        writeln!(details)?;
        writeln!(
            details,
            "{}",
            format!(
                "W3C test found {} error(s) and {} warning(s).",
                errors, warnings
            )
            .red()
        )?;

        let blocks: Vec<String> = report.messages.iter().map(Self::render_message).collect();
        writeln!(details, "\n\n{}\n\n", blocks.join("\n\n"))?;
        Ok(())
    }
}

impl Reporter for W3cReporter {
    fn started(&self, files: &[PathBuf]) {
        println!("{}", "W3C test start running...".green());
        println!("{}\n {}", "Files to check:".green(), list_files(files));
    }

    fn report(&self, report: &ValidationReport, _files: &[PathBuf]) {
        let stderr = io::stderr();
        let stdout = io::stdout();
        if let Err(e) = self.render(report, &mut stderr.lock(), &mut stdout.lock()) {
            log::warn!("Failed to write report: {}", e);
        }
    }
}

/// Writes the normalized report as JSON on stdout.
///
/// The output uses `kind`/`text`/`snippet`/`location` rather than the
/// checker's `type`/`subType` wire shape, so it is meant for downstream
/// tools and is not accepted by [`ValidationReport::from_json`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn render(&self, report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &ValidationReport, _files: &[PathBuf]) {
        let stdout = io::stdout();
        if let Err(e) = self.render(report, &mut stdout.lock()) {
            log::warn!("Failed to write report: {}", e);
        }
    }
}

/// Print a fatal error followed by the profile's stop notice.
pub fn render_error(profile: Profile, error: &dyn Display, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        format!("{} {}", error, profile.stop_notice()).red()
    )
}
