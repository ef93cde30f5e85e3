//! Java runtime probing.
//!
//! Parses the diagnostic output of `java -version` into a [`JavaRuntime`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, RunError};

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:java|openjdk) version "([^"]*)""#).unwrap());

/// Oldest feature release the checker runs on
pub const MIN_FEATURE_RELEASE: u32 = 8;

/// Version string reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaVersion {
    pub raw: String,
    pub major: u32,
    pub minor: u32,
}

impl JavaVersion {
    /// Parse a version such as `1.8.0_292`, `11.0.2`, `17` or `21-ea`.
    ///
    /// A missing minor component counts as 0.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('.');
        let major = leading_number(parts.next()?)?;
        let minor = parts.next().and_then(leading_number).unwrap_or(0);
        Some(Self {
            raw: raw.to_string(),
            major,
            minor,
        })
    }

    /// Feature release, accounting for the legacy `1.x` scheme where `1.8` is Java 8.
    pub fn feature_release(&self) -> u32 {
        if self.major == 1 { self.minor } else { self.major }
    }

    pub fn is_supported(&self) -> bool {
        self.feature_release() >= MIN_FEATURE_RELEASE
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Installed runtime as seen by the probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaRuntime {
    pub version: JavaVersion,
    pub is_64bit: bool,
}

impl JavaRuntime {
    /// Interpret probe output, rejecting runtimes the checker can't use.
    pub fn from_probe(output: &str) -> Result<Self> {
        let raw = VERSION_RE
            .captures(output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|v| !v.is_empty())
            .ok_or(RunError::VersionNotFound)?;

        let version =
            JavaVersion::parse(raw).ok_or_else(|| RunError::VersionUnparsable(raw.to_string()))?;

        if !version.is_supported() {
            return Err(RunError::UnsupportedVersion(version.raw));
        }

        Ok(Self {
            version,
            is_64bit: output.contains("64-Bit"),
        })
    }

    /// 32-bit builds need a smaller thread stack to validate large documents.
    pub fn needs_small_stack(&self) -> bool {
        !self.is_64bit
    }
}

fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}
