//! Command lines for the probe and the checker.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::java::JavaRuntime;

/// Thread stack size passed to 32-bit runtimes
pub const SMALL_STACK_FLAG: &str = "-Xss512k";

/// Flags always passed to the checker, after the jar
const CHECKER_FLAGS: &[&str] = &[
    "--format",
    "json",
    "--asciiquotes",
    "--skip-non-html",
    "--Werror",
];

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
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

    /// Position of an argument, if present
    pub fn position(&self, arg: &str) -> Option<usize> {
        self.args.iter().position(|a| a == arg)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// `java -version`
pub fn probe_invocation(java: &str) -> Invocation {
    Invocation::new(java).arg("-version")
}

/// Full checker command line for the given runtime and files.
///
/// All ignore patterns are folded into one alternation passed through a
/// single `--filterpattern`; file paths come last, in caller order.
pub fn checker_invocation(
    java: &str,
    runtime: &JavaRuntime,
    vnu_jar: &Path,
    ignore_patterns: &[String],
    files: &[PathBuf],
) -> Invocation {
    let mut invocation = Invocation::new(java);

    if runtime.needs_small_stack() {
        invocation = invocation.arg(SMALL_STACK_FLAG);
    }

    invocation = invocation
        .arg("-jar")
        .arg(vnu_jar.display().to_string())
        .args(CHECKER_FLAGS.iter().copied());

    if !ignore_patterns.is_empty() {
        invocation = invocation
            .arg("--filterpattern")
            .arg(ignore_patterns.join("|"));
    }

    invocation.args(files.iter().map(|f| f.display().to_string()))
}
