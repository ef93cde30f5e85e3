//! Runner behavior against a scripted launcher
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use nu_html_checker::command::{Invocation, SMALL_STACK_FLAG};
use nu_html_checker::launcher::{LaunchError, Launcher, ProcessOutput};
use nu_html_checker::{
    MessageKind, NuReporter, RunConfiguration, RunError, Runner, RuntimeSettings,
    ValidationReport,
};

const PROBE_64: &str = r#"openjdk version "17.0.2" 2022-01-18
OpenJDK Runtime Environment (build 17.0.2+8-86)
OpenJDK 64-Bit Server VM (build 17.0.2+8-86, mixed mode, sharing)
"#;

const PROBE_32: &str = r#"java version "1.8.0_292"
Java(TM) SE Runtime Environment (build 1.8.0_292-b10)
Java HotSpot(TM) Client VM (build 25.292-b10, mixed mode)
"#;

const ONE_ERROR: &str = r#"{"messages":[{"type":"error","message":"x","url":"file:/a.html","lastLine":1,"firstColumn":2}]}"#;

/// Replays canned process results and records every invocation
#[derive(Default)]
struct FakeLauncher {
    responses: Mutex<VecDeque<Result<ProcessOutput, LaunchError>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeLauncher {
    fn new() -> Self {
        Self::default()
    }

    fn then(self, response: Result<ProcessOutput, LaunchError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn then_stderr(self, code: i32, stderr: &str) -> Self {
        self.then(Ok(ProcessOutput {
            code: Some(code),
            stderr: Some(stderr.as_bytes().to_vec()),
        }))
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl Launcher for FakeLauncher {
    async fn execute(&self, invocation: &Invocation) -> Result<ProcessOutput, LaunchError> {
        self.calls.lock().unwrap().push(invocation.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected process launch")
    }
}

fn settings() -> RuntimeSettings {
    RuntimeSettings {
        java: "java".to_string(),
        vnu_jar: PathBuf::from("/opt/vnu.jar"),
        max_output_bytes: 1024 * 1024,
    }
}

fn files(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn quiet(files: Vec<PathBuf>) -> RunConfiguration {
    RunConfiguration::new(files).with_reporter(|_: &ValidationReport, _: &[PathBuf]| {})
}

#[tokio::test]
async fn files_are_trailing_arguments_in_order() {
    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(0, r#"{"messages":[]}"#);
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["c.html", "a.html", "b.html"]))).await;
    assert_eq!(outcome.exit_code, 0);

    let calls = runner.launcher().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].args, vec!["-version"]);

    let args = &calls[1].args;
    assert_eq!(calls[1].program, "java");
    assert_eq!(&args[args.len() - 3..], &["c.html", "a.html", "b.html"]);
    assert_eq!(args[args.position_of("-jar") + 1], "/opt/vnu.jar");
    for flag in ["--format", "json", "--asciiquotes", "--skip-non-html", "--Werror"] {
        assert!(args.iter().any(|a| a == flag), "missing {flag}");
    }
}

trait PositionOf {
    fn position_of(&self, arg: &str) -> usize;
}

impl PositionOf for Vec<String> {
    fn position_of(&self, arg: &str) -> usize {
        self.iter()
            .position(|a| a == arg)
            .unwrap_or_else(|| panic!("{arg} not found in {self:?}"))
    }
}

#[tokio::test]
async fn ignore_patterns_become_one_filter() {
    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(0, r#"{"messages":[]}"#);
    let runner = Runner::with_launcher(settings(), launcher);

    let config =
        quiet(files(&["a.html"])).with_ignore_patterns(vec!["A".to_string(), "B".to_string()]);
    runner.run(config).await;

    let args = &runner.launcher().calls()[1].args;
    let filters: Vec<_> = args
        .iter()
        .enumerate()
        .filter(|(_, a)| *a == "--filterpattern")
        .collect();
    assert_eq!(filters.len(), 1);
    assert_eq!(args[filters[0].0 + 1], "A|B");
}

#[tokio::test]
async fn empty_ignore_list_omits_filter() {
    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(0, r#"{"messages":[]}"#);
    let runner = Runner::with_launcher(settings(), launcher);

    runner
        .run(quiet(files(&["a.html"])).with_ignore_patterns(Vec::new()))
        .await;

    let args = &runner.launcher().calls()[1].args;
    assert!(!args.iter().any(|a| a == "--filterpattern"));
}

#[tokio::test]
async fn default_ignore_list_is_passed() {
    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(0, r#"{"messages":[]}"#);
    let runner = Runner::with_launcher(settings(), launcher);

    runner.run(quiet(files(&["a.html"]))).await;

    let args = &runner.launcher().calls()[1].args;
    let filter = &args[args.position_of("--filterpattern") + 1];
    assert!(filter.contains("autocomplete"));
    assert!(filter.contains("aria-disabled"));
}

#[tokio::test]
async fn stack_flag_depends_on_bitness() {
    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(0, r#"{"messages":[]}"#)
        .then_stderr(0, PROBE_32)
        .then_stderr(0, r#"{"messages":[]}"#);
    let runner = Runner::with_launcher(settings(), launcher);

    runner.run(quiet(files(&["a.html"]))).await;
    runner.run(quiet(files(&["a.html"]))).await;

    let calls = runner.launcher().calls();
    assert!(!calls[1].args.iter().any(|a| a == SMALL_STACK_FLAG));

    let args = &calls[3].args;
    assert!(args.position_of(SMALL_STACK_FLAG) < args.position_of("-jar"));
}

#[tokio::test]
async fn findings_reach_reporter_and_exit_code_passes_through() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();

    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(1, ONE_ERROR);
    let runner = Runner::with_launcher(settings(), launcher);

    let config = RunConfiguration::new(files(&["a.html"])).with_reporter(
        move |report: &ValidationReport, _: &[PathBuf]| {
            sink.lock().unwrap().push(report.clone());
        },
    );
    let outcome = runner.run(config).await;

    assert_eq!(outcome.exit_code, 1);
    assert!(outcome.error.is_none());

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].messages.len(), 1);
    assert_eq!(received[0].messages[0].kind, MessageKind::Error);
    assert_eq!(outcome.report.as_ref(), Some(&received[0]));
}

#[tokio::test]
async fn other_exit_codes_pass_through() {
    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(2, ONE_ERROR);
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert_eq!(outcome.exit_code, 2);
}

#[tokio::test]
async fn killed_checker_exits_one() {
    let launcher = FakeLauncher::new().then_stderr(0, PROBE_64).then(Ok(ProcessOutput {
        code: None,
        stderr: Some(br#"{"messages":[]}"#.to_vec()),
    }));
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert_eq!(outcome.exit_code, 1);
}

#[tokio::test]
async fn clean_report_renders_success() {
    colored::control::set_override(false);
    let rendered = Arc::new(Mutex::new(Vec::<u8>::new()));
    let sink = rendered.clone();

    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(0, r#"{"messages":[]}"#);
    let runner = Runner::with_launcher(settings(), launcher);

    let config = RunConfiguration::new(files(&["a.html"])).with_reporter(
        move |report: &ValidationReport, files: &[PathBuf]| {
            let mut details = Vec::new();
            let mut out = sink.lock().unwrap();
            NuReporter
                .render(report, files, &mut details, &mut *out)
                .unwrap();
        },
    );
    let outcome = runner.run(config).await;
    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.is_success());

    let summary = String::from_utf8(rendered.lock().unwrap().clone()).unwrap();
    assert!(summary.contains("Checked 1 file(s)"));
    assert!(summary.contains("Nu checker found no errors or warnings."));
    assert!(!summary.contains("Found"));
}

#[tokio::test]
async fn warning_subtype_is_classified_as_warning() {
    let launcher = FakeLauncher::new().then_stderr(0, PROBE_64).then_stderr(
        1,
        r#"{"messages":[{"type":"info","subType":"warning","message":"w"}]}"#,
    );
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    let report = outcome.report.unwrap();
    assert_eq!(report.messages[0].kind, MessageKind::Warning);
    assert_eq!(report.count(MessageKind::Info), 0);
}

#[tokio::test]
async fn empty_file_list_spawns_nothing() {
    let runner = Runner::with_launcher(settings(), FakeLauncher::new());

    let outcome = runner.run(quiet(Vec::new())).await;
    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.error, Some(RunError::NoFiles)));
    assert!(runner.launcher().calls().is_empty());
}

#[tokio::test]
async fn unrecognized_probe_output_stops_before_checker() {
    let launcher = FakeLauncher::new().then_stderr(0, "Picked up _JAVA_OPTIONS: -Xmx1g\n");
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.error, Some(RunError::VersionNotFound)));
    assert_eq!(runner.launcher().calls().len(), 1);
}

#[tokio::test]
async fn unsupported_java_stops_before_checker() {
    let launcher = FakeLauncher::new().then_stderr(0, r#"java version "1.7.0_80""#);
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.error, Some(RunError::UnsupportedVersion(_))));
    assert_eq!(runner.launcher().calls().len(), 1);
}

#[tokio::test]
async fn missing_java_is_fatal() {
    let launcher = FakeLauncher::new().then(Err(LaunchError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        "java not found",
    ))));
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(
        outcome.error,
        Some(RunError::RuntimeUnavailable(_))
    ));
    assert_eq!(runner.launcher().calls().len(), 1);
}

#[tokio::test]
async fn failing_probe_is_fatal() {
    let launcher = FakeLauncher::new().then_stderr(127, "sh: java: not found");
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.error, Some(RunError::RuntimeFailed { .. })));
}

#[tokio::test]
async fn absent_probe_stream_is_fatal() {
    let launcher = FakeLauncher::new().then(Ok(ProcessOutput {
        code: Some(0),
        stderr: None,
    }));
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert!(matches!(outcome.error, Some(RunError::ProbeOutputMissing)));
    assert_eq!(outcome.exit_code, 1);
}

#[tokio::test]
async fn malformed_report_is_a_parse_error() {
    let called = Arc::new(Mutex::new(false));
    let flag = called.clone();

    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then_stderr(1, "Exception in thread \"main\" java.lang.OutOfMemoryError");
    let runner = Runner::with_launcher(settings(), launcher);

    let config = RunConfiguration::new(files(&["a.html"])).with_reporter(
        move |_: &ValidationReport, _: &[PathBuf]| {
            *flag.lock().unwrap() = true;
        },
    );
    let outcome = runner.run(config).await;

    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.error, Some(RunError::ReportParse(_))));
    assert!(outcome.report.is_none());
    assert!(!*called.lock().unwrap());
}

#[tokio::test]
async fn oversized_output_is_fatal() {
    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then(Err(LaunchError::OutputLimit(16)));
    let runner = Runner::with_launcher(settings(), launcher);

    let outcome = runner.run(quiet(files(&["a.html"]))).await;
    assert!(matches!(
        outcome.error,
        Some(RunError::OutputLimit { limit: 16 })
    ));
    assert_eq!(outcome.exit_code, 1);
}

#[tokio::test]
async fn checker_launch_failure_is_fatal() {
    let called = Arc::new(Mutex::new(false));
    let flag = called.clone();

    let launcher = FakeLauncher::new()
        .then_stderr(0, PROBE_64)
        .then(Err(LaunchError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "cannot execute",
        ))));
    let runner = Runner::with_launcher(settings(), launcher);

    let config = RunConfiguration::new(files(&["a.html"])).with_reporter(
        move |_: &ValidationReport, _: &[PathBuf]| {
            *flag.lock().unwrap() = true;
        },
    );
    let outcome = runner.run(config).await;

    assert_eq!(outcome.exit_code, 1);
    assert!(matches!(outcome.error, Some(RunError::Launch(_))));
    assert!(outcome.report.is_none());
    assert_eq!(runner.launcher().calls().len(), 2);
    assert!(!*called.lock().unwrap());
}
