use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use similar::{ChangeTag, TextDiff};

const FEEDS: [&str; 3] = ["feed_a.csv", "feed_b.csv", "feed_c.csv"];

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_dir() -> PathBuf {
    project_root().join("fixtures")
}

fn golden_dir() -> PathBuf {
    project_root().join("golden")
}

fn update_golden() -> bool {
    std::env::var("UPDATE_GOLDEN").is_ok()
}

fn diff_strings(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(&format!("{sign}{change}"));
    }
    out
}

/// Run the job against `root/raw` with the fs backend, writing `root/out/chart.csv`.
fn run_job(root: &Path, extra_args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_attendance-job"))
        .arg("run")
        .args(["--store", "fs", "--fs-root"])
        .arg(root)
        .args(["--bucket", "raw", "--upload-bucket", "out"])
        .args(["--feed-a-key", FEEDS[0]])
        .args(["--feed-b-key", FEEDS[1]])
        .args(["--feed-c-key", FEEDS[2]])
        .args(["--output-key", "chart.csv"])
        .args(extra_args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute attendance-job")
}

fn read_args(case_dir: &Path) -> Vec<String> {
    fs::read_to_string(case_dir.join("args.txt"))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn golden_csv_output() {
    let fixtures = fixture_dir();
    let golden = golden_dir();

    let mut cases: Vec<_> = fs::read_dir(&fixtures)
        .expect("Failed to read fixtures directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    cases.sort_by_key(|e| e.file_name());

    assert!(!cases.is_empty(), "No fixture cases found in {fixtures:?}");

    for case in cases {
        let case_dir = case.path();
        let name = case.file_name().to_string_lossy().to_string();
        let golden_path = golden.join(format!("{name}.csv"));

        let workdir = tempfile::tempdir().expect("Failed to create temp dir");
        let raw = workdir.path().join("raw");
        fs::create_dir_all(&raw).unwrap();
        for feed in FEEDS {
            fs::copy(case_dir.join(feed), raw.join(feed))
                .unwrap_or_else(|e| panic!("Failed to copy {feed} for {name}: {e}"));
        }

        let output = run_job(workdir.path(), &read_args(&case_dir));

        assert!(
            output.status.success(),
            "attendance-job failed for {}: {}",
            name,
            String::from_utf8_lossy(&output.stderr)
        );

        let actual = fs::read_to_string(workdir.path().join("out").join("chart.csv"))
            .expect("Output chart was not written");

        if update_golden() {
            fs::create_dir_all(&golden).ok();
            fs::write(&golden_path, &actual)
                .unwrap_or_else(|e| panic!("Failed to write golden file {golden_path:?}: {e}"));
            eprintln!("Updated golden file: {golden_path:?}");
            continue;
        }

        let expected = fs::read_to_string(&golden_path).unwrap_or_else(|e| {
            panic!(
                "Golden file {golden_path:?} not found: {e}\n\
                 Hint: Run with UPDATE_GOLDEN=1 to generate golden files"
            )
        });

        if actual != expected {
            let diff = diff_strings(&expected, &actual);
            panic!(
                "Golden test mismatch for {name}:\n\n\
                 {diff}\n\n\
                 Run with UPDATE_GOLDEN=1 to refresh snapshots"
            );
        }
    }
}

#[test]
fn malformed_feed_exits_with_input_error() {
    let workdir = tempfile::tempdir().unwrap();
    let raw = workdir.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    for feed in FEEDS {
        fs::write(raw.join(feed), "Export,,\nStudent,Student ID,\n").unwrap();
    }

    let output = run_job(workdir.path(), &["--today".to_string(), "2024-09-01".to_string()]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Malformed input in feed"), "{stderr}");
    assert!(!workdir.path().join("out").exists());
}

#[test]
fn missing_feed_exits_with_runtime_error() {
    let workdir = tempfile::tempdir().unwrap();

    let output = run_job(
        workdir.path(),
        &[
            "--today".to_string(),
            "2024-09-01".to_string(),
            "--retry-delay-ms".to_string(),
            "1".to_string(),
        ],
    );

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn resolve_prints_json() {
    let output = Command::new(env!("CARGO_BIN_EXE_attendance-job"))
        .args([
            "resolve",
            "--today",
            "2024-09-01",
            "--output-format",
            "json",
            "=\"08/15\"",
            "01/10",
        ])
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute attendance-job");

    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dates = json.as_array().unwrap();
    assert_eq!(dates.len(), 2);
    assert_eq!(dates[0]["formatted"], "08/15/2024");
    assert_eq!(dates[0]["period"], "beginning");
    assert_eq!(dates[1]["formatted"], "01/10/2025");
    assert_eq!(dates[1]["period"], "ending");
}

#[test]
fn resolve_july_reports_json_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_attendance-job"))
        .args([
            "resolve",
            "--today",
            "2024-09-01",
            "--output-format",
            "json",
            "07/04",
        ])
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute attendance-job");

    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains('\x1b'), "{stderr}");
    let json: serde_json::Value = serde_json::from_slice(&output.stderr)
        .unwrap_or_else(|e| panic!("stderr is not a JSON document ({e}): {stderr}"));
    assert_eq!(json["exit_code"], 2);
    assert_eq!(json["status"], "unsupported_month");
}

#[test]
fn text_errors_are_logged_without_colour() {
    let output = Command::new(env!("CARGO_BIN_EXE_attendance-job"))
        .args(["resolve", "--today", "2024-09-01", "07/04"])
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute attendance-job");

    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "{stderr}");
    assert!(stderr.contains("Error: Unsupported month 7"), "{stderr}");
    assert!(!stderr.contains('\x1b'), "{stderr}");
}
