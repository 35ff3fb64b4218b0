//! CLI integration tests
//!
//! These tests run the cssprune binary against small projects in temporary
//! directories.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A project with one page, one stylesheet and one script
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "index.html", r#"<html><body><a class="used">Hi</a></body></html>"#);
    write(
        dir.path(),
        "site.css",
        "body{margin:0}\na.used{color:red}\nb.unused{color:blue}\n.js-toggle{display:none}\n.is-open{display:block}\n",
    );
    write(dir.path(), "app.js", "menu.classList.toggle('is-open')");
    dir
}

fn write(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn cssprune(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cssprune").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    Command::cargo_bin("cssprune")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--css"))
        .stdout(predicate::str::contains("--include-class"));
}

#[test]
fn test_purge_to_stdout() {
    let dir = project();
    cssprune(&dir)
        .args(["--css", "*.css", "--html", "*.html", "-q"])
        .assert()
        .success()
        .stdout("body{margin:0}a.used{color:red}");
}

#[test]
fn test_words_and_overrides() {
    let dir = project();
    cssprune(&dir)
        .args(["-c", "*.css", "-H", "*.html", "-w", "*.js", "--include-class", "^js-", "-q"])
        .assert()
        .success()
        .stdout("body{margin:0}a.used{color:red}.js-toggle{display:none}.is-open{display:block}");
}

#[test]
fn test_include_selector() {
    let dir = project();
    cssprune(&dir)
        .args(["-c", "*.css", "-H", "*.html", "-i", "b.unused", "-q"])
        .assert()
        .success()
        .stdout("body{margin:0}a.used{color:red}b.unused{color:blue}");
}

#[test]
fn test_output_file() {
    let dir = project();
    cssprune(&dir)
        .args(["-c", "*.css", "-H", "*.html", "-o", "out.min.css", "-q"])
        .assert()
        .success()
        .stdout("");

    let out = fs::read_to_string(dir.path().join("out.min.css")).unwrap();
    assert_eq!(out, "body{margin:0}a.used{color:red}");
}

#[test]
fn test_terminal_report_on_stderr() {
    let dir = project();
    cssprune(&dir)
        .args(["-c", "*.css", "-H", "*.html"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout("body{margin:0}a.used{color:red}")
        .stderr(predicate::str::contains("Purged 1 stylesheet(s)"))
        .stderr(predicate::str::contains("site.css"));
}

#[test]
fn test_json_report() {
    let dir = project();
    cssprune(&dir)
        .args(["-c", "*.css", "-H", "*.html", "--report", "report.json", "-q"])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["summary"]["file_count"], 1);
    assert_eq!(report["files"][0]["selectors_kept"], 2);
    assert_eq!(report["files"][0]["selectors_removed"], 3);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_default_location() {
    let dir = project();
    write(
        dir.path(),
        "cssprune.yml",
        "css: ['*.css']\nhtml: ['*.html']\ninclude_id: []\ninclude_class: ['^is-']\n",
    );

    cssprune(&dir)
        .arg("-q")
        .assert()
        .success()
        .stdout("body{margin:0}a.used{color:red}.is-open{display:block}");
}

#[test]
fn test_explicit_config_file() {
    let dir = project();
    write(dir.path(), "conf/purge.toml", "css = [\"*.css\"]\ninclude = [\".js-toggle\"]\n");

    cssprune(&dir)
        .args(["--config", "conf/purge.toml", "-q"])
        .assert()
        .success()
        .stdout("body{margin:0}.js-toggle{display:none}");
}

#[test]
fn test_excluded_stylesheet() {
    let dir = project();
    write(dir.path(), "vendor/lib.css", ".lib{color:red}");

    cssprune(&dir)
        .args(["-c", "**/*.css", "-H", "*.html", "-e", "vendor/*", "-q"])
        .assert()
        .success()
        .stdout("body{margin:0}a.used{color:red}");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_no_css_given() {
    let dir = project();
    cssprune(&dir)
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No CSS files given"));
}

#[test]
fn test_invalid_regex_fails_before_purging() {
    let dir = project();
    cssprune(&dir)
        .args(["-c", "*.css", "-H", "*.html", "--include-id", "(", "-q"])
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn test_invalid_include_selector() {
    let dir = project();
    cssprune(&dir)
        .args(["-c", "*.css", "-i", "a {", "-q"])
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn test_malformed_stylesheet_fails() {
    let dir = project();
    write(dir.path(), "broken.css", "a{color:red}}");

    cssprune(&dir)
        .args(["-c", "*.css", "-H", "*.html", "-q"])
        .assert()
        .failure()
        .stdout("");
}
