// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tapdrift::{Config, Credentials};
use tempfile::TempDir;

/// Upstream abseil formula as served by the raw endpoint
pub const ABSEIL_RB: &str = "\
class Abseil < Formula
  desc \"C++ Common Libraries\"
  homepage \"https://abseil.io\"
  url \"https://github.com/abseil/abseil-cpp/archive/refs/tags/20260107.0.tar.gz\"
  sha256 \"0000000000000000000000000000000000000000000000000000000000000000\"
  license \"Apache-2.0\"
end
";

/// A private formula file with an explicit version line
pub fn versioned_formula(class_name: &str, version: &str) -> String {
    format!(
        "class {} < Formula\n  desc \"test\"\n  version \"{}\"\nend\n",
        class_name, version
    )
}

/// A private formula file whose version is only in the URL
pub fn url_formula(class_name: &str, url: &str) -> String {
    format!(
        "class {} < Formula\n  desc \"test\"\n  url \"{}\"\nend\n",
        class_name, url
    )
}

/// Create a tap directory with the given `(relative path, content)` files under `Formula/`.
///
/// Returns (TempDir, tap_root) - keep the TempDir alive to prevent cleanup.
pub fn setup_tap(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("private-tap");
    for (rel, content) in files {
        let path = root.join("Formula").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    fs::create_dir_all(root.join("Formula")).unwrap();
    (temp_dir, root)
}

/// Default config pointed at a mock server
pub fn config_for(base_url: &str) -> Config {
    Config {
        registry_api_url: format!("{}/api/formula", base_url),
        raw_formula_url: format!("{}/raw/Formula", base_url),
        alternate_sources: [(
            "sdkman-cli".to_string(),
            format!("{}/alt/sdkman-cli.rb", base_url),
        )]
        .into_iter()
        .collect(),
        http_timeout_secs: 5,
        ..Config::default()
    }
}

/// Registry API body for a formula
pub fn registry_json(name: &str, stable: Option<&str>) -> String {
    serde_json::json!({
        "name": name,
        "versions": { "stable": stable, "head": null, "bottle": true }
    })
    .to_string()
}

pub fn test_credentials() -> Credentials {
    Credentials::new("ci-user", "ci-token")
}

pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Run git in `dir` with a fixed identity, panicking on failure
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args([
            "-c",
            "user.name=tapdrift tests",
            "-c",
            "user.email=tests@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a source repository on `branch` with one formula committed.
///
/// Returns the repository path; use [`file_url`] to clone it.
pub fn setup_source_repo(parent: &Path, branch: &str, formula: &str, content: &str) -> PathBuf {
    let repo = parent.join("origin");
    fs::create_dir_all(repo.join("Formula")).unwrap();
    git(&repo, &["init", "--quiet", "-b", branch]);
    fs::write(repo.join("Formula").join(formula), content).unwrap();
    git(&repo, &["add", "."]);
    git(&repo, &["commit", "--quiet", "-m", "initial"]);
    repo
}

/// Commit a new version of a file in the source repository
pub fn commit_file(repo: &Path, rel: &str, content: &str, message: &str) {
    let path = repo.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    git(repo, &["add", "."]);
    git(repo, &["commit", "--quiet", "-m", message]);
}

/// `file://` URL so shallow clones are honored for local repositories
pub fn file_url(repo: &Path) -> String {
    format!("file://{}", repo.display())
}
