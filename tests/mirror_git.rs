// tests/mirror_git.rs

//! Mirror sync against real local git repositories.
//!
//! Skipped when no `git` binary is installed.

mod common;

use common::{
    commit_file, file_url, git_available, setup_source_repo, test_credentials, versioned_formula,
};
use std::fs;
use tapdrift::{Error, FormulaScanner, GitCli, GitTransport, PullOutcome, RepoMirror};

fn git_cli() -> GitCli {
    GitCli::new(&test_credentials()).unwrap()
}

#[test]
fn test_clone_then_pull_updates() {
    if !git_available() {
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let origin = setup_source_repo(
        tmp.path(),
        "main",
        "gov-jq.rb",
        &versioned_formula("GovJq", "1.7.0"),
    );
    let dest = tmp.path().join("cache/private-tap");
    let mirror = RepoMirror::new(git_cli(), "main", "master");

    mirror.ensure(&dest, &file_url(&origin)).unwrap();
    let entries = FormulaScanner::default().scan(&dest).unwrap();
    assert_eq!(entries["gov-jq"].version, "1.7.0");

    commit_file(
        &origin,
        "Formula/gov-jq.rb",
        &versioned_formula("GovJq", "1.7.1"),
        "jq 1.7.1",
    );
    mirror.ensure(&dest, &file_url(&origin)).unwrap();
    let entries = FormulaScanner::default().scan(&dest).unwrap();
    assert_eq!(entries["gov-jq"].version, "1.7.1");
}

#[test]
fn test_pull_reports_up_to_date() {
    if !git_available() {
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let origin = setup_source_repo(tmp.path(), "main", "gov-jq.rb", "class GovJq < Formula\nend\n");
    let dest = tmp.path().join("private-tap");
    let git = git_cli();

    git.clone_branch(&dest, &file_url(&origin), "main").unwrap();
    assert_eq!(git.pull_branch(&dest, "main").unwrap(), PullOutcome::UpToDate);

    commit_file(&origin, "Formula/gov-yq.rb", "class GovYq < Formula\nend\n", "add yq");
    assert_eq!(git.pull_branch(&dest, "main").unwrap(), PullOutcome::Updated);
    assert!(dest.join("Formula/gov-yq.rb").exists());
}

#[test]
fn test_master_only_tap() {
    if !git_available() {
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let origin = setup_source_repo(
        tmp.path(),
        "master",
        "gov-jq.rb",
        &versioned_formula("GovJq", "1.6"),
    );
    let dest = tmp.path().join("private-tap");
    let mirror = RepoMirror::new(git_cli(), "main", "master");

    mirror.ensure(&dest, &file_url(&origin)).unwrap();
    assert!(dest.join("Formula/gov-jq.rb").exists());

    // Present mirror: main pull fails, master pull succeeds
    mirror.ensure(&dest, &file_url(&origin)).unwrap();
    assert!(dest.join("Formula/gov-jq.rb").exists());
}

#[test]
fn test_corrupt_mirror_is_replaced() {
    if !git_available() {
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let origin = setup_source_repo(
        tmp.path(),
        "main",
        "gov-jq.rb",
        &versioned_formula("GovJq", "1.7.1"),
    );
    let dest = tmp.path().join("private-tap");
    fs::create_dir_all(dest.join("Formula")).unwrap();
    fs::write(dest.join("Formula/stale.rb"), "garbage").unwrap();

    let mirror = RepoMirror::new(git_cli(), "main", "master");
    mirror.ensure(&dest, &file_url(&origin)).unwrap();

    assert!(!dest.join("Formula/stale.rb").exists());
    assert!(dest.join(".git").exists());
    assert!(dest.join("Formula/gov-jq.rb").exists());
}

#[test]
fn test_unreachable_remote_is_unavailable() {
    if !git_available() {
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("private-tap");
    let missing = tmp.path().join("no-such-repo");

    let mirror = RepoMirror::new(git_cli(), "main", "master");
    let err = mirror.ensure(&dest, &file_url(&missing)).unwrap_err();
    assert!(matches!(err, Error::MirrorUnavailable(_)));
}
