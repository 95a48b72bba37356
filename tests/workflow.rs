// tests/workflow.rs

//! End-to-end drift check and refresh over a scanned tap and a mock registry.

mod common;

use common::{config_for, registry_json, setup_tap, url_formula, versioned_formula, ABSEIL_RB};
use httpmock::prelude::*;
use std::fs;
use tapdrift::{
    FormulaScanner, FsWriter, NameResolver, Reconciler, RegistryClient,
};

#[test]
fn test_check_classifies_each_formula() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/formula/abseil.json");
        then.status(200).body(registry_json("abseil", Some("20260107.0")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/formula/jq.json");
        then.status(200).body(registry_json("jq", Some("1.7.1")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/formula/internal-tool.json");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/formula/flaky.json");
        then.status(502);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/formula/git-filter-repo.json");
        then.status(200).body(registry_json("git-filter-repo", Some("2.47.0")));
    });

    let (_tmp, root) = setup_tap(&[
        (
            "gov-abseil.rb",
            &url_formula(
                "GovAbseil",
                "https://github.com/abseil/abseil-cpp/archive/refs/tags/20250814.1.tar.gz",
            ),
        ),
        ("j/gov-jq.rb", &versioned_formula("GovJq", "v1.7.1")),
        ("gov-internal-tool.rb", &versioned_formula("GovInternalTool", "3.0")),
        ("gov-flaky.rb", &versioned_formula("GovFlaky", "1.0")),
        ("gov-filter-repo.rb", &versioned_formula("GovFilterRepo", "2.38.0")),
        ("gov-headonly.rb", "class GovHeadonly < Formula\n  head \"https://x/y.git\"\nend\n"),
        ("README.md", "not a formula"),
    ]);

    let config = config_for(&server.base_url());
    let entries = FormulaScanner::from_config(&config).scan(&root).unwrap();
    assert_eq!(entries.len(), 5);
    assert!(!entries.contains_key("gov-headonly"));

    let client = RegistryClient::from_config(&config).unwrap();
    let report = Reconciler::new(NameResolver::from_config(&config), &client)
        .with_jobs(config.jobs)
        .compare_all(&entries);

    let behind: Vec<_> = report.behind.iter().map(|r| r.private_name.as_str()).collect();
    assert_eq!(behind, vec!["gov-abseil", "gov-filter-repo"]);
    assert_eq!(report.behind[0].private_version, "20250814.1");
    assert_eq!(report.behind[0].upstream_version, "20260107.0");
    assert_eq!(report.behind[1].upstream_name, "git-filter-repo");
    assert_eq!(report.up_to_date, vec!["gov-jq"]);
    assert_eq!(report.not_found, vec!["gov-internal-tool"]);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("gov-flaky (flaky): "));
    assert_eq!(report.checked, 5);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["behind"][0]["private_name"], "gov-abseil");
    assert_eq!(json["not_found"][0], "gov-internal-tool");
}

#[test]
fn test_update_dry_run_then_apply() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/raw/Formula/a/abseil.rb");
        then.status(200).body(ABSEIL_RB);
    });

    let original = versioned_formula("GovAbseil", "20250814.1");
    let (_tmp, root) = setup_tap(&[("gov-abseil.rb", &original)]);
    let config = config_for(&server.base_url());
    let entries = FormulaScanner::from_config(&config).scan(&root).unwrap();
    let entry = &entries["gov-abseil"];

    let client = RegistryClient::from_config(&config).unwrap();
    let reconciler = Reconciler::new(NameResolver::from_config(&config), &client);

    let preview = reconciler
        .refresh_one("gov-abseil", entry, false, &FsWriter)
        .unwrap();
    assert!(!preview.written);
    assert!(preview.class_line_found);
    assert!(preview.diff.as_deref().unwrap().contains("-  version \"20250814.1\""));
    assert_eq!(fs::read_to_string(&entry.path).unwrap(), original);

    let applied = reconciler
        .refresh_one("gov-abseil", entry, true, &FsWriter)
        .unwrap();
    assert!(applied.written);
    let written = fs::read_to_string(&entry.path).unwrap();
    assert!(written.starts_with("class GovAbseil < Formula\n"));
    assert!(written.contains("homepage \"https://abseil.io\""));

    // The refreshed file now scans to the upstream version
    let rescanned = FormulaScanner::from_config(&config).scan(&root).unwrap();
    assert_eq!(rescanned["gov-abseil"].version, "20260107.0");
}

#[test]
fn test_update_missing_upstream_leaves_file() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/raw/Formula/i/internal-tool.rb");
        then.status(404);
    });

    let original = versioned_formula("GovInternalTool", "3.0");
    let (_tmp, root) = setup_tap(&[("gov-internal-tool.rb", &original)]);
    let config = config_for(&server.base_url());
    let entries = FormulaScanner::from_config(&config).scan(&root).unwrap();

    let client = RegistryClient::from_config(&config).unwrap();
    let result = Reconciler::new(NameResolver::from_config(&config), &client).refresh_one(
        "gov-internal-tool",
        &entries["gov-internal-tool"],
        true,
        &FsWriter,
    );

    assert!(result.is_err());
    assert_eq!(
        fs::read_to_string(root.join("Formula/gov-internal-tool.rb")).unwrap(),
        original
    );
}
