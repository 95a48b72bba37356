// src/commands/check.rs
//! Drift check across the whole private tap

use super::{prepare_tap, scan_tap};
use anyhow::Result;
use tapdrift::{Config, NameResolver, Reconciler, RegistryClient, Report};

/// Compare every private formula with upstream and print the report
///
/// Per-formula lookup failures are listed but do not fail the command.
pub fn cmd_check(config: &Config, json: bool, no_sync: bool) -> Result<()> {
    let root = prepare_tap(config, no_sync)?;
    let entries = scan_tap(config, &root)?;

    let client = RegistryClient::from_config(config)?;
    let report = Reconciler::new(NameResolver::from_config(config), &client)
        .with_fallback(config.version_fallback)
        .with_jobs(config.jobs)
        .compare_all(&entries);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    if report.behind.is_empty() {
        println!("All formulae are up to date with upstream");
    } else {
        let name_width = report
            .behind
            .iter()
            .map(|r| r.private_name.len())
            .max()
            .unwrap_or(0)
            .max("FORMULA".len());
        let local_width = report
            .behind
            .iter()
            .map(|r| r.private_version.len())
            .max()
            .unwrap_or(0)
            .max("LOCAL".len());

        println!("Behind upstream ({}):", report.behind.len());
        println!(
            "  {:<name_width$}  {:<local_width$}  UPSTREAM",
            "FORMULA", "LOCAL"
        );
        for row in &report.behind {
            let upstream = if row.private_name.ends_with(&row.upstream_name) {
                row.upstream_version.clone()
            } else {
                format!("{} ({})", row.upstream_version, row.upstream_name)
            };
            println!(
                "  {:<name_width$}  {:<local_width$}  {}",
                row.private_name, row.private_version, upstream
            );
        }
    }

    if !report.not_found.is_empty() {
        println!();
        println!("Not found upstream ({}):", report.not_found.len());
        for name in &report.not_found {
            println!("  {}", name);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors ({}):", report.errors.len());
        for error in &report.errors {
            println!("  {}", error);
        }
    }

    println!();
    println!(
        "Checked {} formulae: {} behind, {} up to date, {} not found, {} errors",
        report.checked,
        report.behind.len(),
        report.up_to_date.len(),
        report.not_found.len(),
        report.errors.len()
    );
}
