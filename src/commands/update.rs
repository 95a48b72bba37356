// src/commands/update.rs
//! Single-formula refresh from upstream

use super::{prepare_tap, scan_tap};
use anyhow::Result;
use tapdrift::{Config, FsWriter, NameResolver, Reconciler, RegistryClient, RefreshOutcome};

/// Number of rewritten lines shown before writing
const PREVIEW_LINES: usize = 25;

/// Replace a private formula with the renamed upstream formula
///
/// Without `apply` this is a dry run: the rewritten text is previewed and
/// nothing is written. The change is never committed or pushed.
pub fn cmd_update(config: &Config, name: &str, apply: bool, no_sync: bool) -> Result<()> {
    let root = prepare_tap(config, no_sync)?;
    let entries = scan_tap(config, &root)?;

    // Accept both "gov-abseil" and "abseil"
    let prefixed = format!("{}{}", config.private_prefix, name);
    let (private_name, entry) = entries
        .get_key_value(name)
        .or_else(|| entries.get_key_value(&prefixed))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Formula '{}' not found in {} (or has no detectable version)",
                name,
                root.display()
            )
        })?;

    let client = RegistryClient::from_config(config)?;
    let reconciler = Reconciler::new(NameResolver::from_config(config), &client);
    let outcome = reconciler.refresh_one(private_name, entry, apply, &FsWriter)?;

    print_outcome(&outcome, &entry.version, config);
    Ok(())
}

fn print_outcome(outcome: &RefreshOutcome, local_version: &str, config: &Config) {
    println!();
    if outcome.written {
        println!("=== APPLY UPDATE ===");
    } else {
        println!("=== DRY-RUN UPDATE ===");
    }
    println!("Private:  {} ({})", outcome.private_name, local_version);
    println!("Upstream: {}", outcome.upstream_name);
    println!("Source:   {}", outcome.source_url);
    println!("Target:   {}", outcome.path.display());
    println!();

    println!("Class line check:");
    println!(" - expect: {}", outcome.expected_line);
    if outcome.class_line_found {
        println!(" - ok");
    } else {
        println!(" - warning: class line not found after rewrite");
    }
    println!();

    println!("--- Preview (first {} lines) ---", PREVIEW_LINES);
    for line in outcome.preview(PREVIEW_LINES) {
        println!("{}", line);
    }
    println!("--- end preview ---");

    if let Some(ref diff) = outcome.diff {
        println!();
        if outcome.is_unchanged() {
            println!("Local formula already matches upstream");
        } else {
            print!("{}", diff);
        }
    }

    println!();
    if outcome.written {
        println!("Wrote updated file to: {}", outcome.path.display());
        println!(
            "Next: cd {} && git diff (nothing was committed or pushed)",
            config.cache_dir.display()
        );
    } else {
        println!("Nothing was written. Run again with --apply to overwrite the file.");
    }
}
