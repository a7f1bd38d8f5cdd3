//! Rendering of command results as tables or JSON
//!
//! Tables go through `colored` like every other status line; JSON is
//! pretty-printed with two-space indentation and always written, even when
//! some pairs failed.

use crate::cli::OutputFormat;
use crate::ui;
use anyhow::{Context, Result};
use batch::{BatchReport, TargetReport};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Result of `vaults run` for one vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub success: bool,
    pub duration: String,
    pub error: Option<String>,
}

impl From<&TargetReport> for RunResult {
    fn from(report: &TargetReport) -> Self {
        Self {
            success: report.is_success(),
            duration: ui::format_duration(report.elapsed),
            error: report.failed.first().map(|failure| failure.error.clone()),
        }
    }
}

/// Per-vault results of `vaults run`, ordered by vault name
pub fn run_results(report: &BatchReport) -> BTreeMap<String, RunResult> {
    report
        .iter()
        .map(|(name, result)| (name.clone(), RunResult::from(result)))
        .collect()
}

/// Output of `reports stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_vaults: usize,
    pub total_plugins: usize,
    /// `id@version (size)` to the vaults having it installed
    pub installed: BTreeMap<String, Vec<String>>,
}

// ============================================================================
// Rendering
// ============================================================================

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report")
}

/// Table for install, uninstall and prune
pub fn batch_table(report: &BatchReport, applied: &str) -> String {
    let mut out = String::new();

    for (name, result) in report {
        let marker = if result.is_success() {
            "✓".green()
        } else {
            "✗".red()
        };
        let _ = writeln!(out, "{} {}", marker, name.bold());

        for entity in &result.succeeded {
            let _ = writeln!(out, "    {} {applied} {entity}", "+".green());
        }
        if result.skipped > 0 {
            let _ = writeln!(out, "    {} skipped {}", "·".dimmed(), result.skipped);
        }
        for failure in &result.failed {
            let _ = writeln!(
                out,
                "    {} {} [{}] {}",
                "!".red(),
                failure.entity,
                failure.kind,
                failure.error
            );
        }
        if result.total() == 0 {
            let _ = writeln!(out, "    {}", "nothing to do".dimmed());
        }
    }

    let _ = writeln!(
        out,
        "\n{} {applied}, {} skipped, {} failed across {}",
        report.succeeded_count(),
        report.skipped_count(),
        report.failed_count(),
        ui::plural(report.len(), "vault")
    );
    out
}

pub fn run_table(results: &BTreeMap<String, RunResult>) -> String {
    let width = results.keys().map(String::len).max().unwrap_or(0);
    let mut out = String::new();

    for (name, result) in results {
        let status = if result.success {
            "ok".green()
        } else {
            "failed".red()
        };
        let _ = write!(out, "{name:<width$}  {status:<6}  {:>8}", result.duration);
        if let Some(error) = &result.error {
            let _ = write!(out, "  {}", error.dimmed());
        }
        out.push('\n');
    }
    out
}

pub fn stats_table(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<14} {}", "Total vaults:", stats.total_vaults);
    let _ = writeln!(out, "{:<14} {}", "Total plugins:", stats.total_plugins);

    if stats.installed.is_empty() {
        let _ = writeln!(out, "\n{}", "No configured plugins installed".dimmed());
        return out;
    }

    let _ = writeln!(out);
    for (plugin, vaults) in &stats.installed {
        let _ = writeln!(out, "{}", plugin.bold());
        let _ = writeln!(out, "    {}", vaults.join(", "));
    }
    out
}

// ============================================================================
// Printing
// ============================================================================

pub fn print_batch(report: &BatchReport, applied: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print!("{}", batch_table(report, applied)),
        OutputFormat::Json => println!("{}", to_json(report)?),
    }
    Ok(())
}

pub fn print_run(results: &BTreeMap<String, RunResult>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print!("{}", run_table(results)),
        OutputFormat::Json => println!("{}", to_json(results)?),
    }
    Ok(())
}

pub fn print_stats(stats: &Stats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print!("{}", stats_table(stats)),
        OutputFormat::Json => println!("{}", to_json(stats)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch::{EntityRef, Failure, FailureKind, Outcome};
    use std::time::Duration;

    fn sample() -> BatchReport {
        let mut work = TargetReport::default();
        work.record(Outcome::Applied(EntityRef::new("owner/p2", "1.2.0")));
        work.record(Outcome::skipped(EntityRef::new("owner/p1", "latest"), "present"));

        let mut home = TargetReport::default();
        home.record(Outcome::Failed(Failure::new(
            EntityRef::new("ghost", "latest"),
            FailureKind::NotFound,
            "plugin not found in registry: ghost",
        )));

        let mut report = BatchReport::new();
        report.insert("work", "/vaults/work", work);
        report.insert("home", "/vaults/home", home);
        report
    }

    #[test]
    fn test_batch_table_lists_everything() {
        let table = batch_table(&sample(), "installed");
        assert!(table.contains("owner/p2@1.2.0"));
        assert!(table.contains("skipped 1"));
        assert!(table.contains("ghost@latest"));
        assert!(table.contains("not found"));
        assert!(table.contains("plugin not found in registry: ghost"));
        assert!(table.contains("1 installed, 1 skipped, 1 failed across 2 vaults"));

        // Sorted by vault name
        let home = table.find("home").unwrap();
        let work = table.find("work").unwrap();
        assert!(home < work);
    }

    #[test]
    fn test_batch_json_shape() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["work"]["succeeded"][0]["source"], "owner/p2");
        assert_eq!(value["work"]["succeeded"][0]["version"], "1.2.0");
        assert_eq!(value["work"]["skipped"], 1);
        assert_eq!(value["home"]["failed"][0]["kind"], "not_found");
        assert_eq!(value["home"]["failed"][0]["source"], "ghost");
        assert!(value["work"].get("elapsed").is_none());
        assert!(json.contains("\n  \"home\""));
    }

    #[test]
    fn test_run_results() {
        let mut ok = TargetReport::default();
        ok.record(Outcome::Applied(EntityRef::new("git pull", "")));
        ok.elapsed = Duration::from_millis(850);

        let mut broken = TargetReport::default();
        broken.record(Outcome::Failed(Failure::new(
            EntityRef::new("git pull", ""),
            FailureKind::Other,
            "'git pull' exited with exit status: 1",
        )));

        let mut report = BatchReport::new();
        report.insert("b", "/b", broken);
        report.insert("a", "/a", ok);

        let results = run_results(&report);
        assert_eq!(results.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(
            results["a"],
            RunResult {
                success: true,
                duration: "850 ms".to_string(),
                error: None,
            }
        );
        assert!(!results["b"].success);

        let json: serde_json::Value = serde_json::from_str(&to_json(&results).unwrap()).unwrap();
        assert!(json["a"]["error"].is_null());
        assert_eq!(json["b"]["success"], false);

        let table = run_table(&results);
        assert!(table.contains("850 ms"));
        assert!(table.contains("exited with"));
    }

    #[test]
    fn test_stats_json_uses_camel_case() {
        let mut stats = Stats {
            total_vaults: 2,
            total_plugins: 3,
            ..Stats::default()
        };
        stats
            .installed
            .insert("calendar@1.5.10 (12.0 KB)".to_string(), vec!["notes".to_string()]);

        let value: serde_json::Value = serde_json::from_str(&to_json(&stats).unwrap()).unwrap();
        assert_eq!(value["totalVaults"], 2);
        assert_eq!(value["totalPlugins"], 3);
        assert_eq!(value["installed"]["calendar@1.5.10 (12.0 KB)"][0], "notes");

        let table = stats_table(&stats);
        assert!(table.contains("Total vaults:  2"));
        assert!(table.contains("calendar@1.5.10 (12.0 KB)"));
    }
}
