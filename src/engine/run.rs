//! Run a shell command in each vault

use crate::runner::{self, CommandError};
use anyhow::{Context, Result};
use batch::{EntityRef, Failure, FailureKind, Operation, Outcome};
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use vaultkit::Vault;

/// One line of the custom command log
#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    timestamp: String,
    vault: &'a str,
    path: String,
    command: &'a str,
    success: bool,
    duration_ms: u64,
    error: Option<String>,
}

pub struct RunCommand {
    template: String,
    placeholder: Regex,
    silent: bool,
    vault_cwd: bool,
    log: Option<Mutex<File>>,
}

impl RunCommand {
    pub fn new(template: &str, silent: bool, vault_cwd: bool) -> Result<Self> {
        Ok(Self {
            template: template.to_string(),
            placeholder: Regex::new(r"\{(\d+)\}")?,
            silent,
            vault_cwd,
            log: None,
        })
    }

    /// Append a JSON line per execution to `path`
    pub fn log_to(mut self, path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        self.log = Some(Mutex::new(file));
        Ok(self)
    }

    /// Substitute `{0}` with the vault path and `{1}` with its name
    pub fn interpolate(&self, vault: &Vault) -> String {
        self.placeholder
            .replace_all(&self.template, |caps: &Captures<'_>| match &caps[1] {
                "0" => vault.path.display().to_string(),
                "1" => vault.name.clone(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }

    fn print_output(&self, vault: &Vault, stdout: &[u8], stderr: &[u8]) {
        if self.silent || (stdout.is_empty() && stderr.is_empty()) {
            return;
        }
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{} {}", "▸".cyan(), vault.name.bold());
        let _ = out.write_all(stdout);
        let _ = out.write_all(stderr);
        let _ = out.flush();
    }

    fn record(
        &self,
        vault: &Vault,
        command: &str,
        elapsed: Duration,
        error: Option<&CommandError>,
    ) {
        let Some(log) = &self.log else {
            return;
        };

        let record = LogRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            vault: &vault.name,
            path: vault.path.display().to_string(),
            command,
            success: error.is_none(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error: error.map(ToString::to_string),
        };

        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Failed to serialize command log record: {e}");
                return;
            }
        };
        let mut file = log.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(e) = writeln!(file, "{line}") {
            log::warn!("Failed to write command log: {e}");
        }
    }
}

impl Operation for RunCommand {
    type Target = Vault;
    type Entry = String;

    fn name(&self) -> &'static str {
        "run"
    }

    fn entries(&self, vault: &Vault) -> Result<Vec<String>, Failure> {
        Ok(vec![self.interpolate(vault)])
    }

    fn describe(&self, command: &String) -> String {
        command.clone()
    }

    fn apply(&self, vault: &Vault, command: &String) -> Result<Outcome, Failure> {
        let cwd = self.vault_cwd.then_some(vault.path.as_path());
        let started = Instant::now();
        let result = runner::run_shell(command, cwd);
        let elapsed = started.elapsed();
        let entity = EntityRef::new(command.as_str(), "");

        match result {
            Ok(output) => {
                self.print_output(vault, &output.stdout, &output.stderr);
                self.record(vault, command, elapsed, None);
                log::info!("{}: '{command}' finished in {elapsed:?}", vault.name);
                Ok(Outcome::Applied(entity))
            }
            Err(e) => {
                self.record(vault, command, elapsed, Some(&e));
                let kind = match &e {
                    CommandError::Spawn { .. } => FailureKind::Io,
                    CommandError::Exit { .. } => FailureKind::Other,
                };
                Err(Failure::new(entity, kind, e.to_string()))
            }
        }
    }
}
