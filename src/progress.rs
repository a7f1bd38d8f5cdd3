//! Progress indicators for ovm CLI.
//!
//! Spinners draw to stderr and stay hidden when it is not a terminal, so
//! JSON output on stdout is never interleaved with them.

use batch::{Outcome, ProgressCallback, TargetReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Create a steadily ticking spinner
pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(TICK);
    pb
}

/// Batch progress shown as one spinner per target
pub struct BatchProgress {
    verb: &'static str,
    enabled: bool,
    bar: Option<ProgressBar>,
    done: usize,
    total: usize,
}

impl BatchProgress {
    pub fn new(verb: &'static str, enabled: bool) -> Self {
        Self {
            verb,
            enabled,
            bar: None,
            done: 0,
            total: 0,
        }
    }
}

impl ProgressCallback for BatchProgress {
    fn on_target_start(&mut self, name: &str, entries: usize) {
        self.done = 0;
        self.total = entries;
        if self.enabled {
            self.bar = Some(spinner(format!("{name}: {} {entries} item(s)", self.verb)));
        }
    }

    fn on_entry_start(&mut self, target: &str, description: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!(
                "{target}: {} {description} [{}/{}]",
                self.verb,
                self.done + 1,
                self.total
            ));
        }
    }

    fn on_entry_complete(&mut self, target: &str, outcome: &Outcome) {
        self.done += 1;
        if let Outcome::Failed(failure) = outcome {
            log::info!("{target}: {} failed: {}", failure.entity, failure.error);
        }
    }

    fn on_target_complete(&mut self, name: &str, report: &TargetReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        log::info!(
            "{name}: {} applied, {} skipped, {} failed in {:?}",
            report.succeeded.len(),
            report.skipped,
            report.failed.len(),
            report.elapsed
        );
    }
}
