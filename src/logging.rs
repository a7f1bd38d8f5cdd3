//! Logger setup
//!
//! Logging is configured once, from flags, before any command runs.

use crate::cli::Cli;
use chrono::{SecondsFormat, Utc};
use log::LevelFilter;
use std::io::Write;

/// How the logger should behave, derived from global flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub level: LevelFilter,
    pub timestamps: bool,
    pub json: bool,
}

impl LogOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            level: level_for(cli.verbose, cli.quiet, cli.debug),
            timestamps: cli.timestamp,
            json: cli.log_json,
        }
    }

    /// Install the global logger
    pub fn init(self) {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(self.level);

        if self.json {
            let timestamps = self.timestamps;
            builder.format(move |buf, record| {
                writeln!(buf, "{}", json_line(record, timestamps))
            });
        } else if self.timestamps {
            builder.format_timestamp_secs();
        } else {
            builder.format_timestamp(None);
        }

        builder.init();
    }
}

fn level_for(verbose: u8, quiet: bool, debug: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if debug { level.max(LevelFilter::Debug) } else { level }
}

fn json_line(record: &log::Record<'_>, timestamps: bool) -> serde_json::Value {
    let mut line = serde_json::json!({
        "level": record.level().as_str().to_lowercase(),
        "target": record.target(),
        "message": record.args().to_string(),
    });
    if timestamps {
        line["timestamp"] = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .into();
    }
    line
}
