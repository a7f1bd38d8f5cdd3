use anyhow::{Result, bail};
use vaultkit::{Config, ConfigError};

use crate::Context;
use crate::cli::ConfigCommand;
use crate::commands::load_config;
use crate::paths;
use crate::runner;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Init => init(ctx),
        ConfigCommand::Edit => edit(ctx),
    }
}

/// Create `{ "plugins": [] }` without touching an existing file
fn init(ctx: &Context) -> Result<()> {
    let path = paths::config_file(ctx.config.as_deref())?;

    match Config::create_default(&path) {
        Ok(_) => {
            ui::success(&format!("Created {}", path.display()));
            Ok(())
        }
        Err(ConfigError::AlreadyExists { path }) => {
            bail!("File already exists: {}", path.display())
        }
        Err(err) => Err(err.into()),
    }
}

fn edit(ctx: &Context) -> Result<()> {
    let (path, _) = load_config(ctx)?;
    log::debug!("Opening {} in editor", path.display());
    runner::open_in_editor(&path)
}
