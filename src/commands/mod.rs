pub mod config;
pub mod plugins;
pub mod reports;
pub mod vaults;

use crate::Context;
use crate::cli::{OutputFormat, TargetArgs};
use crate::paths;
use crate::progress::BatchProgress;
use crate::prompt;
use anyhow::{Context as _, Result, bail};
use batch::{BatchReport, ExecutionMode, Operation, select_subset};
use registry::{Client, DEFAULT_TTL, DiskCache};
use std::path::PathBuf;
use vaultkit::{Config, ConfigError, ObsidianDiscovery, Vault};

/// Load the config file, pointing at `config init` when it is missing
pub fn load_config(ctx: &Context) -> Result<(PathBuf, Config)> {
    let path = paths::config_file(ctx.config.as_deref())?;
    match Config::load(&path) {
        Ok(config) => Ok((path, config)),
        Err(err @ ConfigError::NotFound { .. }) => {
            bail!("{err}. Run 'ovm config init' to create one.")
        }
        Err(err) => Err(err.into()),
    }
}

/// Resolve the vaults a command targets and let the user narrow them
pub fn select_vaults(targets: &TargetArgs) -> Result<Vec<Vault>> {
    let discovery =
        ObsidianDiscovery::new(ObsidianDiscovery::default_location().unwrap_or_default());
    let vaults = vaultkit::resolve_targets(&targets.path, &discovery)?;
    log::debug!("Found {} vault(s)", vaults.len());

    let mut selector = prompt::selector(targets.yes);
    let selected = select_subset(
        vaults,
        "Select vaults",
        |vault: &Vault| format!("{} ({})", vault.name, vault.path.display()),
        selector.as_mut(),
    )?;
    Ok(selected)
}

/// Registry client backed by the on-disk cache
pub fn registry_client() -> Result<Client> {
    let dir = paths::registry_cache_dir()?;
    Ok(Client::new().cache(DiskCache::new(dir, DEFAULT_TTL)))
}

/// Spinners only when stdout carries a table and the user did not ask for quiet
pub fn show_progress(ctx: &Context, output: OutputFormat) -> bool {
    !ctx.quiet && output == OutputFormat::Table
}

/// Run `op` over `vaults`
pub fn run_batch<O>(
    op: &O,
    vaults: &[Vault],
    mode: ExecutionMode,
    show_progress: bool,
    verb: &'static str,
) -> Result<BatchReport>
where
    O: Operation<Target = Vault>,
{
    let mut progress = BatchProgress::new(verb, show_progress);
    batch::execute(op, vaults, mode, &mut progress)
        .with_context(|| format!("Failed to {}", op.name()))
}
