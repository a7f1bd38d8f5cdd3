use anyhow::{Context as _, Result, bail};
use batch::{BatchReport, ExecutionMode, select_subset};
use vaultkit::{Config, PluginEntry, plugins};

use crate::Context;
use crate::cli::{InstallArgs, PluginsCommand, TargetArgs, UninstallArgs};
use crate::commands::{load_config, registry_client, run_batch, select_vaults, show_progress};
use crate::engine::{Install, Prune, Uninstall};
use crate::prompt;
use crate::report;
use crate::ui;

pub fn run(ctx: &Context, cmd: PluginsCommand) -> Result<()> {
    match cmd {
        PluginsCommand::Install(args) => install(ctx, args),
        PluginsCommand::Uninstall(args) => uninstall(ctx, args),
        PluginsCommand::Prune(targets) => prune(ctx, &targets),
    }
}

/// Install configured plugins, or a single `id[@version]`
fn install(ctx: &Context, args: InstallArgs) -> Result<()> {
    let (config_path, mut config) = load_config(ctx)?;

    let adhoc = match args.id.as_deref() {
        Some(requested) => {
            let entry = PluginEntry::parse(requested.trim());
            if !plugins::is_valid_id(&entry.id) {
                bail!("Invalid plugin '{requested}', expected <id> or <id>@<version>");
            }
            Some(entry)
        }
        None => None,
    };

    let entries = match &adhoc {
        Some(entry) => vec![entry.clone()],
        None => config.plugins.clone(),
    };
    if entries.is_empty() {
        ui::warn(&format!(
            "No plugins configured in {}. Add some or pass a plugin id.",
            config_path.display()
        ));
        return Ok(());
    }

    let vaults = select_vaults(&args.targets)?;
    let client = registry_client()?;
    let op = Install::new(&client, entries, args.enable);
    let report = run_batch(
        &op,
        &vaults,
        ExecutionMode::Sequential,
        show_progress(ctx, args.targets.output),
        "installing",
    )?;
    report::print_batch(&report, "installed", args.targets.output)?;

    if let Some(entry) = adhoc
        && remember(&mut config, entry, &report)
    {
        config
            .write(&config_path)
            .with_context(|| format!("Failed to update {}", config_path.display()))?;
        if !ctx.quiet {
            ui::dim(&format!("Added to {}", config_path.display()));
        }
    }

    Ok(())
}

/// Add an ad-hoc plugin to the config once it is present in some vault
fn remember(config: &mut Config, entry: PluginEntry, report: &BatchReport) -> bool {
    if config.contains(&entry.id) {
        return false;
    }
    let present = report
        .iter()
        .any(|(_, result)| !result.succeeded.is_empty() || result.skipped > 0);
    present && config.add(entry)
}

fn uninstall(ctx: &Context, args: UninstallArgs) -> Result<()> {
    let (config_path, config) = load_config(ctx)?;

    let ids = match args.id {
        Some(id) => {
            if !plugins::is_valid_id(&id) {
                bail!("Invalid plugin id '{id}'");
            }
            vec![id]
        }
        None => {
            if config.plugins.is_empty() {
                ui::warn(&format!("No plugins configured in {}", config_path.display()));
                return Ok(());
            }
            let ids: Vec<String> = config.ids().into_iter().map(String::from).collect();
            let mut selector = prompt::selector(args.targets.yes);
            select_subset(ids, "Select plugins to uninstall", String::clone, selector.as_mut())?
        }
    };

    let vaults = select_vaults(&args.targets)?;
    let op = Uninstall::new(ids, true);
    let report = run_batch(
        &op,
        &vaults,
        ExecutionMode::Sequential,
        show_progress(ctx, args.targets.output),
        "removing",
    )?;
    report::print_batch(&report, "removed", args.targets.output)
}

fn prune(ctx: &Context, targets: &TargetArgs) -> Result<()> {
    let (_, config) = load_config(ctx)?;
    let vaults = select_vaults(targets)?;

    let op = Prune::new(config.ids(), true);
    let report = run_batch(
        &op,
        &vaults,
        ExecutionMode::Sequential,
        show_progress(ctx, targets.output),
        "pruning",
    )?;
    report::print_batch(&report, "removed", targets.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use batch::{EntityRef, Failure, FailureKind, Outcome, TargetReport};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use vaultkit::Vault;

    fn report_with(outcome: Outcome) -> BatchReport {
        let mut result = TargetReport::default();
        result.record(outcome);
        let mut report = BatchReport::new();
        report.insert("notes", "/vaults/notes", result);
        report
    }

    #[test]
    fn test_remember_after_install() {
        let mut config = Config::default();
        let report = report_with(Outcome::Applied(EntityRef::new("owner/p2", "1.2.0")));

        let added = remember(
            &mut config,
            PluginEntry::new("p2", Some("1.2.0".to_string())),
            &report,
        );
        assert!(added);
        assert_eq!(config.find("p2").unwrap().version(), "1.2.0");
    }

    #[test]
    fn test_remember_when_already_present() {
        let mut config = Config::default();
        let report = report_with(Outcome::skipped(EntityRef::new("owner/p2", "latest"), "present"));

        assert!(remember(&mut config, PluginEntry::new("p2", None), &report));
        assert!(config.contains("p2"));
    }

    #[test]
    fn test_remember_skips_failed_install() {
        let mut config = Config::default();
        let report = report_with(Outcome::Failed(Failure::new(
            EntityRef::new("ghost", "latest"),
            FailureKind::NotFound,
            "plugin not found in registry: ghost",
        )));

        assert!(!remember(&mut config, PluginEntry::new("ghost", None), &report));
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_remember_keeps_existing_entry() {
        let mut config = Config::default();
        config.add(PluginEntry::new("p2", Some("1.0.0".to_string())));
        let report = report_with(Outcome::Applied(EntityRef::new("owner/p2", "1.2.0")));

        assert!(!remember(
            &mut config,
            PluginEntry::new("p2", Some("1.2.0".to_string())),
            &report
        ));
        assert_eq!(config.find("p2").unwrap().version(), "1.0.0");
    }

    fn fixture_vault(root: &Path) -> Vault {
        let path = root.join("notes");
        let dir = path.join(".obsidian").join("plugins").join("calendar");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("manifest.json"), r#"{"id":"calendar","version":"1.5.10"}"#).unwrap();
        Vault::from_path(path)
    }

    fn targets(vault: &Vault) -> TargetArgs {
        TargetArgs {
            path: vault.path.display().to_string(),
            yes: true,
            output: OutputFormat::Table,
        }
    }

    fn context(config: std::path::PathBuf) -> Context {
        Context {
            quiet: true,
            config: Some(config),
        }
    }

    #[test]
    fn test_uninstall_requires_config() {
        let tmp = TempDir::new().unwrap();
        let vault = fixture_vault(tmp.path());
        let ctx = context(tmp.path().join("missing.json"));

        let args = UninstallArgs {
            id: Some("calendar".to_string()),
            targets: targets(&vault),
        };
        let err = uninstall(&ctx, args).unwrap_err();
        assert!(err.to_string().contains("ovm config init"));
        assert!(plugins::is_installed(&vault, "calendar"));
    }

    #[test]
    fn test_uninstall_rejects_invalid_id() {
        let tmp = TempDir::new().unwrap();
        let vault = fixture_vault(tmp.path());
        let config_path = tmp.path().join("ovm.json");
        Config::create_default(&config_path).unwrap();
        let ctx = context(config_path);

        for id in ["", "..", "calendar/.."] {
            let args = UninstallArgs {
                id: Some(id.to_string()),
                targets: targets(&vault),
            };
            let err = uninstall(&ctx, args).unwrap_err();
            assert!(err.to_string().contains("Invalid plugin id"), "{id}");
        }
        assert!(plugins::is_installed(&vault, "calendar"));
        assert!(vault.path.join(".obsidian").is_dir());
    }

    #[test]
    fn test_install_rejects_path_like_id() {
        let tmp = TempDir::new().unwrap();
        let vault = fixture_vault(tmp.path());
        let config_path = tmp.path().join("ovm.json");
        Config::create_default(&config_path).unwrap();
        let ctx = context(config_path.clone());

        let args = InstallArgs {
            id: Some("../escape@1.0.0".to_string()),
            enable: true,
            targets: targets(&vault),
        };
        let err = install(&ctx, args).unwrap_err();
        assert!(err.to_string().contains("Invalid plugin"));
        assert!(Config::load(&config_path).unwrap().plugins.is_empty());
    }
}
