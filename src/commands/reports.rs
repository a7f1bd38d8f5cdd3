use anyhow::Result;
use vaultkit::{Config, Vault, plugins};

use crate::Context;
use crate::cli::{OutputFormat, ReportsCommand, TargetArgs};
use crate::commands::{load_config, select_vaults};
use crate::progress;
use crate::report::{self, Stats};
use crate::ui;

pub fn run(ctx: &Context, cmd: ReportsCommand) -> Result<()> {
    match cmd {
        ReportsCommand::Stats(targets) => stats(ctx, &targets),
    }
}

fn stats(ctx: &Context, targets: &TargetArgs) -> Result<()> {
    let (_, config) = load_config(ctx)?;
    let vaults = select_vaults(targets)?;

    let spinner = (!ctx.quiet && targets.output == OutputFormat::Table).then(|| {
        progress::spinner(format!(
            "Collecting stats for {}",
            ui::plural(vaults.len(), "vault")
        ))
    });
    let stats = collect(&config, &vaults);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    report::print_stats(&stats, targets.output)
}

/// Count configured plugins installed in `vaults`
///
/// Keys are `id@version (size)` from the installed manifest, or the bare id
/// when the manifest cannot be read or the directory is empty.
fn collect(config: &Config, vaults: &[Vault]) -> Stats {
    let mut stats = Stats {
        total_vaults: vaults.len(),
        total_plugins: config.plugins.len(),
        ..Stats::default()
    };

    for vault in vaults {
        for entry in &config.plugins {
            if !plugins::is_installed(vault, &entry.id) {
                continue;
            }

            let size = plugins::dir_size(&vault.plugin_dir(&entry.id));
            let key = match plugins::read_manifest(vault, &entry.id) {
                Ok(manifest) if size > 0 => {
                    format!("{}@{} ({})", entry.id, manifest.version, ui::format_size(size))
                }
                Ok(_) => entry.id.clone(),
                Err(e) => {
                    log::debug!("{}: {e}", vault.name);
                    entry.id.clone()
                }
            };

            stats.installed.entry(key).or_default().push(vault.name.clone());
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vaultkit::PluginEntry;

    fn vault_with(root: &std::path::Path, name: &str, plugins: &[(&str, &str)]) -> Vault {
        let path = root.join(name);
        for (id, version) in plugins {
            let dir = path.join(".obsidian").join("plugins").join(id);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("main.js"), vec![b'x'; 2048]).unwrap();
            fs::write(
                dir.join("manifest.json"),
                format!(r#"{{"id":"{id}","version":"{version}"}}"#),
            )
            .unwrap();
        }
        fs::create_dir_all(path.join(".obsidian")).unwrap();
        Vault::from_path(path)
    }

    #[test]
    fn test_collect_groups_vaults() {
        let tmp = TempDir::new().unwrap();
        let work = vault_with(tmp.path(), "work", &[("calendar", "1.5.10"), ("extra", "0.1.0")]);
        let home = vault_with(tmp.path(), "home", &[("calendar", "1.5.10")]);
        let empty = vault_with(tmp.path(), "empty", &[]);

        let mut config = Config::default();
        config.add(PluginEntry::new("calendar", None));
        config.add(PluginEntry::new("dataview", None));

        let stats = collect(&config, &[home, work, empty]);
        assert_eq!(stats.total_vaults, 3);
        assert_eq!(stats.total_plugins, 2);
        assert_eq!(stats.installed.len(), 1);

        let (key, vaults) = stats.installed.iter().next().unwrap();
        assert!(key.starts_with("calendar@1.5.10 ("));
        assert!(key.ends_with("KB)"));
        assert_eq!(vaults, &vec!["home".to_string(), "work".to_string()]);
    }

    #[test]
    fn test_collect_without_manifest_uses_id() {
        let tmp = TempDir::new().unwrap();
        let v = vault_with(tmp.path(), "notes", &[]);
        fs::create_dir_all(v.plugin_dir("calendar")).unwrap();

        let mut config = Config::default();
        config.add(PluginEntry::new("calendar", None));

        let stats = collect(&config, &[v]);
        assert_eq!(stats.installed["calendar"], vec!["notes".to_string()]);
    }
}
