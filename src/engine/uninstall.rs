//! Remove named plugins from vaults

use super::remove_plugin;
use batch::{Failure, Operation, Outcome};
use vaultkit::Vault;

pub struct Uninstall {
    ids: Vec<String>,
    disable: bool,
}

impl Uninstall {
    /// `disable` also drops each removed id from the vault's enabled list
    pub fn new(ids: Vec<String>, disable: bool) -> Self {
        Self { ids, disable }
    }
}

impl Operation for Uninstall {
    type Target = Vault;
    type Entry = String;

    fn name(&self) -> &'static str {
        "uninstall"
    }

    fn entries(&self, _vault: &Vault) -> Result<Vec<String>, Failure> {
        Ok(self.ids.clone())
    }

    fn describe(&self, id: &String) -> String {
        id.clone()
    }

    fn apply(&self, vault: &Vault, id: &String) -> Result<Outcome, Failure> {
        remove_plugin(vault, id, self.disable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{install_fake, vault};
    use batch::{EntityRef, ExecutionMode, NoProgress, execute};
    use std::fs;
    use tempfile::TempDir;
    use vaultkit::plugins;

    #[test]
    fn test_uninstall_present_and_absent() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");
        install_fake(&v, "calendar", "1.5.10");
        install_fake(&v, "dataview", "0.5.64");
        plugins::enable(&v, "calendar").unwrap();
        plugins::enable(&v, "dataview").unwrap();

        let op = Uninstall::new(vec!["calendar".to_string(), "ghost".to_string()], true);
        let report = execute(
            &op,
            &[v.clone()],
            ExecutionMode::Sequential,
            &mut NoProgress,
        )
        .unwrap();

        let result = report.get("notes").unwrap();
        assert_eq!(result.succeeded, vec![EntityRef::new("calendar", "1.5.10")]);
        assert_eq!(result.skipped, 1);
        assert!(result.failed.is_empty());

        assert_eq!(plugins::list_installed(&v).unwrap(), vec!["dataview".to_string()]);
        assert_eq!(plugins::enabled(&v).unwrap(), vec!["dataview".to_string()]);
    }

    #[test]
    fn test_uninstall_never_leaves_plugin_dir() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");
        install_fake(&v, "calendar", "1.5.10");
        install_fake(&v, "dataview", "0.5.64");
        plugins::enable(&v, "calendar").unwrap();
        fs::write(v.path.join(".obsidian").join("app.json"), "{}").unwrap();

        let ids = ["", ".", "..", "../..", "calendar/../.."];
        let op = Uninstall::new(ids.iter().map(ToString::to_string).collect(), true);
        let report = execute(
            &op,
            &[v.clone()],
            ExecutionMode::Sequential,
            &mut NoProgress,
        )
        .unwrap();

        let result = report.get("notes").unwrap();
        assert_eq!(result.failed.len(), ids.len());
        assert!(result.succeeded.is_empty());

        assert_eq!(
            plugins::list_installed(&v).unwrap(),
            vec!["calendar".to_string(), "dataview".to_string()]
        );
        assert_eq!(plugins::enabled(&v).unwrap(), vec!["calendar".to_string()]);
        assert!(v.path.join(".obsidian").join("app.json").is_file());
    }

    #[test]
    fn test_uninstall_twice_skips() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");
        install_fake(&v, "calendar", "1.5.10");

        let op = Uninstall::new(vec!["calendar".to_string()], false);
        execute(&op, &[v.clone()], ExecutionMode::Sequential, &mut NoProgress).unwrap();
        let report = execute(&op, &[v], ExecutionMode::Sequential, &mut NoProgress).unwrap();

        let result = report.get("notes").unwrap();
        assert!(result.succeeded.is_empty());
        assert_eq!(result.skipped, 1);
    }
}
