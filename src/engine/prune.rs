//! Remove installed plugins that the config does not list

use super::remove_plugin;
use batch::{EntityRef, Failure, FailureKind, Operation, Outcome};
use std::collections::BTreeSet;
use vaultkit::{Vault, plugins};

pub struct Prune {
    referenced: BTreeSet<String>,
    disable: bool,
}

impl Prune {
    pub fn new<I, S>(referenced: I, disable: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            referenced: referenced.into_iter().map(Into::into).collect(),
            disable,
        }
    }
}

impl Operation for Prune {
    type Target = Vault;
    type Entry = String;

    fn name(&self) -> &'static str {
        "prune"
    }

    /// Installed ids minus the referenced ones
    fn entries(&self, vault: &Vault) -> Result<Vec<String>, Failure> {
        let installed = plugins::list_installed(vault).map_err(|e| {
            Failure::new(
                EntityRef::new(vault.plugins_dir().display().to_string(), ""),
                FailureKind::Io,
                e.to_string(),
            )
        })?;

        Ok(installed
            .into_iter()
            .filter(|id| !self.referenced.contains(id))
            .collect())
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
    use batch::{ExecutionMode, NoProgress, execute};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_prune_removes_unreferenced() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");
        for id in ["A", "B", "C"] {
            install_fake(&v, id, "1.0.0");
            plugins::enable(&v, id).unwrap();
        }

        let op = Prune::new(["B"], true);
        let report = execute(
            &op,
            &[v.clone()],
            ExecutionMode::Sequential,
            &mut NoProgress,
        )
        .unwrap();

        let result = report.get("notes").unwrap();
        assert_eq!(
            result.succeeded,
            vec![EntityRef::new("A", "1.0.0"), EntityRef::new("C", "1.0.0")]
        );
        assert!(result.failed.is_empty());
        assert_eq!(plugins::list_installed(&v).unwrap(), vec!["B".to_string()]);
        assert_eq!(plugins::enabled(&v).unwrap(), vec!["B".to_string()]);
    }

    #[test]
    fn test_prune_without_plugins_dir() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "empty");

        let op = Prune::new(Vec::<String>::new(), true);
        let report = execute(&op, &[v], ExecutionMode::Sequential, &mut NoProgress).unwrap();

        let result = report.get("empty").unwrap();
        assert_eq!(result.total(), 0);
        assert!(result.is_success());
    }

    #[test]
    fn test_prune_unreadable_plugins_dir_is_target_failure() {
        let tmp = TempDir::new().unwrap();
        let broken = vault(tmp.path(), "broken");
        let fine = vault(tmp.path(), "fine");
        fs::write(broken.plugins_dir(), "not a directory").unwrap();
        install_fake(&fine, "stale", "0.1.0");

        let op = Prune::new(Vec::<String>::new(), false);
        let report = execute(
            &op,
            &[broken, fine],
            ExecutionMode::Sequential,
            &mut NoProgress,
        )
        .unwrap();

        let failed = &report.get("broken").unwrap().failed;
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].kind, FailureKind::Io);
        assert_eq!(report.get("fine").unwrap().succeeded.len(), 1);
    }
}
