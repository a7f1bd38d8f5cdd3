//! Batch operations over vaults
//!
//! Each operation implements [`batch::Operation`] for [`vaultkit::Vault`]:
//! 1. Install - Download configured plugins that are missing
//! 2. Uninstall - Remove named plugins
//! 3. Prune - Remove installed plugins the config no longer lists
//! 4. Run - Execute a shell command in each vault

pub mod install;
pub mod prune;
pub mod run;
pub mod uninstall;

pub use install::Install;
pub use prune::Prune;
pub use run::RunCommand;
pub use uninstall::Uninstall;

use batch::{EntityRef, Failure, FailureKind, Outcome};
use registry::ErrorCategory;
use vaultkit::{PluginError, Vault, plugins};

/// Convert a registry error into a per-pair failure
pub fn registry_failure(entity: EntityRef, err: &registry::Error) -> Failure {
    let kind = match err.category() {
        ErrorCategory::NotFound => FailureKind::NotFound,
        ErrorCategory::RateLimit => FailureKind::RateLimited,
        ErrorCategory::Network => FailureKind::Network,
        ErrorCategory::Io => FailureKind::Io,
        ErrorCategory::Format | ErrorCategory::Other => FailureKind::Other,
    };
    Failure::new(entity, kind, err.to_string())
}

/// Convert a plugin storage error into a per-pair failure
pub fn plugin_failure(entity: EntityRef, err: &PluginError) -> Failure {
    let kind = match err {
        PluginError::Io { .. } | PluginError::AlreadyPresent { .. } => FailureKind::Io,
        _ => FailureKind::Other,
    };
    Failure::new(entity, kind, err.to_string())
}

/// Remove one plugin directory, optionally dropping it from the enabled list
///
/// The reported version comes from the plugin's manifest when it can be
/// read. A directory that vanished before removal still counts as removed.
fn remove_plugin(vault: &Vault, id: &str, disable: bool) -> Result<Outcome, Failure> {
    plugins::check_id(id).map_err(|e| plugin_failure(EntityRef::new(id, ""), &e))?;
    if !plugins::is_installed(vault, id) {
        return Ok(Outcome::skipped(EntityRef::new(id, ""), "not installed"));
    }

    let version = plugins::read_manifest(vault, id)
        .map(|manifest| manifest.version)
        .unwrap_or_default();
    let entity = EntityRef::new(id, version);

    if !plugins::remove(vault, id).map_err(|e| plugin_failure(entity.clone(), &e))? {
        log::debug!("{}: {id} was already gone", vault.name);
    }
    if disable {
        plugins::disable(vault, id).map_err(|e| plugin_failure(entity.clone(), &e))?;
    }

    log::info!("{}: removed {entity}", vault.name);
    Ok(Outcome::Applied(entity))
}


#[cfg(test)]
mod tests {
    use super::testing::{install_fake, vault};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_registry_failure_kinds() {
        let entity = EntityRef::new("calendar", "latest");

        let failure = registry_failure(
            entity.clone(),
            &registry::Error::PluginNotFound("calendar".to_string()),
        );
        assert_eq!(failure.kind, FailureKind::NotFound);

        let failure = registry_failure(entity.clone(), &registry::Error::from_status(429));
        assert_eq!(failure.kind, FailureKind::RateLimited);
        assert!(failure.error.contains("try again later"));

        let failure = registry_failure(entity, &registry::Error::from_status(502));
        assert_eq!(failure.kind, FailureKind::Network);
    }

    #[test]
    fn test_remove_plugin_reports_manifest_version() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");
        install_fake(&v, "calendar", "1.5.10");
        plugins::enable(&v, "calendar").unwrap();

        let outcome = remove_plugin(&v, "calendar", true).unwrap();
        assert_eq!(outcome, Outcome::Applied(EntityRef::new("calendar", "1.5.10")));
        assert!(!plugins::is_installed(&v, "calendar"));
        assert!(plugins::enabled(&v).unwrap().is_empty());
    }

    #[test]
    fn test_remove_plugin_absent_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");

        let outcome = remove_plugin(&v, "calendar", true).unwrap();
        assert_eq!(outcome.state(), batch::PairState::Skipped);
    }

    #[test]
    fn test_remove_plugin_invalid_id_fails() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");
        install_fake(&v, "calendar", "1.5.10");

        let failure = remove_plugin(&v, "..", true).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Other);
        assert!(failure.error.contains("Invalid plugin id"));
        assert!(plugins::is_installed(&v, "calendar"));
    }

    #[test]
    fn test_remove_plugin_without_manifest() {
        let tmp = TempDir::new().unwrap();
        let v = vault(tmp.path(), "notes");
        std::fs::create_dir_all(v.plugin_dir("broken")).unwrap();

        let outcome = remove_plugin(&v, "broken", false).unwrap();
        assert_eq!(outcome, Outcome::Applied(EntityRef::new("broken", "")));
    }
}
