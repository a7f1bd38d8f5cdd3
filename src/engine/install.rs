//! Install configured plugins into vaults

use super::{plugin_failure, registry_failure};
use batch::{EntityRef, Failure, Operation, Outcome};
use registry::Client;
use vaultkit::{PluginEntry, PluginError, Vault, plugins};

pub struct Install<'a> {
    client: &'a Client,
    plugins: Vec<PluginEntry>,
    enable: bool,
}

impl<'a> Install<'a> {
    pub fn new(client: &'a Client, plugins: Vec<PluginEntry>, enable: bool) -> Self {
        Self {
            client,
            plugins,
            enable,
        }
    }
}

impl Operation for Install<'_> {
    type Target = Vault;
    type Entry = PluginEntry;

    fn name(&self) -> &'static str {
        "install"
    }

    fn entries(&self, _vault: &Vault) -> Result<Vec<PluginEntry>, Failure> {
        Ok(self.plugins.clone())
    }

    fn describe(&self, entry: &PluginEntry) -> String {
        format!("{}@{}", entry.id, entry.version())
    }

    fn apply(&self, vault: &Vault, entry: &PluginEntry) -> Result<Outcome, Failure> {
        let version = entry.version();
        let found = self
            .client
            .find(&entry.id)
            .map_err(|e| registry_failure(EntityRef::new(&entry.id, version), &e))?;
        let entity = EntityRef::new(&found.repo, version);

        if plugins::is_installed(vault, &entry.id) {
            return Ok(Outcome::skipped(entity, "already installed"));
        }

        let files = self
            .client
            .download_plugin(&found, version)
            .map_err(|e| registry_failure(entity.clone(), &e))?;
        let contents: Vec<(&str, &[u8])> = files
            .iter()
            .map(|file| (file.name.as_str(), file.data.as_slice()))
            .collect();

        match plugins::place(vault, &entry.id, &contents) {
            Ok(_) => {}
            Err(PluginError::AlreadyPresent { .. }) => {
                return Ok(Outcome::skipped(entity, "already installed"));
            }
            Err(e) => return Err(plugin_failure(entity, &e)),
        }

        if self.enable
            && plugins::enable(vault, &entry.id)
                .map_err(|e| plugin_failure(entity.clone(), &e))?
        {
            log::debug!("{}: enabled {}", vault.name, entry.id);
        }

        // Report the version that actually landed when `latest` was requested
        let installed = match plugins::read_manifest(vault, &entry.id) {
            Ok(manifest) if !manifest.version.is_empty() => {
                EntityRef::new(&found.repo, manifest.version)
            }
            _ => entity,
        };

        log::info!("{}: installed {installed}", vault.name);
        Ok(Outcome::Applied(installed))
    }
}
