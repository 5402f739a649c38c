//! Turns parsed flags plus configuration into the core's run inputs.

use std::path::PathBuf;

use tracing::{debug, instrument};

use kiln_adapters::{BUILTIN_PLUGINS, ProjectDiscovery, plugins};
use kiln_core::{
    application::AdministratorRegistry,
    domain::{MasterEnvironment, WriteStrategy},
    error::KilnError,
};

use crate::{
    cli::TreeArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

/// Tree and layout settings after flags have been merged over config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSettings {
    pub root: PathBuf,
    pub strategy: WriteStrategy,
    pub suffix: String,
    pub extension: String,
    pub manifest_name: String,
    pub max_depth: usize,
    pub common_namespace: String,
}

impl TreeSettings {
    pub fn resolve(args: &TreeArgs, config: &AppConfig) -> Self {
        Self {
            root: args.root.clone(),
            strategy: args.strategy.map(WriteStrategy::from).unwrap_or(config.output.strategy),
            suffix: args.suffix.clone().unwrap_or_else(|| config.generation.suffix.clone()),
            extension: args
                .extension
                .clone()
                .unwrap_or_else(|| config.output.extension.clone()),
            manifest_name: args
                .manifest_name
                .clone()
                .unwrap_or_else(|| config.discovery.manifest_name.clone()),
            max_depth: args.max_depth.unwrap_or(config.discovery.max_depth),
            common_namespace: config.generation.common_namespace.clone(),
        }
    }

    /// Discover the tree's projects and build the run's master environment.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn master(&self, independent_namespaces: &[String]) -> CliResult<MasterEnvironment> {
        if !self.root.is_dir() {
            return Err(CliError::RootNotFound {
                path: self.root.clone(),
            });
        }
        let builder = MasterEnvironment::builder(&self.root)
            .generated_suffix(&self.suffix)
            .file_extension(self.extension.trim_start_matches('.'))
            .common_namespace(&self.common_namespace)
            .independent_namespaces(independent_namespaces);

        let builder = ProjectDiscovery::new(&self.root)
            .manifest_name(&self.manifest_name)
            .generated_suffix(&self.suffix)
            .max_depth(self.max_depth)
            .register(builder)?;

        let master = builder.build().map_err(KilnError::from)?;
        debug!(projects = master.projects().len(), "Master environment ready");
        Ok(master)
    }
}

/// Instantiate the named built-in plugins, in order.
pub fn registry(names: &[String]) -> CliResult<AdministratorRegistry> {
    let mut registry = AdministratorRegistry::new();
    for name in names {
        let admin = plugins::builtin(name).ok_or_else(|| CliError::UnknownPlugin {
            name: name.clone(),
            available: BUILTIN_PLUGINS.to_vec(),
        })?;
        registry.register(admin)?;
    }
    Ok(registry)
}
