//! `kiln clean`: remove generated output for every discovered project.

use tracing::instrument;

use kiln_adapters::writer;
use kiln_core::application::{AdministratorRegistry, GenerationService};

use crate::{
    cli::CleanArgs,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    session::TreeSettings,
};

#[instrument(skip_all)]
pub fn execute(args: CleanArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let settings = TreeSettings::resolve(&args.tree, &config);
    let master = settings.master(&config.generation.independent_namespaces)?;

    GenerationService::new(
        AdministratorRegistry::new(),
        writer::create(settings.strategy, &master),
    )
    .clean(&master)?;

    if output.is_json() {
        output.json(&serde_json::json!({
            "root": settings.root,
            "strategy": settings.strategy,
            "projects": master.projects().len(),
            "cleaned": true,
        }))?;
    } else {
        output.success(&format!(
            "Removed {} output for {} project(s) under {}",
            settings.strategy,
            master.projects().len(),
            settings.root.display()
        ))?;
    }
    Ok(())
}
