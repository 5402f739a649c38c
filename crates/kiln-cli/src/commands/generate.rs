//! `kiln generate`: one full generation run over a source tree.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use kiln_adapters::writer;
use kiln_core::{
    application::{AdministratorState, CancellationToken, GenerationService, RunOptions, RunReport},
    domain::WriteStrategy,
};

use crate::{
    cli::GenerateArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    session::{self, TreeSettings},
};

/// Report plus the settings it was produced with, for `--output-format json`.
#[derive(Serialize)]
struct GenerateSummary<'a> {
    root: &'a Path,
    strategy: WriteStrategy,
    #[serde(flatten)]
    report: &'a RunReport,
}

#[instrument(skip_all)]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let settings = TreeSettings::resolve(&args.tree, &config);

    let plugins = if args.plugins.is_empty() {
        config.generation.plugins.clone()
    } else {
        args.plugins
    };
    let registry = session::registry(&plugins)?;

    let mut independent = config.generation.independent_namespaces.clone();
    independent.extend(args.exclude);
    let master = settings.master(&independent)?;

    let options = RunOptions {
        fail_fast: args.fail_fast || config.generation.fail_fast,
        inject_annotations: config.generation.inject_annotations && !args.no_annotations,
    };
    info!(
        strategy = %settings.strategy,
        plugins = plugins.len(),
        projects = master.projects().len(),
        "Generating"
    );

    let mut service =
        GenerationService::new(registry, writer::create(settings.strategy, &master)).with_options(options);
    let report = service.run(&master, &CancellationToken::new())?;

    if output.is_json() {
        output.json(&GenerateSummary {
            root: &settings.root,
            strategy: settings.strategy,
            report: &report,
        })?;
    } else {
        render(&report, &settings, &output)?;
    }

    if report.is_success() {
        return Ok(());
    }
    Err(CliError::RunFailed {
        failed: report.errors.len().max(1),
        administrators: report.failed_administrators().map(String::from).collect(),
    })
}

fn render(report: &RunReport, settings: &TreeSettings, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Kiln generation ({})", settings.strategy))?;
    output.info(&format!(
        "{} of {} project(s) collected under {}",
        report.collected_projects,
        report.projects,
        settings.root.display()
    ))?;

    for admin in &report.administrators {
        let line = format!("{}: {}", admin.name, state_label(admin.state));
        if admin.state == AdministratorState::Failed {
            output.error(&line)?;
        } else {
            output.print(&format!("  {line}"))?;
        }
    }

    for error in &report.errors {
        output.error(&error.to_string())?;
    }
    if let Some(phase) = report.stopped_after {
        output.warning(&format!("Stopped after the {phase} phase (--fail-fast)"))?;
    }

    if report.is_success() {
        output.success(&format!("Wrote {} fragment(s)", report.fragments_written))?;
    }
    Ok(())
}

fn state_label(state: AdministratorState) -> &'static str {
    match state {
        AdministratorState::Uninitialized => "not started",
        AdministratorState::Initialized => "initialized",
        AdministratorState::Collected => "collected",
        AdministratorState::Generated => "generated",
        AdministratorState::Done => "done",
        AdministratorState::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::application::AdministratorOutcome;
    use uuid::Uuid;

    #[test]
    fn summary_flattens_the_report() {
        let mut report = RunReport::new(Uuid::nil(), 2);
        report.administrators.push(AdministratorOutcome {
            name: "tag-index".into(),
            state: AdministratorState::Done,
        });

        let value = serde_json::to_value(GenerateSummary {
            root: Path::new("/repo"),
            strategy: WriteStrategy::Single,
            report: &report,
        })
        .unwrap();

        assert_eq!(value["strategy"], "single");
        assert_eq!(value["projects"], 2);
        assert_eq!(value["administrators"][0]["state"], "done");
        assert!(value["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn every_state_has_a_label() {
        assert_eq!(state_label(AdministratorState::Failed), "failed");
        assert_eq!(state_label(AdministratorState::Uninitialized), "not started");
    }
}
