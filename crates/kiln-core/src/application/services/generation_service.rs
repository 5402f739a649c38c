//! Generation orchestrator.
//!
//! A run moves every registered administrator through
//! Initialize → Collect → Generate → Write. Collect and Generate fan out on
//! the rayon pool and join before the next phase starts. Component failures
//! are recorded in the [`RunReport`] and the run continues with whatever
//! survived, unless [`RunOptions::fail_fast`] is set.

use tracing::{error, info, instrument, warn};

use crate::{
    application::{
        AdministratorOutcome, AdministratorRegistry, AdministratorState, ApplicationError,
        CancellationToken, CodeFileWriter, Phase, RunReport,
        services::{CollectionEngine, GenerationEngine, finish_phase, isolated},
    },
    domain::{MasterEnvironment, ProjectEnvironment},
    error::KilnResult,
};

/// Per-run switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after the first phase that recorded an error.
    pub fail_fast: bool,
    /// Write each administrator's annotations into the common project.
    pub inject_annotations: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            inject_annotations: true,
        }
    }
}

/// Drives generation runs against one output writer.
pub struct GenerationService {
    registry: AdministratorRegistry,
    writer: Box<dyn CodeFileWriter>,
    options: RunOptions,
}

impl GenerationService {
    pub fn new(registry: AdministratorRegistry, writer: Box<dyn CodeFileWriter>) -> Self {
        Self {
            registry,
            writer,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &AdministratorRegistry {
        &self.registry
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Execute one generation run.
    ///
    /// Returns `Err` only when the run was cancelled; every other failure is
    /// listed in the report. No fragment outlives the call either way.
    #[instrument(
        skip_all,
        fields(run_id = %master.run_id(), projects = master.projects().len())
    )]
    pub fn run(
        &mut self,
        master: &MasterEnvironment,
        cancel: &CancellationToken,
    ) -> KilnResult<RunReport> {
        info!(administrators = self.registry.len(), "Starting generation run");

        let mut report = RunReport::new(master.run_id(), master.projects().len());
        for slot in self.registry.slots_mut() {
            slot.reset();
        }

        let outcome = self.run_phases(master, cancel, &mut report);
        master.dispose_fragments();

        report.collected_projects = master.collected_projects().count();
        report.administrators = self
            .registry
            .slots()
            .iter()
            .map(|slot| AdministratorOutcome {
                name: slot.name().to_string(),
                state: slot.state(),
            })
            .collect();
        report.pool = master.pool().stats();

        match outcome {
            Ok(()) => {
                info!(
                    fragments = report.fragments_written,
                    errors = report.errors.len(),
                    "Generation run finished"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "Generation run aborted");
                Err(e)
            }
        }
    }

    fn run_phases(
        &mut self,
        master: &MasterEnvironment,
        cancel: &CancellationToken,
        report: &mut RunReport,
    ) -> KilnResult<()> {
        ensure_running(cancel, Phase::Initialize)?;
        self.initialize(master, report);
        if self.stop_early(report, Phase::Initialize) {
            return Ok(());
        }

        ensure_running(cancel, Phase::Collect)?;
        let collection = CollectionEngine::new(master, cancel);
        report.extend_errors(collection.collect_projects());
        if self.stop_early(report, Phase::Collect) {
            return Ok(());
        }
        report.extend_errors(collection.collect_administrators(&mut self.registry));

        ensure_running(cancel, Phase::Generate)?;
        if self.stop_early(report, Phase::Collect) {
            return Ok(());
        }
        let generation = GenerationEngine::new(master, cancel, self.options.inject_annotations);
        report.extend_errors(generation.generate(&mut self.registry));

        ensure_running(cancel, Phase::Write)?;
        if self.stop_early(report, Phase::Generate) {
            return Ok(());
        }
        self.write_output(master, report);

        for slot in self.registry.slots_mut() {
            if slot.state() == AdministratorState::Generated {
                if let Some(e) = finish_phase(slot, Phase::Write, AdministratorState::Done, Ok(())) {
                    report.push_error(e);
                }
            }
        }
        Ok(())
    }

    /// Initialize runs sequentially: administrators only attach analyzers.
    #[instrument(skip_all)]
    fn initialize(&mut self, master: &MasterEnvironment, report: &mut RunReport) {
        for slot in self.registry.slots_mut() {
            let name = slot.name().to_string();
            let result = isolated(&name, Phase::Initialize, || {
                slot.administrator_mut().initialize(master)
            });
            if let Some(e) = finish_phase(slot, Phase::Initialize, AdministratorState::Initialized, result) {
                report.push_error(e);
            }
        }
    }

    fn stop_early(&self, report: &mut RunReport, phase: Phase) -> bool {
        if !self.options.fail_fast || report.errors.is_empty() {
            return false;
        }
        warn!(%phase, errors = report.errors.len(), "Fail-fast: stopping run");
        report.stopped_after = Some(phase);
        true
    }

    /// Drain every environment's fragments through the writer.
    ///
    /// Stale output of every scope is removed before anything is written, so
    /// a single shared target is never cleared after another scope wrote to it.
    #[instrument(skip_all)]
    fn write_output(&mut self, master: &MasterEnvironment, report: &mut RunReport) {
        let mut scoped: Vec<(&ProjectEnvironment, Box<dyn CodeFileWriter>)> = Vec::new();

        for env in master.environments() {
            let scope = master.output_scope(env);
            let prepared = self.writer.get_writer(&scope).and_then(|mut writer| {
                writer.delete_output()?;
                Ok(writer)
            });
            match prepared {
                Ok(writer) => scoped.push((env, writer)),
                Err(e) => {
                    error!(project = env.name(), error = %e, "Could not prepare output");
                    report.push_error(e);
                }
            }
        }

        for (env, mut writer) in scoped {
            let _entered = env.span().enter();

            match drain(env, writer.as_mut()) {
                Ok(written) => report.fragments_written += written,
                Err(e) => {
                    error!(error = %e, "Writing generated code failed, rolling back");
                    if let Err(cleanup) = writer.delete_output() {
                        warn!(error = %cleanup, "Rollback incomplete");
                    }
                    report.push_error(e);
                }
            }
            if let Err(e) = writer.dispose() {
                report.push_error(e);
            }
        }

        if let Err(e) = self.writer.dispose() {
            report.push_error(e);
        }
    }

    /// Remove the generated output of every environment.
    #[instrument(skip_all, fields(projects = master.projects().len()))]
    pub fn clean(&mut self, master: &MasterEnvironment) -> KilnResult<()> {
        for env in master.environments() {
            let mut writer = self.writer.get_writer(&master.output_scope(env))?;
            writer.delete_output()?;
            writer.dispose()?;
        }
        self.writer.delete_output()?;
        self.writer.dispose()?;
        info!("Generated output removed");
        Ok(())
    }
}

fn ensure_running(cancel: &CancellationToken, phase: Phase) -> KilnResult<()> {
    if cancel.is_cancelled() {
        return Err(ApplicationError::Cancelled { phase }.into());
    }
    Ok(())
}

fn drain(env: &ProjectEnvironment, writer: &mut dyn CodeFileWriter) -> KilnResult<usize> {
    let fragments = env.take_fragments();
    let count = fragments.len();
    for fragment in &fragments {
        writer.write_code_file(fragment.file_name_hint(), &fragment.text())?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::OutputScope;
    use crate::error::KilnError;

    mockall::mock! {
        Writer {}
        impl CodeFileWriter for Writer {
            fn get_writer(&self, scope: &OutputScope) -> KilnResult<Box<dyn CodeFileWriter>>;
            fn write_code_file(&mut self, file_name_hint: &str, text: &str) -> KilnResult<()>;
            fn delete_output(&mut self) -> KilnResult<()>;
            fn dispose(&mut self) -> KilnResult<()>;
        }
    }

    fn common_only() -> MasterEnvironment {
        MasterEnvironment::builder("/repo").build().unwrap()
    }

    #[test]
    fn failed_write_rolls_back_its_scope() {
        let master = common_only();
        master
            .common()
            .add_fragment(master.fragment("A.cs", "tags", "class A {}"));

        let mut scoped = MockWriter::new();
        scoped.expect_delete_output().times(2).returning(|| Ok(()));
        scoped.expect_write_code_file().times(1).returning(|hint, _| {
            Err(ApplicationError::OutputCollision {
                path: PathBuf::from(hint),
            }
            .into())
        });
        scoped.expect_dispose().times(1).returning(|| Ok(()));

        let mut root = MockWriter::new();
        root.expect_get_writer()
            .times(1)
            .return_once(move |_| Ok(Box::new(scoped)));
        root.expect_dispose().times(1).returning(|| Ok(()));

        let mut service = GenerationService::new(AdministratorRegistry::new(), Box::new(root));
        let report = service.run(&master, &CancellationToken::new()).unwrap();

        assert_eq!(report.fragments_written, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            report.errors[0],
            KilnError::Application(ApplicationError::OutputCollision { .. })
        ));
        assert_eq!(report.pool.outstanding, 0);
    }

    #[test]
    fn cancelled_before_start_touches_nothing() {
        let master = common_only();
        master
            .common()
            .add_fragment(master.fragment("A.cs", "tags", "class A {}"));

        let mut root = MockWriter::new();
        root.expect_get_writer().times(0);
        root.expect_dispose().times(0);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut service = GenerationService::new(AdministratorRegistry::new(), Box::new(root));
        let err = service.run(&master, &cancel).unwrap_err();

        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::Cancelled {
                phase: Phase::Initialize
            })
        ));
        assert_eq!(master.pending_fragments(), 0);
    }

    #[test]
    fn clean_deletes_every_scope() {
        let master = common_only();

        let mut scoped = MockWriter::new();
        scoped.expect_delete_output().times(1).returning(|| Ok(()));
        scoped.expect_dispose().times(1).returning(|| Ok(()));

        let mut root = MockWriter::new();
        root.expect_get_writer()
            .withf(|scope| scope.file_name() == "Generated.cs")
            .times(1)
            .return_once(move |_| Ok(Box::new(scoped)));
        root.expect_delete_output().times(1).returning(|| Ok(()));
        root.expect_dispose().times(1).returning(|| Ok(()));

        let mut service = GenerationService::new(AdministratorRegistry::new(), Box::new(root));
        service.clean(&master).unwrap();
    }
}
