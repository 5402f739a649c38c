//! Collect phase.
//!
//! 1. Every project's symbols are collected in parallel, one worker per
//!    environment; a failing symbol graph only fails its own project.
//! 2. Every initialized administrator's collect runs in parallel.
//!
//! Both steps join before returning, which is the barrier Generate relies on.

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        AdministratorRegistry, AdministratorState, CancellationToken, Phase,
        services::{finish_phase, isolated},
    },
    domain::MasterEnvironment,
    error::KilnError,
};

pub struct CollectionEngine<'a> {
    master: &'a MasterEnvironment,
    cancel: &'a CancellationToken,
}

impl<'a> CollectionEngine<'a> {
    pub fn new(master: &'a MasterEnvironment, cancel: &'a CancellationToken) -> Self {
        Self { master, cancel }
    }

    /// Collect the symbols of every project. Returns one error per project
    /// that could not be collected.
    #[instrument(skip_all, fields(projects = self.master.projects().len()))]
    pub fn collect_projects(&self) -> Vec<KilnError> {
        let independent = self.master.independent_namespaces();

        let errors: Vec<KilnError> = self
            .master
            .projects()
            .par_iter()
            .filter_map(|env| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                match env.collect(independent) {
                    Ok(_) => None,
                    Err(e) => {
                        warn!(project = env.name(), error = %e, "Symbol collection failed");
                        Some(e.into())
                    }
                }
            })
            .collect();

        info!(
            collected = self.master.collected_projects().count(),
            failed = errors.len(),
            "Project symbols collected"
        );
        errors
    }

    /// Run `collect` on every initialized administrator.
    #[instrument(skip_all, fields(administrators = registry.len()))]
    pub fn collect_administrators(&self, registry: &mut AdministratorRegistry) -> Vec<KilnError> {
        let master = self.master;
        let cancel = self.cancel;

        registry
            .slots_mut()
            .par_iter_mut()
            .filter(|slot| slot.state() == AdministratorState::Initialized)
            .filter_map(|slot| {
                if cancel.is_cancelled() {
                    return None;
                }
                let name = slot.name().to_string();
                let result = isolated(&name, Phase::Collect, || {
                    slot.administrator_mut().collect(master, cancel)
                });
                finish_phase(slot, Phase::Collect, AdministratorState::Collected, result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::{NamespaceSymbol, SymbolGraph, TypeSymbol};
    use crate::error::KilnResult;

    mockall::mock! {
        Graph {}
        impl SymbolGraph for Graph {
            fn root_namespace(&self) -> KilnResult<Arc<NamespaceSymbol>>;
        }
    }

    fn healthy() -> Arc<dyn SymbolGraph> {
        let mut graph = MockGraph::new();
        graph.expect_root_namespace().times(1).returning(|| {
            Ok(Arc::new(
                NamespaceSymbol::root().with_type(TypeSymbol::new("Foo").with_attribute("Gen")),
            ))
        });
        Arc::new(graph)
    }

    fn failing() -> Arc<dyn SymbolGraph> {
        let mut graph = MockGraph::new();
        graph.expect_root_namespace().times(1).returning(|| {
            Err(KilnError::Internal {
                message: "unreadable".into(),
            })
        });
        Arc::new(graph)
    }

    #[test]
    fn failing_project_does_not_abort_siblings() {
        let master = MasterEnvironment::builder("/repo")
            .project("A", "/repo/A", healthy())
            .project("Broken", "/repo/Broken", failing())
            .project("C", "/repo/C", healthy())
            .build()
            .unwrap();
        let cancel = CancellationToken::new();

        let errors = CollectionEngine::new(&master, &cancel).collect_projects();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Broken"));
        let collected: Vec<_> = master.collected_projects().map(|(env, _)| env.name()).collect();
        assert_eq!(collected, ["A", "C"]);
    }

    #[test]
    fn cancelled_token_skips_collection() {
        let mut untouched = MockGraph::new();
        untouched.expect_root_namespace().times(0);

        let master = MasterEnvironment::builder("/repo")
            .project("A", "/repo/A", Arc::new(untouched))
            .build()
            .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let errors = CollectionEngine::new(&master, &cancel).collect_projects();
        assert!(errors.is_empty());
        assert_eq!(master.collected_projects().count(), 0);
    }
}
