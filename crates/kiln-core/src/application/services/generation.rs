//! Generate phase.
//!
//! Runs every collected administrator's `generate` in parallel. Generate only
//! starts once [`CollectionEngine`](super::CollectionEngine) has joined, so
//! every administrator sees the complete analysis of every other one.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    application::{
        Administrator, AdministratorRegistry, AdministratorState, CancellationToken, Phase,
        services::{finish_phase, isolated},
    },
    domain::MasterEnvironment,
    error::KilnError,
};

pub struct GenerationEngine<'a> {
    master: &'a MasterEnvironment,
    cancel: &'a CancellationToken,
    inject_annotations: bool,
}

impl<'a> GenerationEngine<'a> {
    pub fn new(
        master: &'a MasterEnvironment,
        cancel: &'a CancellationToken,
        inject_annotations: bool,
    ) -> Self {
        Self {
            master,
            cancel,
            inject_annotations,
        }
    }

    #[instrument(skip_all, fields(administrators = registry.len()))]
    pub fn generate(&self, registry: &mut AdministratorRegistry) -> Vec<KilnError> {
        registry
            .slots_mut()
            .par_iter_mut()
            .filter(|slot| slot.state() == AdministratorState::Collected)
            .filter_map(|slot| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let name = slot.name().to_string();
                let result = isolated(&name, Phase::Generate, || {
                    let administrator = slot.administrator();
                    administrator.generate(self.master, self.cancel)?;
                    if self.inject_annotations {
                        self.inject(administrator);
                    }
                    Ok(())
                });
                finish_phase(slot, Phase::Generate, AdministratorState::Generated, result)
            })
            .collect()
    }

    /// Add the administrator's annotation declarations to the common project.
    fn inject(&self, administrator: &dyn Administrator) {
        let annotations = administrator.annotations();
        if annotations.is_empty() {
            return;
        }

        let hint = self
            .master
            .file_name(&format!("{}Annotations", pascal_case(administrator.name())));
        debug!(administrator = administrator.name(), file = %hint, "Injecting annotations");
        self.master.common().add_fragment(self.master.fragment(
            hint,
            administrator.name(),
            annotations,
        ));
    }
}

/// `tag-index` -> `TagIndex`
fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
