//! Application services - orchestrate a generation run.
//!
//! The engines run one phase each; [`GenerationService`] strings the phases
//! together and drains the result through a writer.

pub mod collection;
pub mod generation;
pub mod generation_service;

pub use collection::CollectionEngine;
pub use generation::GenerationEngine;
pub use generation_service::{GenerationService, RunOptions};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::{
    application::{AdministratorSlot, AdministratorState, ApplicationError, Phase},
    error::{KilnError, KilnResult},
};

/// Run one administrator phase, turning both errors and panics into an
/// `ApplicationError::Administrator` naming the plugin.
pub(crate) fn isolated<F>(name: &str, phase: Phase, f: F) -> KilnResult<()>
where
    F: FnOnce() -> KilnResult<()>,
{
    let reason = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    Err(ApplicationError::Administrator {
        name: name.to_string(),
        phase,
        reason,
    }
    .into())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}

/// Move `slot` to `next` on success, or park it in `Failed`.
pub(crate) fn finish_phase(
    slot: &mut AdministratorSlot,
    phase: Phase,
    next: AdministratorState,
    result: KilnResult<()>,
) -> Option<KilnError> {
    match result.and_then(|()| slot.advance(next).map_err(KilnError::from)) {
        Ok(()) => None,
        Err(e) => {
            error!(administrator = slot.name(), %phase, error = %e, "Administrator failed");
            slot.fail();
            Some(e)
        }
    }
}
