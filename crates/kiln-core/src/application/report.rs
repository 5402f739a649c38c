use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::{
    application::{AdministratorState, Phase},
    domain::BufferPoolStats,
    error::KilnError,
};

/// Final state of one administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdministratorOutcome {
    pub name: String,
    pub state: AdministratorState,
}

/// Outcome of one generation run.
///
/// Component failures do not abort a run; they are gathered here so a
/// single run reports every problem it found.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub projects: usize,
    pub collected_projects: usize,
    pub administrators: Vec<AdministratorOutcome>,
    pub fragments_written: usize,
    pub pool: BufferPoolStats,
    /// Set when fail-fast stopped the run after this phase.
    pub stopped_after: Option<Phase>,
    #[serde(serialize_with = "error_messages")]
    pub errors: Vec<KilnError>,
}

impl RunReport {
    pub fn new(run_id: Uuid, projects: usize) -> Self {
        Self {
            run_id,
            projects,
            collected_projects: 0,
            administrators: Vec::new(),
            fragments_written: 0,
            pool: BufferPoolStats::default(),
            stopped_after: None,
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, error: impl Into<KilnError>) {
        self.errors.push(error.into());
    }

    pub fn extend_errors(&mut self, errors: impl IntoIterator<Item = KilnError>) {
        self.errors.extend(errors);
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.stopped_after.is_none()
    }

    pub fn failed_administrators(&self) -> impl Iterator<Item = &str> {
        self.administrators
            .iter()
            .filter(|a| a.state == AdministratorState::Failed)
            .map(|a| a.name.as_str())
    }
}

fn error_messages<S: Serializer>(errors: &[KilnError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}
