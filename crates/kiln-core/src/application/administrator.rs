//! Plugin entry points and the registry that drives them.
//!
//! Every generator plugin registers exactly one [`Administrator`]. The
//! orchestrator moves each one through
//! `Uninitialized → Initialized → Collected → Generated → Done`; an error in
//! any phase parks it in `Failed` without affecting the others.

use std::fmt;

use serde::Serialize;

use crate::{
    application::{ApplicationError, CancellationToken},
    domain::{DomainError, MasterEnvironment},
    error::KilnResult,
};

/// A generator plugin's entry point.
///
/// Administrators hold no state between runs. They borrow the run's
/// [`MasterEnvironment`] and never keep references past a phase call.
pub trait Administrator: Send + Sync {
    /// Stable plugin identity, used in logs, errors and fragment ordering.
    fn name(&self) -> &str;

    /// Attach analyzers. Called once per run, before any symbol is collected.
    fn initialize(&mut self, _master: &MasterEnvironment) -> KilnResult<()> {
        Ok(())
    }

    /// Analyze the collected symbols. Every administrator's collect has
    /// returned before any generate starts.
    fn collect(&mut self, master: &MasterEnvironment, cancel: &CancellationToken) -> KilnResult<()>;

    /// Add fragments to the environments. May run alongside other
    /// administrators' generate calls.
    fn generate(&self, master: &MasterEnvironment, cancel: &CancellationToken) -> KilnResult<()>;

    /// Declarations this plugin's generated code relies on, injected into the
    /// common pseudo-project. Empty when there are none.
    fn annotations(&self) -> &'static str {
        ""
    }
}

/// Lifecycle of an administrator within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministratorState {
    Uninitialized,
    Initialized,
    Collected,
    Generated,
    Done,
    Failed,
}

impl AdministratorState {
    /// Whether the orchestrator may move from `self` to `next`.
    pub fn can_advance_to(self, next: Self) -> bool {
        use AdministratorState::*;

        matches!(
            (self, next),
            (Uninitialized, Initialized)
                | (Initialized, Collected)
                | (Collected, Generated)
                | (Generated, Done)
                | (Uninitialized | Initialized | Collected | Generated, Failed)
        )
    }
}

impl fmt::Display for AdministratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Collected => "collected",
            Self::Generated => "generated",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A registered administrator and where it is in the protocol.
pub struct AdministratorSlot {
    administrator: Box<dyn Administrator>,
    state: AdministratorState,
}

impl AdministratorSlot {
    fn new(administrator: Box<dyn Administrator>) -> Self {
        Self {
            administrator,
            state: AdministratorState::Uninitialized,
        }
    }

    pub fn name(&self) -> &str {
        self.administrator.name()
    }

    pub fn state(&self) -> AdministratorState {
        self.state
    }

    pub fn administrator(&self) -> &dyn Administrator {
        self.administrator.as_ref()
    }

    pub(crate) fn administrator_mut(&mut self) -> &mut dyn Administrator {
        self.administrator.as_mut()
    }

    pub(crate) fn advance(&mut self, next: AdministratorState) -> Result<(), DomainError> {
        if !self.state.can_advance_to(next) {
            return Err(DomainError::InvalidTransition {
                administrator: self.name().to_string(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    pub(crate) fn fail(&mut self) {
        self.state = AdministratorState::Failed;
    }

    /// Reset for a new run.
    pub(crate) fn reset(&mut self) {
        self.state = AdministratorState::Uninitialized;
    }
}

impl fmt::Debug for AdministratorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdministratorSlot")
            .field("name", &self.name())
            .field("state", &self.state)
            .finish()
    }
}

/// Explicit list of the plugins taking part in a run.
#[derive(Debug, Default)]
pub struct AdministratorRegistry {
    slots: Vec<AdministratorSlot>,
}

impl AdministratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin's administrator. Names must be unique.
    pub fn register(&mut self, administrator: Box<dyn Administrator>) -> KilnResult<()> {
        if self.slots.iter().any(|s| s.name() == administrator.name()) {
            return Err(ApplicationError::DuplicateAdministrator {
                name: administrator.name().to_string(),
            }
            .into());
        }
        self.slots.push(AdministratorSlot::new(administrator));
        Ok(())
    }

    pub fn with(mut self, administrator: Box<dyn Administrator>) -> KilnResult<Self> {
        self.register(administrator)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(AdministratorSlot::name).collect()
    }

    pub fn state(&self, name: &str) -> Option<AdministratorState> {
        self.slots.iter().find(|s| s.name() == name).map(|s| s.state())
    }

    pub fn slots(&self) -> &[AdministratorSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [AdministratorSlot] {
        &mut self.slots
    }

    pub fn any_failed(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.state() == AdministratorState::Failed)
    }
}
