//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Administrators**: The plugin protocol and its registry
//! - **Services**: Phase engines and the run orchestrator
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer; symbol and fragment
//! rules live in `crate::domain`.

pub mod administrator;
pub mod cancellation;
pub mod error;
pub mod ports;
pub mod report;
pub mod services;

pub use administrator::{Administrator, AdministratorRegistry, AdministratorSlot, AdministratorState};
pub use cancellation::CancellationToken;
pub use report::{AdministratorOutcome, RunReport};

// Re-export main services
pub use services::{CollectionEngine, GenerationEngine, GenerationService, RunOptions};

// Re-export port traits (for adapter implementation)
pub use ports::{CodeFileWriter, SymbolGraph};

pub use error::{ApplicationError, Phase};
