//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Kiln
//! source generation host, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! │     (Discovers projects, runs plugins)  │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (GenerationService, Collection/        │
//! │   GenerationEngine, Administrators)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Driven: SymbolGraph, Writer)       │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      kiln-adapters (Infrastructure)     │
//! │  (ManifestGraph, writers, tag-index)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Symbols, Environments, Fragments, Pool)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kiln_core::prelude::*;
//!
//! # fn demo(graph: std::sync::Arc<dyn SymbolGraph>, writer: Box<dyn CodeFileWriter>,
//! #         plugin: Box<dyn Administrator>) -> KilnResult<()> {
//! // 1. Describe the run
//! let master = MasterEnvironment::builder("./repo")
//!     .project("App", "./repo/App", graph)
//!     .build()?;
//!
//! // 2. Register plugins and run
//! let registry = AdministratorRegistry::new().with(plugin)?;
//! let mut service = GenerationService::new(registry, writer);
//! let report = service.run(&master, &CancellationToken::new())?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Administrator, AdministratorRegistry, AdministratorState, CancellationToken,
        CodeFileWriter, GenerationService, Phase, RunOptions, RunReport, SymbolGraph,
    };
    pub use crate::domain::{
        CodeFragment, CollectedSymbols, MasterEnvironment, MethodSymbol, NamespaceSymbol,
        OutputScope, ProjectEnvironment, Tag, TypeSymbol, WriteStrategy,
    };
    pub use crate::error::{KilnError, KilnResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
