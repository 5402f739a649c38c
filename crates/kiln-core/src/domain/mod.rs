//! Core domain layer for Kiln.
//!
//! Pure data and rules: the symbol model, project environments, fragments
//! and their buffer pool, and the per-run master environment. No filesystem
//! access happens here; the only I/O seam is the [`SymbolGraph`] trait,
//! implemented outside the core.

pub mod buffer_pool;
pub mod environment;
pub mod error;
pub mod fragment;
pub mod master;
pub mod output;
pub mod symbols;

// Re-exports for convenience
pub use buffer_pool::{BufferPool, BufferPoolStats, PooledBuffer};
pub use environment::{COMMON_PROJECT_NAME, CollectedSymbols, ProjectEnvironment};
pub use error::{DomainError, ErrorCategory};
pub use fragment::{CodeFragment, FragmentBytes};
pub use master::{
    DEFAULT_COMMON_NAMESPACE, DEFAULT_FILE_EXTENSION, DEFAULT_GENERATED_SUFFIX, MasterEnvironment,
    MasterEnvironmentBuilder,
};
pub use output::{GENERATED_FOOTER, GENERATED_HEADER, OutputScope, WriteStrategy};
pub use symbols::{MethodSymbol, NamespaceSymbol, Symbol, SymbolGraph, Tag, TypeSymbol};
