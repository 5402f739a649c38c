//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod discovery;
pub mod graph;
pub mod plugins;
pub mod writer;

// Re-export commonly used adapters
pub use discovery::{DEFAULT_MANIFEST_NAME, DEFAULT_MAX_DEPTH, DiscoveredProject, ProjectDiscovery};
pub use graph::{ManifestGraph, StaticGraph};
pub use plugins::{BUILTIN as BUILTIN_PLUGINS, TagIndexAdministrator};
pub use writer::{OneFilePerProjectWriter, SeparateFilesWriter, SingleFileWriter};
