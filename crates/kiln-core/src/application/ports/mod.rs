//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kiln-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `SymbolGraph`: Read-only symbols of one project
//!   - `CodeFileWriter`: Where generated text lands
//!
//! - **Plugin Port**: `Administrator`, implemented by generator plugins
//!   (see `crate::application::administrator`)

pub mod output;

pub use output::{CodeFileWriter, SymbolGraph};
