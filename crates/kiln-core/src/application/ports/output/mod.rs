//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use crate::domain::OutputScope;
use crate::error::KilnResult;

pub use crate::domain::symbols::SymbolGraph;

/// Port for committing generated code to storage.
///
/// Implemented by:
/// - `kiln_adapters::writer::SingleFileWriter` (one combined file)
/// - `kiln_adapters::writer::OneFilePerProjectWriter` (one file per project)
/// - `kiln_adapters::writer::SeparateFilesWriter` (one file per unit)
///
/// ## Design Notes
///
/// - The file name hint is advisory; the strategy picks the real file
/// - Every physical file starts with `GENERATED_HEADER` and ends with
///   `GENERATED_FOOTER`
/// - `dispose` is idempotent and writes the footer at most once
/// - Unit text is written verbatim, except that a newline is appended when
///   it does not already end in one, so the next hint line or the footer
///   always starts on its own line
pub trait CodeFileWriter: Send {
    /// Writer for one project's output location. Shared-target strategies
    /// return a handle onto their own target; the others a fresh writer.
    fn get_writer(&self, scope: &OutputScope) -> KilnResult<Box<dyn CodeFileWriter>>;

    /// Write one generated unit.
    fn write_code_file(&mut self, file_name_hint: &str, text: &str) -> KilnResult<()>;

    /// Remove everything this writer wrote, or would have written.
    fn delete_output(&mut self) -> KilnResult<()>;

    /// Flush and close, writing the footer of any open file.
    fn dispose(&mut self) -> KilnResult<()>;
}
