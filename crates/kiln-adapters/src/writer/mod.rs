//! File writer adapters.
//!
//! Three strategies implement [`CodeFileWriter`]:
//! - [`SingleFileWriter`]: every project funnels into one file
//! - [`OneFilePerProjectWriter`]: one file per project
//! - [`SeparateFilesWriter`]: one file per generated unit

mod per_project;
mod separate;
mod single;
mod target;

pub use per_project::OneFilePerProjectWriter;
pub use separate::SeparateFilesWriter;
pub use single::SingleFileWriter;

use std::io;
use std::path::Path;

use kiln_core::{
    application::{ApplicationError, CodeFileWriter},
    domain::{MasterEnvironment, WriteStrategy},
    error::KilnError,
};

/// Build the root writer for `strategy`.
///
/// The single-file target is the common project's output scope.
pub fn create(strategy: WriteStrategy, master: &MasterEnvironment) -> Box<dyn CodeFileWriter> {
    match strategy {
        WriteStrategy::Single => Box::new(SingleFileWriter::new(
            master.output_scope(master.common()).file_path(),
        )),
        WriteStrategy::PerProject => Box::new(OneFilePerProjectWriter::new()),
        WriteStrategy::Separate => Box::new(SeparateFilesWriter::new(master.file_extension())),
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> KilnError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

/// Remove `path`, treating a missing file as already removed.
fn remove_file_if_exists(path: &Path) -> Result<(), KilnError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(map_io_error(path, e, "remove file")),
    }
}

/// Remove `dir` if it exists and is empty.
fn remove_dir_if_empty(dir: &Path) {
    if std::fs::remove_dir(dir).is_ok() {
        tracing::debug!(dir = %dir.display(), "Removed empty output directory");
    }
}

fn root_writer_error(strategy: &str) -> KilnError {
    KilnError::Internal {
        message: format!("{strategy} root writer cannot write without a scope"),
    }
}
