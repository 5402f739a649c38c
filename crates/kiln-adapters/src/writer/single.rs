//! Every project funnels into one physical file.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument};

use kiln_core::{application::CodeFileWriter, domain::OutputScope, error::KilnResult};

use super::target::FileTarget;

/// Writes every unit of every project into one file.
///
/// Scoped writers are handles onto the root's target: units from all scopes
/// land in the same file, under one header. Only disposing the root writes
/// the footer. Deleting through any handle removes the shared file.
#[derive(Debug)]
pub struct SingleFileWriter {
    target: Arc<Mutex<FileTarget>>,
    is_root: bool,
}

impl SingleFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            target: Arc::new(Mutex::new(FileTarget::new(path))),
            is_root: true,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.target.lock().path().to_path_buf()
    }
}

impl CodeFileWriter for SingleFileWriter {
    fn get_writer(&self, scope: &OutputScope) -> KilnResult<Box<dyn CodeFileWriter>> {
        debug!(scope = %scope.directory().display(), "Sharing single output file");
        Ok(Box::new(Self {
            target: Arc::clone(&self.target),
            is_root: false,
        }))
    }

    fn write_code_file(&mut self, file_name_hint: &str, text: &str) -> KilnResult<()> {
        self.target.lock().write_unit(file_name_hint, text)
    }

    #[instrument(skip(self))]
    fn delete_output(&mut self) -> KilnResult<()> {
        self.target.lock().delete()
    }

    fn dispose(&mut self) -> KilnResult<()> {
        if !self.is_root {
            return Ok(());
        }
        self.target.lock().close()
    }
}
