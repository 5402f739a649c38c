//! One physical output file holding any number of generated units.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use kiln_core::{
    domain::{GENERATED_FOOTER, GENERATED_HEADER},
    error::KilnResult,
};

use super::{map_io_error, remove_dir_if_empty, remove_file_if_exists};

/// Opened lazily on the first unit; the header goes in on open and the
/// footer on [`close`](Self::close).
#[derive(Debug)]
pub(crate) struct FileTarget {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl FileTarget {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Append `// <hint>` followed by `text`.
    pub(crate) fn write_unit(&mut self, file_name_hint: &str, text: &str) -> KilnResult<()> {
        let path = self.path.clone();
        let file = self.open()?;

        let mut unit = String::with_capacity(file_name_hint.len() + text.len() + 8);
        unit.push_str("// ");
        unit.push_str(file_name_hint);
        unit.push('\n');
        unit.push_str(text);
        if !text.ends_with('\n') {
            unit.push('\n');
        }

        file.write_all(unit.as_bytes())
            .map_err(|e| map_io_error(&path, e, "write generated code"))?;
        trace!(file = %path.display(), hint = file_name_hint, "Wrote unit");
        Ok(())
    }

    fn open(&mut self) -> KilnResult<&mut BufWriter<File>> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| map_io_error(parent, e, "create directory"))?;
                }
                let file = File::create(&self.path)
                    .map_err(|e| map_io_error(&self.path, e, "create file"))?;
                let mut file = BufWriter::new(file);
                file.write_all(GENERATED_HEADER.as_bytes())
                    .map_err(|e| map_io_error(&self.path, e, "write header"))?;
                debug!(file = %self.path.display(), "Opened output file");
                file
            }
        };

        Ok(self.file.insert(file))
    }

    /// Write the footer and flush. No-op when nothing was written.
    pub(crate) fn close(&mut self) -> KilnResult<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };

        file.write_all(GENERATED_FOOTER.as_bytes())
            .map_err(|e| map_io_error(&self.path, e, "write footer"))?;
        file.flush()
            .map_err(|e| map_io_error(&self.path, e, "flush"))?;
        debug!(file = %self.path.display(), "Closed output file");
        Ok(())
    }

    /// Drop any open handle without a footer and remove the file.
    pub(crate) fn delete(&mut self) -> KilnResult<()> {
        self.file = None;
        remove_file_if_exists(&self.path)?;
        if let Some(parent) = self.path.parent() {
            remove_dir_if_empty(parent);
        }
        Ok(())
    }
}
