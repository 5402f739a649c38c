//! One output file per generated unit.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use kiln_core::{
    application::{ApplicationError, CodeFileWriter},
    domain::{GENERATED_FOOTER, GENERATED_HEADER, OutputScope},
    error::{KilnError, KilnResult},
};

use super::{map_io_error, remove_dir_if_empty, remove_file_if_exists, root_writer_error};

/// Writes every unit to `<project>/<suffix>/<hint>`, each file framed by its
/// own header and footer.
///
/// Two units resolving to the same file within one scope are an
/// [`ApplicationError::OutputCollision`]; the first file is never overwritten.
#[derive(Debug)]
pub struct SeparateFilesWriter {
    extension: String,
    directory: Option<PathBuf>,
    written: BTreeSet<String>,
}

impl SeparateFilesWriter {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            directory: None,
            written: BTreeSet::new(),
        }
    }

    /// Files written through this writer since it was created.
    pub fn written(&self) -> impl Iterator<Item = &str> {
        self.written.iter().map(String::as_str)
    }

    fn file_name(hint: &str) -> KilnResult<&str> {
        Path::new(hint)
            .file_name()
            .and_then(OsStr::to_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| KilnError::Internal {
                message: format!("file name hint '{hint}' does not name a file"),
            })
    }

    fn owns(&self, path: &Path) -> bool {
        path.is_file() && path.extension() == Some(OsStr::new(&self.extension))
    }
}

impl CodeFileWriter for SeparateFilesWriter {
    fn get_writer(&self, scope: &OutputScope) -> KilnResult<Box<dyn CodeFileWriter>> {
        Ok(Box::new(Self {
            extension: self.extension.clone(),
            directory: Some(scope.directory().to_path_buf()),
            written: BTreeSet::new(),
        }))
    }

    fn write_code_file(&mut self, file_name_hint: &str, text: &str) -> KilnResult<()> {
        let Some(directory) = self.directory.as_ref() else {
            return Err(root_writer_error("separate-files"));
        };
        let name = Self::file_name(file_name_hint)?;
        let path = directory.join(name);

        if !self.written.insert(name.to_string()) {
            warn!(file = %path.display(), "Two units resolved to the same file");
            return Err(ApplicationError::OutputCollision { path }.into());
        }

        fs::create_dir_all(directory).map_err(|e| map_io_error(directory, e, "create directory"))?;

        let mut content =
            String::with_capacity(GENERATED_HEADER.len() + text.len() + GENERATED_FOOTER.len() + 1);
        content.push_str(GENERATED_HEADER);
        content.push_str(text);
        if !text.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(GENERATED_FOOTER);

        fs::write(&path, content).map_err(|e| map_io_error(&path, e, "write file"))?;
        debug!(file = %path.display(), "Wrote generated file");
        Ok(())
    }

    /// Remove every file this writer wrote, then every other file with the
    /// output extension left in the scope directory, then the directory
    /// itself if nothing else is left in it.
    #[instrument(skip(self), fields(dir = ?self.directory))]
    fn delete_output(&mut self) -> KilnResult<()> {
        let written = std::mem::take(&mut self.written);

        let Some(directory) = self.directory.as_ref() else {
            return Ok(());
        };
        for name in &written {
            remove_file_if_exists(&directory.join(name))?;
        }
        if !directory.is_dir() {
            return Ok(());
        }

        let entries =
            fs::read_dir(directory).map_err(|e| map_io_error(directory, e, "read directory"))?;
        for entry in entries {
            let path = entry
                .map_err(|e| map_io_error(directory, e, "read directory entry"))?
                .path();
            if self.owns(&path) {
                remove_file_if_exists(&path)?;
            }
        }

        remove_dir_if_empty(directory);
        Ok(())
    }

    /// Files are closed as soon as they are written.
    fn dispose(&mut self) -> KilnResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scoped(temp: &TempDir) -> (OutputScope, Box<dyn CodeFileWriter>) {
        let scope = OutputScope::new(temp.path().join("App/Generated"), "Generated.cs");
        let writer = SeparateFilesWriter::new("cs").get_writer(&scope).unwrap();
        (scope, writer)
    }

    #[test]
    fn each_unit_is_its_own_framed_file() {
        let temp = TempDir::new().unwrap();
        let (scope, mut writer) = scoped(&temp);

        writer.write_code_file("Foo.cs", "class Foo {}").unwrap();
        writer.write_code_file("Bar.cs", "class Bar {}\n").unwrap();
        writer.dispose().unwrap();

        let foo = fs::read_to_string(scope.directory().join("Foo.cs")).unwrap();
        assert_eq!(foo, format!("{GENERATED_HEADER}class Foo {{}}\n{GENERATED_FOOTER}"));
        assert!(scope.directory().join("Bar.cs").exists());
    }

    #[test]
    fn duplicate_hint_is_a_collision() {
        let temp = TempDir::new().unwrap();
        let (scope, mut writer) = scoped(&temp);

        writer.write_code_file("Foo.cs", "first").unwrap();
        let err = writer.write_code_file("Foo.cs", "second").unwrap_err();

        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::OutputCollision { .. })
        ));
        let foo = fs::read_to_string(scope.directory().join("Foo.cs")).unwrap();
        assert!(foo.contains("first"));
        assert!(!foo.contains("second"));
    }

    #[test]
    fn hints_cannot_escape_the_scope() {
        let temp = TempDir::new().unwrap();
        let (scope, mut writer) = scoped(&temp);

        writer.write_code_file("../../Evil.cs", "x").unwrap();

        assert!(scope.directory().join("Evil.cs").exists());
        assert!(!temp.path().join("Evil.cs").exists());
    }

    #[test]
    fn delete_output_keeps_foreign_files() {
        let temp = TempDir::new().unwrap();
        let (scope, mut writer) = scoped(&temp);

        writer.write_code_file("Foo.cs", "x").unwrap();
        fs::write(scope.directory().join("notes.txt"), "keep").unwrap();
        writer.delete_output().unwrap();

        assert!(!scope.directory().join("Foo.cs").exists());
        assert!(scope.directory().join("notes.txt").exists());

        // A cleared writer may write the same unit again.
        writer.write_code_file("Foo.cs", "y").unwrap();
    }

    #[test]
    fn delete_output_removes_units_with_other_extensions() {
        let temp = TempDir::new().unwrap();
        let (scope, mut writer) = scoped(&temp);

        writer.write_code_file("Notes.json", "{}").unwrap();
        writer.write_code_file("Same.cs", "first").unwrap();
        assert!(writer.write_code_file("Same.cs", "second").is_err());
        writer.delete_output().unwrap();

        assert!(!scope.directory().join("Notes.json").exists());
        assert!(!scope.directory().join("Same.cs").exists());
        assert!(!scope.directory().exists());
    }
}
