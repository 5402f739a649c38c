//! One output file per project.

use tracing::instrument;

use kiln_core::{application::CodeFileWriter, domain::OutputScope, error::KilnResult};

use super::{root_writer_error, target::FileTarget};

/// Writes each project's units into `<project>/<suffix>/<suffix>.<ext>`.
///
/// The root writer only hands out scoped writers; each scoped writer owns its
/// file, opened on the first unit.
#[derive(Debug, Default)]
pub struct OneFilePerProjectWriter {
    target: Option<FileTarget>,
}

impl OneFilePerProjectWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeFileWriter for OneFilePerProjectWriter {
    fn get_writer(&self, scope: &OutputScope) -> KilnResult<Box<dyn CodeFileWriter>> {
        Ok(Box::new(Self {
            target: Some(FileTarget::new(scope.file_path())),
        }))
    }

    fn write_code_file(&mut self, file_name_hint: &str, text: &str) -> KilnResult<()> {
        match self.target.as_mut() {
            Some(target) => target.write_unit(file_name_hint, text),
            None => Err(root_writer_error("per-project")),
        }
    }

    #[instrument(skip(self))]
    fn delete_output(&mut self) -> KilnResult<()> {
        match self.target.as_mut() {
            Some(target) => target.delete(),
            None => Ok(()),
        }
    }

    fn dispose(&mut self) -> KilnResult<()> {
        match self.target.as_mut() {
            Some(target) => target.close(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::domain::{GENERATED_FOOTER, GENERATED_HEADER};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn each_scope_gets_its_own_file() {
        let temp = TempDir::new().unwrap();
        let root = OneFilePerProjectWriter::new();

        for project in ["App", "Lib"] {
            let scope = OutputScope::new(temp.path().join(project).join("Generated"), "Generated.cs");
            let mut writer = root.get_writer(&scope).unwrap();
            writer
                .write_code_file("Foo.cs", &format!("class {project}Foo {{}}"))
                .unwrap();
            writer.dispose().unwrap();
        }

        let app = fs::read_to_string(temp.path().join("App/Generated/Generated.cs")).unwrap();
        assert!(app.starts_with(GENERATED_HEADER));
        assert!(app.ends_with(GENERATED_FOOTER));
        assert!(app.contains("// Foo.cs\nclass AppFoo {}\n"));
        assert!(!app.contains("LibFoo"));
    }

    #[test]
    fn root_writer_refuses_units() {
        let mut root = OneFilePerProjectWriter::new();
        assert!(root.write_code_file("A.cs", "x").is_err());
        root.delete_output().unwrap();
        root.dispose().unwrap();
    }

    #[test]
    fn dispose_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let scope = OutputScope::new(temp.path().join("Generated"), "Generated.cs");
        let mut writer = OneFilePerProjectWriter::new().get_writer(&scope).unwrap();

        writer.write_code_file("A.cs", "class A {}").unwrap();
        writer.dispose().unwrap();
        writer.dispose().unwrap();

        let content = fs::read_to_string(scope.file_path()).unwrap();
        assert_eq!(content.matches(GENERATED_FOOTER).count(), 1);
    }
}
