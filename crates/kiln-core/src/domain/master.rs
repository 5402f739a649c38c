//! The per-run context: the project tree and everything shared by it.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    buffer_pool::BufferPool,
    environment::{COMMON_PROJECT_NAME, CollectedSymbols, ProjectEnvironment},
    error::DomainError,
    fragment::CodeFragment,
    output::OutputScope,
    symbols::SymbolGraph,
};

pub const DEFAULT_GENERATED_SUFFIX: &str = "Generated";
pub const DEFAULT_FILE_EXTENSION: &str = "cs";
pub const DEFAULT_COMMON_NAMESPACE: &str = "Common";

/// Context shared by every component of one generation run.
///
/// Built before Collect, dropped after the write phase. It is passed by
/// reference; there is no process-wide instance.
#[derive(Debug)]
pub struct MasterEnvironment {
    run_id: Uuid,
    root_directory: PathBuf,
    generated_suffix: String,
    file_extension: String,
    independent_namespaces: BTreeSet<String>,
    common: ProjectEnvironment,
    projects: Vec<ProjectEnvironment>,
    pool: Arc<BufferPool>,
}

impl MasterEnvironment {
    pub fn builder(root_directory: impl Into<PathBuf>) -> MasterEnvironmentBuilder {
        MasterEnvironmentBuilder::new(root_directory)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn generated_suffix(&self) -> &str {
        &self.generated_suffix
    }

    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    pub fn independent_namespaces(&self) -> &BTreeSet<String> {
        &self.independent_namespaces
    }

    /// The common pseudo-project.
    pub fn common(&self) -> &ProjectEnvironment {
        &self.common
    }

    /// Discovered projects, in discovery order.
    pub fn projects(&self) -> &[ProjectEnvironment] {
        &self.projects
    }

    /// Common pseudo-project first, then every project.
    pub fn environments(&self) -> impl Iterator<Item = &ProjectEnvironment> {
        std::iter::once(&self.common).chain(self.projects.iter())
    }

    /// Projects whose collect succeeded, paired with their symbols.
    pub fn collected_projects(
        &self,
    ) -> impl Iterator<Item = (&ProjectEnvironment, &CollectedSymbols)> {
        self.projects
            .iter()
            .filter_map(|env| env.symbols().map(|symbols| (env, symbols)))
    }

    pub fn project(&self, name: &str) -> Option<&ProjectEnvironment> {
        self.projects.iter().find(|env| env.name() == name)
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Build a fragment backed by a pooled buffer.
    pub fn fragment(
        &self,
        file_name_hint: impl Into<String>,
        administrator: impl Into<String>,
        text: &str,
    ) -> CodeFragment {
        CodeFragment::pooled(&self.pool, file_name_hint, administrator, text)
    }

    /// File name a generator should use for a unit called `stem`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.file_extension)
    }

    /// Output location of an environment: `<dir>/<suffix>/<suffix>.<ext>`.
    pub fn output_scope(&self, env: &ProjectEnvironment) -> OutputScope {
        OutputScope::new(
            env.directory().join(&self.generated_suffix),
            self.file_name(&self.generated_suffix),
        )
    }

    pub fn pending_fragments(&self) -> usize {
        self.environments().map(ProjectEnvironment::fragment_count).sum()
    }

    /// Release every pending fragment in every environment.
    pub fn dispose_fragments(&self) {
        for env in self.environments() {
            env.dispose_fragments();
        }
    }
}

struct ProjectEntry {
    name: String,
    directory: PathBuf,
    generated_namespace: Option<String>,
    source: Arc<dyn SymbolGraph>,
}

/// Builder for [`MasterEnvironment`].
pub struct MasterEnvironmentBuilder {
    root_directory: PathBuf,
    generated_suffix: String,
    file_extension: String,
    common_namespace: String,
    independent_namespaces: BTreeSet<String>,
    projects: Vec<ProjectEntry>,
    pool: Option<Arc<BufferPool>>,
}

impl MasterEnvironmentBuilder {
    fn new(root_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            generated_suffix: DEFAULT_GENERATED_SUFFIX.into(),
            file_extension: DEFAULT_FILE_EXTENSION.into(),
            common_namespace: DEFAULT_COMMON_NAMESPACE.into(),
            independent_namespaces: BTreeSet::new(),
            projects: Vec::new(),
            pool: None,
        }
    }

    pub fn generated_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.generated_suffix = suffix.into();
        self
    }

    pub fn file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    pub fn common_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.common_namespace = namespace.into();
        self
    }

    pub fn independent_namespace(mut self, name: impl Into<String>) -> Self {
        self.independent_namespaces.insert(name.into());
        self
    }

    pub fn independent_namespaces<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.independent_namespaces
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a project. Its generated namespace defaults to `<name>.<suffix>`.
    pub fn project(
        mut self,
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        source: Arc<dyn SymbolGraph>,
    ) -> Self {
        self.projects.push(ProjectEntry {
            name: name.into(),
            directory: directory.into(),
            generated_namespace: None,
            source,
        });
        self
    }

    pub fn project_with_namespace(
        mut self,
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        generated_namespace: impl Into<String>,
        source: Arc<dyn SymbolGraph>,
    ) -> Self {
        self.projects.push(ProjectEntry {
            name: name.into(),
            directory: directory.into(),
            generated_namespace: Some(generated_namespace.into()),
            source,
        });
        self
    }

    pub fn pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn build(self) -> Result<MasterEnvironment, DomainError> {
        if self.generated_suffix.trim().is_empty() {
            return Err(DomainError::InvalidEnvironment(
                "generated suffix cannot be empty".into(),
            ));
        }
        if self.file_extension.trim().is_empty() || self.file_extension.contains('.') {
            return Err(DomainError::InvalidEnvironment(format!(
                "invalid file extension '{}'",
                self.file_extension
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.projects {
            if !seen.insert(entry.name.as_str()) {
                return Err(DomainError::DuplicateProject {
                    name: entry.name.clone(),
                });
            }
        }

        // Each environment owns its output directory; the root is the
        // common project's.
        let mut owners: HashMap<&Path, &str> = HashMap::new();
        owners.insert(self.root_directory.as_path(), COMMON_PROJECT_NAME);
        for entry in &self.projects {
            if let Some(first) = owners.insert(entry.directory.as_path(), entry.name.as_str()) {
                return Err(DomainError::SharedProjectDirectory {
                    first: first.to_string(),
                    second: entry.name.clone(),
                    directory: entry.directory.display().to_string(),
                });
            }
        }

        let suffix = self.generated_suffix;
        let common = ProjectEnvironment::common(
            self.root_directory.clone(),
            format!("{}.{}", self.common_namespace, suffix),
        );
        let projects = self
            .projects
            .into_iter()
            .map(|entry| {
                let namespace = entry
                    .generated_namespace
                    .unwrap_or_else(|| format!("{}.{}", entry.name, suffix));
                ProjectEnvironment::new(entry.name, entry.directory, namespace, entry.source)
            })
            .collect();

        Ok(MasterEnvironment {
            run_id: Uuid::new_v4(),
            root_directory: self.root_directory,
            generated_suffix: suffix,
            file_extension: self.file_extension,
            independent_namespaces: self.independent_namespaces,
            common,
            projects,
            pool: self.pool.unwrap_or_else(BufferPool::with_defaults),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbols::NamespaceSymbol;
    use crate::error::KilnResult;

    struct Empty;

    impl SymbolGraph for Empty {
        fn root_namespace(&self) -> KilnResult<Arc<NamespaceSymbol>> {
            Ok(Arc::new(NamespaceSymbol::root()))
        }
    }

    #[test]
    fn builds_common_and_projects() {
        let master = MasterEnvironment::builder("/repo")
            .project("App", "/repo/App", Arc::new(Empty))
            .project("Lib", "/repo/Lib", Arc::new(Empty))
            .build()
            .unwrap();

        assert_eq!(master.environments().count(), 3);
        assert!(master.common().is_common());
        assert_eq!(master.common().generated_namespace(), "Common.Generated");
        assert_eq!(master.projects()[0].generated_namespace(), "App.Generated");
    }

    #[test]
    fn duplicate_project_names_are_rejected() {
        let result = MasterEnvironment::builder("/repo")
            .project("App", "/repo/a", Arc::new(Empty))
            .project("App", "/repo/b", Arc::new(Empty))
            .build();

        assert!(matches!(result, Err(DomainError::DuplicateProject { .. })));
    }

    #[test]
    fn projects_sharing_a_directory_are_rejected() {
        let result = MasterEnvironment::builder("/repo")
            .project("One", "/repo/Shared", Arc::new(Empty))
            .project("Two", "/repo/Shared", Arc::new(Empty))
            .build();

        match result {
            Err(DomainError::SharedProjectDirectory { first, second, .. }) => {
                assert_eq!(first, "One");
                assert_eq!(second, "Two");
            }
            other => panic!("expected SharedProjectDirectory, got {other:?}"),
        }
    }

    #[test]
    fn project_at_the_root_is_rejected() {
        let result = MasterEnvironment::builder("/repo")
            .project("Root", "/repo", Arc::new(Empty))
            .build();

        assert!(matches!(
            result,
            Err(DomainError::SharedProjectDirectory { .. })
        ));
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let result = MasterEnvironment::builder("/repo").generated_suffix(" ").build();
        assert!(matches!(result, Err(DomainError::InvalidEnvironment(_))));
    }

    #[test]
    fn output_scope_uses_suffix_and_extension() {
        let master = MasterEnvironment::builder("/repo")
            .generated_suffix("Gen")
            .file_extension("rs")
            .project("App", "/repo/App", Arc::new(Empty))
            .build()
            .unwrap();

        let scope = master.output_scope(&master.projects()[0]);
        assert_eq!(scope.directory(), Path::new("/repo/App/Gen"));
        assert_eq!(scope.file_name(), "Gen.rs");
    }

    #[test]
    fn collected_projects_skips_uncollected() {
        let master = MasterEnvironment::builder("/repo")
            .project("App", "/repo/App", Arc::new(Empty))
            .project("Lib", "/repo/Lib", Arc::new(Empty))
            .build()
            .unwrap();

        master.projects()[1].collect(master.independent_namespaces()).unwrap();

        let names: Vec<_> = master.collected_projects().map(|(env, _)| env.name()).collect();
        assert_eq!(names, ["Lib"]);
    }
}
