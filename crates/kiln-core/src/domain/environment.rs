//! Project environments: per-project symbol cache and fragment buffer.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{Span, info, info_span};

use crate::domain::{
    error::DomainError,
    fragment::CodeFragment,
    symbols::{MethodSymbol, NamespaceSymbol, Symbol, SymbolGraph, TypeSymbol},
};

/// Name of the common pseudo-project.
pub const COMMON_PROJECT_NAME: &str = "common";

/// Symbols cached for one project by a single collect pass.
#[derive(Debug, Clone, Default)]
pub struct CollectedSymbols {
    types: Vec<Arc<TypeSymbol>>,
    tagged_types: Vec<Arc<TypeSymbol>>,
    tagged_methods: Vec<Arc<MethodSymbol>>,
}

impl CollectedSymbols {
    /// Walk the direct members of `root`.
    ///
    /// Types are recorded as they appear. A child namespace contributes its
    /// not-nested types, unless its simple name is in `independent`; such
    /// namespaces belong to another unit and are skipped entirely.
    pub fn gather(root: &NamespaceSymbol, independent: &BTreeSet<String>) -> Self {
        let skip = |name: &str| independent.contains(name);
        let mut symbols = Self::default();

        for member in root.members() {
            match member {
                Symbol::Type(ty) => symbols.add_type(ty),
                Symbol::Namespace(ns) => {
                    if skip(ns.name()) {
                        continue;
                    }
                    for ty in ns.not_nested_types(&skip) {
                        symbols.add_type(ty);
                    }
                }
            }
        }

        symbols
    }

    fn add_type(&mut self, ty: &Arc<TypeSymbol>) {
        self.types.push(Arc::clone(ty));

        if ty.is_tagged() {
            self.tagged_types.push(Arc::clone(ty));
        }

        self.tagged_methods
            .extend(ty.methods().iter().filter(|m| m.is_tagged()).cloned());
    }

    pub fn types(&self) -> &[Arc<TypeSymbol>] {
        &self.types
    }

    pub fn tagged_types(&self) -> &[Arc<TypeSymbol>] {
        &self.tagged_types
    }

    pub fn tagged_methods(&self) -> &[Arc<MethodSymbol>] {
        &self.tagged_methods
    }
}

/// One compilation unit: its metadata, its collected symbols and the
/// fragments generated for it.
///
/// The common pseudo-project is an environment without a symbol source; it
/// only receives shared fragments.
pub struct ProjectEnvironment {
    name: String,
    directory: PathBuf,
    generated_namespace: String,
    span: Span,
    source: Option<Arc<dyn SymbolGraph>>,
    symbols: OnceLock<CollectedSymbols>,
    fragments: Mutex<Vec<CodeFragment>>,
}

impl ProjectEnvironment {
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        generated_namespace: impl Into<String>,
        source: Arc<dyn SymbolGraph>,
    ) -> Self {
        Self::build(name.into(), directory.into(), generated_namespace.into(), Some(source))
    }

    /// The synthetic environment for output shared by all projects.
    pub fn common(directory: impl Into<PathBuf>, generated_namespace: impl Into<String>) -> Self {
        Self::build(
            COMMON_PROJECT_NAME.to_string(),
            directory.into(),
            generated_namespace.into(),
            None,
        )
    }

    fn build(
        name: String,
        directory: PathBuf,
        generated_namespace: String,
        source: Option<Arc<dyn SymbolGraph>>,
    ) -> Self {
        let span = info_span!("project", name = %name);
        Self {
            name,
            directory,
            generated_namespace,
            span,
            source,
            symbols: OnceLock::new(),
            fragments: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn generated_namespace(&self) -> &str {
        &self.generated_namespace
    }

    /// Logger handle: events emitted inside this span carry the project name.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn is_common(&self) -> bool {
        self.source.is_none()
    }

    /// Collect and cache this project's symbols. May succeed at most once.
    pub fn collect(&self, independent: &BTreeSet<String>) -> Result<&CollectedSymbols, DomainError> {
        let _entered = self.span.enter();

        let source = self.source.as_ref().ok_or_else(|| DomainError::NoSymbolSource {
            project: self.name.clone(),
        })?;

        if self.symbols.get().is_some() {
            return Err(DomainError::AlreadyCollected {
                project: self.name.clone(),
            });
        }

        let root = source
            .root_namespace()
            .map_err(|e| DomainError::GraphAccess {
                project: self.name.clone(),
                reason: e.to_string(),
            })?;

        let gathered = CollectedSymbols::gather(&root, independent);
        info!(
            types = gathered.types().len(),
            tagged_types = gathered.tagged_types().len(),
            tagged_methods = gathered.tagged_methods().len(),
            "Collected {} types, {} annotated types, {} annotated methods",
            gathered.types().len(),
            gathered.tagged_types().len(),
            gathered.tagged_methods().len(),
        );

        self.symbols
            .set(gathered)
            .map_err(|_| DomainError::AlreadyCollected {
                project: self.name.clone(),
            })?;

        self.symbols.get().ok_or_else(|| DomainError::AlreadyCollected {
            project: self.name.clone(),
        })
    }

    /// Cached symbols, `None` until a successful collect.
    pub fn symbols(&self) -> Option<&CollectedSymbols> {
        self.symbols.get()
    }

    /// Append a fragment. Safe to call from several generators at once.
    pub fn add_fragment(&self, fragment: CodeFragment) {
        self.fragments.lock().push(fragment);
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.lock().len()
    }

    /// Take every pending fragment in drain order, leaving the buffer empty.
    pub fn take_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments = mem::take(&mut *self.fragments.lock());
        fragments.sort_by(CodeFragment::drain_order);
        fragments
    }

    /// Drop pending fragments, returning pooled buffers.
    pub fn dispose_fragments(&self) {
        self.fragments.lock().clear();
    }
}

impl fmt::Debug for ProjectEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectEnvironment")
            .field("name", &self.name)
            .field("directory", &self.directory)
            .field("generated_namespace", &self.generated_namespace)
            .field("is_common", &self.is_common())
            .field("collected", &self.symbols.get().is_some())
            .finish()
    }
}
