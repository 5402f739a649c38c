//! JSON symbol manifests.
//!
//! Each project describes its symbols in a manifest next to its sources
//! (default name `kiln.symbols.json`):
//!
//! ```json
//! {
//!   "types": [
//!     {
//!       "name": "Foo",
//!       "attributes": ["Gen"],
//!       "methods": [{ "name": "Bar", "attributes": ["Gen"] }],
//!       "nested": [{ "name": "Inner" }]
//!     }
//!   ],
//!   "namespaces": [
//!     { "name": "Models", "types": [{ "name": "Order", "attributes": ["Gen"] }] }
//!   ]
//! }
//! ```
//!
//! Every field except `name` is optional. The top level is the unnamed root
//! namespace.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use kiln_core::{
    application::{ApplicationError, SymbolGraph},
    domain::{MethodSymbol, NamespaceSymbol, TypeSymbol},
    error::KilnResult,
};

/// A namespace in a symbol manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestNamespace {
    /// Simple name. Empty for the root.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub types: Vec<ManifestType>,
    #[serde(default)]
    pub namespaces: Vec<ManifestNamespace>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestType {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub methods: Vec<ManifestMethod>,
    /// Types declared inside this type.
    #[serde(default)]
    pub nested: Vec<ManifestType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestMethod {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl ManifestNamespace {
    /// Convert into the core symbol model. Types come before child
    /// namespaces, each in manifest order.
    pub fn to_symbol(&self) -> NamespaceSymbol {
        let with_types = self
            .types
            .iter()
            .fold(NamespaceSymbol::new(&self.name), |ns, ty| {
                ns.with_type(ty.to_symbol())
            });
        self.namespaces
            .iter()
            .fold(with_types, |ns, child| ns.with_namespace(child.to_symbol()))
    }
}

impl ManifestType {
    pub fn to_symbol(&self) -> TypeSymbol {
        let mut ty = TypeSymbol::new(&self.name);
        for tag in &self.attributes {
            ty = ty.with_attribute(tag.as_str());
        }
        for method in &self.methods {
            ty = ty.with_method(method.to_symbol());
        }
        for nested in &self.nested {
            ty = ty.with_nested(nested.to_symbol());
        }
        ty
    }
}

impl ManifestMethod {
    pub fn to_symbol(&self) -> MethodSymbol {
        self.attributes
            .iter()
            .fold(MethodSymbol::new(&self.name), |m, tag| {
                m.with_attribute(tag.as_str())
            })
    }
}

/// A project's symbol graph read from a JSON manifest.
///
/// The file is read on first access and cached; later calls share the
/// parsed graph.
#[derive(Debug)]
pub struct ManifestGraph {
    path: PathBuf,
    root: OnceLock<Arc<NamespaceSymbol>>,
}

impl ManifestGraph {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<ManifestNamespace, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[instrument(skip(self), fields(manifest = %self.path.display()))]
    fn load(&self) -> KilnResult<Arc<NamespaceSymbol>> {
        let raw = fs::read_to_string(&self.path).map_err(|e| ApplicationError::FilesystemError {
            path: self.path.clone(),
            reason: format!("Failed to read symbol manifest: {e}"),
        })?;

        let manifest = Self::parse(&raw).map_err(|e| ApplicationError::FilesystemError {
            path: self.path.clone(),
            reason: format!("Invalid symbol manifest: {e}"),
        })?;

        debug!(
            types = manifest.types.len(),
            namespaces = manifest.namespaces.len(),
            "Parsed symbol manifest"
        );
        Ok(Arc::new(manifest.to_symbol()))
    }
}

impl SymbolGraph for ManifestGraph {
    fn root_namespace(&self) -> KilnResult<Arc<NamespaceSymbol>> {
        if let Some(root) = self.root.get() {
            return Ok(Arc::clone(root));
        }
        let root = self.load()?;
        Ok(Arc::clone(self.root.get_or_init(|| root)))
    }
}
