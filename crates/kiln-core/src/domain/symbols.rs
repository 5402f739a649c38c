//! Read-only symbol graph model.
//!
//! The core never parses source text. A front end builds these values (see
//! `kiln_adapters::graph`) and exposes them through [`SymbolGraph`]. All
//! symbols are shared behind `Arc` so that collection can cache them in
//! several environments without copying the graph.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::KilnResult;

/// An attribute tag attached to a type or method, e.g. `Gen`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A method declared on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSymbol {
    name: String,
    attributes: BTreeSet<Tag>,
}

impl MethodSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeSet::new(),
        }
    }

    pub fn with_attribute(mut self, tag: impl Into<Tag>) -> Self {
        self.attributes.insert(tag.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &BTreeSet<Tag> {
        &self.attributes
    }

    pub fn is_tagged(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// A named type. `nested` holds types declared inside this one; they are not
/// top-level and collection never visits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    name: String,
    attributes: BTreeSet<Tag>,
    methods: Vec<Arc<MethodSymbol>>,
    nested: Vec<Arc<TypeSymbol>>,
}

impl TypeSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeSet::new(),
            methods: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, tag: impl Into<Tag>) -> Self {
        self.attributes.insert(tag.into());
        self
    }

    pub fn with_method(mut self, method: MethodSymbol) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    pub fn with_nested(mut self, nested: TypeSymbol) -> Self {
        self.nested.push(Arc::new(nested));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &BTreeSet<Tag> {
        &self.attributes
    }

    pub fn methods(&self) -> &[Arc<MethodSymbol>] {
        &self.methods
    }

    pub fn nested_types(&self) -> &[Arc<TypeSymbol>] {
        &self.nested
    }

    pub fn is_tagged(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// A member of a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Type(Arc<TypeSymbol>),
    Namespace(Arc<NamespaceSymbol>),
}

/// A namespace and its direct members, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceSymbol {
    name: String,
    members: Vec<Symbol>,
}

impl NamespaceSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// The unnamed global namespace of a project.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, ty: TypeSymbol) -> Self {
        self.members.push(Symbol::Type(Arc::new(ty)));
        self
    }

    pub fn with_namespace(mut self, ns: NamespaceSymbol) -> Self {
        self.members.push(Symbol::Namespace(Arc::new(ns)));
        self
    }

    /// Simple (unqualified) name. Empty for the root namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Symbol] {
        &self.members
    }

    /// Types declared directly in this namespace or any descendant namespace,
    /// excluding types nested in other types. Descendant namespaces whose
    /// simple name satisfies `skip` are not entered.
    pub fn not_nested_types<'a>(
        &'a self,
        skip: &dyn Fn(&str) -> bool,
    ) -> Vec<&'a Arc<TypeSymbol>> {
        let mut out = Vec::new();
        self.push_not_nested_types(skip, &mut out);
        out
    }

    fn push_not_nested_types<'a>(
        &'a self,
        skip: &dyn Fn(&str) -> bool,
        out: &mut Vec<&'a Arc<TypeSymbol>>,
    ) {
        for member in &self.members {
            match member {
                Symbol::Type(ty) => out.push(ty),
                Symbol::Namespace(ns) if !skip(ns.name()) => ns.push_not_nested_types(skip, out),
                Symbol::Namespace(_) => {}
            }
        }
    }
}

/// Source of a project's symbols.
///
/// Implemented by:
/// - `kiln_adapters::graph::ManifestGraph` (JSON symbol manifests)
/// - `kiln_adapters::graph::StaticGraph` (prebuilt graphs, tests)
pub trait SymbolGraph: Send + Sync {
    /// The project's root namespace. Called once per collect.
    fn root_namespace(&self) -> KilnResult<Arc<NamespaceSymbol>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_only_when_attributes_present() {
        assert!(!TypeSymbol::new("Plain").is_tagged());
        assert!(TypeSymbol::new("Foo").with_attribute("Gen").is_tagged());
        assert!(MethodSymbol::new("Bar").with_attribute("Gen").is_tagged());
    }

    #[test]
    fn not_nested_types_skips_nested_and_excluded() {
        let ns = NamespaceSymbol::new("Outer")
            .with_type(TypeSymbol::new("A").with_nested(TypeSymbol::new("Inner")))
            .with_namespace(NamespaceSymbol::new("Deep").with_type(TypeSymbol::new("B")))
            .with_namespace(NamespaceSymbol::new("Skip").with_type(TypeSymbol::new("C")));

        let names: Vec<_> = ns
            .not_nested_types(&|name| name == "Skip")
            .into_iter()
            .map(|t| t.name().to_string())
            .collect();

        assert_eq!(names, ["A", "B"]);
    }
}
