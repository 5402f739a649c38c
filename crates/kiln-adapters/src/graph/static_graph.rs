//! In-memory symbol graph.

use std::sync::Arc;

use kiln_core::{application::SymbolGraph, domain::NamespaceSymbol, error::KilnResult};

/// A symbol graph built up front, e.g. by a host that already has the
/// symbols in memory, or by tests.
#[derive(Debug, Clone)]
pub struct StaticGraph {
    root: Arc<NamespaceSymbol>,
}

impl StaticGraph {
    pub fn new(root: NamespaceSymbol) -> Self {
        Self {
            root: Arc::new(root),
        }
    }
}

impl SymbolGraph for StaticGraph {
    fn root_namespace(&self) -> KilnResult<Arc<NamespaceSymbol>> {
        Ok(Arc::clone(&self.root))
    }
}
