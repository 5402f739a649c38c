//! Symbol graph adapters.

mod manifest;
mod static_graph;

pub use manifest::{ManifestGraph, ManifestMethod, ManifestNamespace, ManifestType};
pub use static_graph::StaticGraph;
