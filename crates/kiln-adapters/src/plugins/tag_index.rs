//! `tag-index`: a per-project listing of every annotated type and method.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rayon::prelude::*;
use tracing::{debug, instrument};

use kiln_core::{
    application::{Administrator, CancellationToken},
    domain::{CollectedSymbols, MasterEnvironment, Tag},
    error::KilnResult,
};

const ANNOTATIONS: &str = "namespace Kiln
{
    [System.AttributeUsage(System.AttributeTargets.Class | System.AttributeTargets.Struct | System.AttributeTargets.Method)]
    internal sealed class IndexedAttribute : System.Attribute
    {
    }
}
";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    tags: String,
}

impl Entry {
    fn new<'a>(name: String, tags: impl IntoIterator<Item = &'a Tag>) -> Self {
        let tags = tags.into_iter().map(Tag::as_str).collect::<Vec<_>>().join(", ");
        Self { name, tags }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ProjectIndex {
    types: Vec<Entry>,
    methods: Vec<Entry>,
}

impl ProjectIndex {
    fn build(symbols: &CollectedSymbols) -> Self {
        let types = symbols
            .tagged_types()
            .iter()
            .map(|ty| Entry::new(ty.name().to_string(), ty.attributes()))
            .collect();

        let methods = symbols
            .types()
            .iter()
            .flat_map(|ty| {
                ty.methods()
                    .iter()
                    .filter(|m| m.is_tagged())
                    .map(move |m| Entry::new(format!("{}.{}", ty.name(), m.name()), m.attributes()))
            })
            .collect();

        Self { types, methods }
    }

    fn is_empty(&self) -> bool {
        self.types.is_empty() && self.methods.is_empty()
    }

    fn render(&self, namespace: &str) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "namespace {namespace}\n{{");
        let _ = writeln!(out, "    internal static class TagIndex\n    {{");
        render_array(&mut out, "Types", &self.types);
        out.push('\n');
        render_array(&mut out, "Methods", &self.methods);
        let _ = writeln!(out, "    }}\n}}");
        out
    }
}

fn render_array(out: &mut String, field: &str, entries: &[Entry]) {
    let _ = writeln!(out, "        public static readonly string[] {field} =\n        {{");
    for entry in entries {
        let _ = writeln!(out, "            \"{}\", // {}", entry.name, entry.tags);
    }
    let _ = writeln!(out, "        }};");
}

/// Emits `TagIndex.<ext>` into every project that has annotated symbols.
#[derive(Debug, Default)]
pub struct TagIndexAdministrator {
    index: BTreeMap<String, ProjectIndex>,
}

impl TagIndexAdministrator {
    pub const NAME: &'static str = "tag-index";

    pub fn new() -> Self {
        Self::default()
    }

    /// Projects analyzed by the last collect.
    pub fn indexed_projects(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }
}

impl Administrator for TagIndexAdministrator {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, name = "tag_index_collect")]
    fn collect(&mut self, master: &MasterEnvironment, cancel: &CancellationToken) -> KilnResult<()> {
        let projects: Vec<_> = master.collected_projects().collect();

        self.index = projects
            .into_par_iter()
            .filter(|_| !cancel.is_cancelled())
            .map(|(env, symbols)| (env.name().to_string(), ProjectIndex::build(symbols)))
            .collect();

        debug!(projects = self.index.len(), "Indexed annotated symbols");
        Ok(())
    }

    #[instrument(skip_all, name = "tag_index_generate")]
    fn generate(&self, master: &MasterEnvironment, cancel: &CancellationToken) -> KilnResult<()> {
        let file_name = master.file_name("TagIndex");

        self.index.par_iter().for_each(|(project, index)| {
            if cancel.is_cancelled() || index.is_empty() {
                return;
            }
            let Some(env) = master.project(project) else {
                return;
            };
            let text = index.render(env.generated_namespace());
            env.add_fragment(master.fragment(file_name.as_str(), Self::NAME, &text));
        });
        Ok(())
    }

    fn annotations(&self) -> &'static str {
        ANNOTATIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kiln_core::domain::{MethodSymbol, NamespaceSymbol, TypeSymbol};

    use crate::graph::StaticGraph;

    fn master() -> MasterEnvironment {
        let app = NamespaceSymbol::root()
            .with_type(
                TypeSymbol::new("Foo")
                    .with_attribute("Gen")
                    .with_method(MethodSymbol::new("Bar").with_attribute("Route"))
                    .with_method(MethodSymbol::new("Helper")),
            )
            .with_type(TypeSymbol::new("Plain"));

        MasterEnvironment::builder("/repo")
            .project("App", "/repo/App", Arc::new(StaticGraph::new(app)))
            .project("Empty", "/repo/Empty", Arc::new(StaticGraph::new(NamespaceSymbol::root())))
            .build()
            .unwrap()
    }

    fn collect_all(master: &MasterEnvironment) {
        for env in master.projects() {
            env.collect(master.independent_namespaces()).unwrap();
        }
    }

    #[test]
    fn indexes_annotated_types_and_methods() {
        let master = master();
        collect_all(&master);
        let cancel = CancellationToken::new();

        let mut admin = TagIndexAdministrator::new();
        admin.collect(&master, &cancel).unwrap();
        admin.generate(&master, &cancel).unwrap();

        assert_eq!(admin.indexed_projects().collect::<Vec<_>>(), ["App", "Empty"]);

        let fragments = master.project("App").unwrap().take_fragments();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].file_name_hint(), "TagIndex.cs");
        assert_eq!(fragments[0].administrator(), "tag-index");

        let text = fragments[0].text();
        assert!(text.starts_with("namespace App.Generated\n{"));
        assert!(text.contains("\"Foo\", // Gen"));
        assert!(text.contains("\"Foo.Bar\", // Route"));
        assert!(!text.contains("Plain"));
        assert!(!text.contains("Helper"));

        assert_eq!(master.project("Empty").unwrap().fragment_count(), 0);
    }

    #[test]
    fn cancelled_generate_adds_nothing() {
        let master = master();
        collect_all(&master);
        let cancel = CancellationToken::new();

        let mut admin = TagIndexAdministrator::new();
        admin.collect(&master, &cancel).unwrap();
        cancel.cancel();
        admin.generate(&master, &cancel).unwrap();

        assert_eq!(master.pending_fragments(), 0);
    }

    #[test]
    fn ships_attribute_annotations() {
        let admin = TagIndexAdministrator::new();
        assert!(admin.annotations().contains("IndexedAttribute"));
        assert!(crate::plugins::builtin("tag-index").is_some());
        assert!(crate::plugins::builtin("unknown").is_none());
    }
}
