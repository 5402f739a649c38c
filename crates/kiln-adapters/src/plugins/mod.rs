//! Built-in generator plugins.

mod tag_index;

pub use tag_index::TagIndexAdministrator;

use kiln_core::application::Administrator;

/// Names of the plugins shipped with Kiln.
pub const BUILTIN: &[&str] = &[TagIndexAdministrator::NAME];

/// Instantiate a built-in plugin by name.
pub fn builtin(name: &str) -> Option<Box<dyn Administrator>> {
    match name {
        TagIndexAdministrator::NAME => Some(Box::new(TagIndexAdministrator::new())),
        _ => None,
    }
}
