//! Provider interfaces and the file-backed store.
//!
//! The engine itself never reads or writes storage: hosts fetch a template,
//! its catalog and a set of values through these traits and pass them in.
//! [`FileStore`] implements all three over a directory tree:
//!
//! ```text
//! <root>/templates/<template_id>.yaml
//! <root>/catalogs/<template_id>.yaml
//! <root>/values/<template_id>/<context_id>.yaml
//! ```
//!
//! `.json` files are read when no `.yaml` (or `.yml`) file exists. Saves hold
//! `templates/.<template_id>.lock` while they check the stored version and
//! write, so concurrent saves from the same base version cannot both land.

mod actor;
mod file;
mod lock;

#[cfg(test)]
mod tests;

pub use actor::actor_string;
pub use file::FileStore;

use crate::catalog::{Catalog, ParameterValues};
use crate::error::Result;
use crate::template::Template;

/// Source of parameter catalogs.
pub trait CatalogProvider {
    /// The parameters a template may reference.
    fn get_parameters(&self, template_id: &str) -> Result<Catalog>;
}

/// Persistence for templates with optimistic versioning.
pub trait TemplateProvider {
    fn load_template(&self, template_id: &str) -> Result<Template>;

    /// Persist a template edited from version `template.version`.
    ///
    /// Fails with [`EngineError::EditConflict`](crate::error::EngineError::EditConflict)
    /// if the stored version has moved on. Returns the template as saved, with
    /// its version incremented and its update stamp set.
    fn save_template(&self, template: &Template) -> Result<Template>;
}

/// Source of parameter values for one document context.
pub trait ValueSource {
    fn get_values(&self, template_id: &str, context_id: &str) -> Result<ParameterValues>;
}
