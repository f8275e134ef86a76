//! Host context resolution for clausekit commands.
//!
//! Every store-backed command resolves one [`HostContext`]: the store rooted
//! at `--root` plus the effective configuration. Nothing is process-wide;
//! commands receive the context explicitly.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::store::{CatalogProvider, FileStore, TemplateProvider};
use crate::template::Template;
use std::path::Path;

/// Store and configuration for one command invocation.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub store: FileStore,
    pub config: Config,
}

impl HostContext {
    pub fn new(store: FileStore, config: Config) -> Self {
        Self { store, config }
    }

    /// Resolve the context for a store root and an optional config path.
    ///
    /// # Returns
    ///
    /// * `Ok(HostContext)` - The root exists and the config (if any) is valid
    /// * `Err(EngineError::UserError)` - Missing root or unreadable/invalid config
    pub fn resolve(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        if !root.is_dir() {
            return Err(EngineError::UserError(format!(
                "store root '{}' is not a directory\n\nFix: pass --root pointing at a directory containing templates/",
                root.display()
            )));
        }

        let config = Config::resolve(config_path, root)?;
        Ok(Self::new(FileStore::new(root), config))
    }

    /// Load a template and its catalog, typing condition operands against
    /// the catalog.
    pub fn load_typed(&self, template_id: &str) -> Result<(Template, Catalog)> {
        let mut template = self.store.load_template(template_id)?;
        let catalog = self.store.get_parameters(template_id)?;
        template.coerce_conditions(&catalog);
        Ok((template, catalog))
    }
}
