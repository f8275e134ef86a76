//! Directory-backed store.

use super::lock::SaveLock;
use super::{CatalogProvider, TemplateProvider, ValueSource, actor_string};
use crate::catalog::{Catalog, Parameter, ParameterValues};
use crate::error::{EngineError, Result};
use crate::fs::atomic_write;
use crate::template::Template;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TEMPLATES_DIR: &str = "templates";
const CATALOGS_DIR: &str = "catalogs";
const VALUES_DIR: &str = "values";

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

/// A store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }

    pub fn catalogs_dir(&self) -> PathBuf {
        self.root.join(CATALOGS_DIR)
    }

    pub fn values_dir(&self, template_id: &str) -> PathBuf {
        self.root.join(VALUES_DIR).join(template_id)
    }

    /// Ids of all stored templates, sorted.
    pub fn list_templates(&self) -> Result<Vec<String>> {
        let dir = self.templates_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| {
            EngineError::UserError(format!("failed to read '{}': {}", dir.display(), e))
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| format_of(path).is_some())
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .filter(|stem| !stem.starts_with('.'))
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Write a catalog for a template, replacing any existing one.
    pub fn save_catalog(&self, template_id: &str, catalog: &Catalog) -> Result<()> {
        check_id("template", template_id)?;
        let path = self
            .existing(&self.catalogs_dir(), template_id)
            .unwrap_or_else(|| self.catalogs_dir().join(format!("{}.yaml", template_id)));
        let parameters: Vec<Parameter> = catalog.iter().cloned().collect();
        let content = serialize(&parameters, format_of(&path).unwrap_or(Format::Yaml))?;
        atomic_write(&path, &content)
    }

    /// First of `<stem>.yaml`, `<stem>.yml`, `<stem>.json` that exists in `dir`.
    fn existing(&self, dir: &Path, stem: &str) -> Option<PathBuf> {
        ["yaml", "yml", "json"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file())
    }

    fn read_required<T: DeserializeOwned>(&self, dir: &Path, stem: &str, what: &str) -> Result<T> {
        let Some(path) = self.existing(dir, stem) else {
            return Err(EngineError::UserError(format!(
                "no {} found for '{}'\n\nFix: create {}",
                what,
                stem,
                dir.join(format!("{}.yaml", stem)).display()
            )));
        };
        debug!(path = %path.display(), "reading {}", what);
        read_file(&path)
    }
}

impl CatalogProvider for FileStore {
    fn get_parameters(&self, template_id: &str) -> Result<Catalog> {
        check_id("template", template_id)?;
        let parameters: Vec<Parameter> =
            self.read_required(&self.catalogs_dir(), template_id, "catalog")?;
        Ok(Catalog::new(parameters))
    }
}

impl TemplateProvider for FileStore {
    fn load_template(&self, template_id: &str) -> Result<Template> {
        check_id("template", template_id)?;
        let dir = self.templates_dir();
        let Some(path) = self.existing(&dir, template_id) else {
            let available = self.list_templates()?;
            let fix = if available.is_empty() {
                format!("create {}", dir.join(format!("{}.yaml", template_id)).display())
            } else {
                format!("use one of: {}", available.join(", "))
            };
            return Err(EngineError::UserError(format!(
                "no template found for '{}'\n\nFix: {}",
                template_id, fix
            )));
        };
        debug!(path = %path.display(), "reading template");
        let template = read_template(&path)?;
        if template.id != template_id {
            return Err(EngineError::UserError(format!(
                "template file '{}' declares id '{}'\n\nFix: make the id match the file name",
                template_id, template.id
            )));
        }
        Ok(template)
    }

    fn save_template(&self, template: &Template) -> Result<Template> {
        check_id("template", &template.id)?;
        let dir = self.templates_dir();

        // Held until return, so no other save can land between the version
        // check and the rename.
        let lock = SaveLock::acquire(&dir, &template.id)?;
        debug!(lock = %lock.path().display(), "checking stored version");

        let existing = self.existing(&dir, &template.id);

        let stored_version = match &existing {
            Some(path) => read_template(path)?.version,
            None => 0,
        };
        if stored_version != template.version {
            return Err(EngineError::EditConflict {
                template_id: template.id.clone(),
                expected: template.version,
                found: stored_version,
            });
        }

        let mut saved = template.clone();
        saved.version = stored_version.checked_add(1).ok_or_else(|| {
            EngineError::UserError(format!(
                "template '{}' is at the maximum version {}",
                template.id, stored_version
            ))
        })?;
        saved.updated_at = Some(Utc::now());
        saved.updated_by = Some(actor_string());

        let path = existing.unwrap_or_else(|| dir.join(format!("{}.yaml", template.id)));
        let content = match format_of(&path) {
            Some(Format::Json) => {
                let mut json = saved.to_json_pretty()?;
                json.push('\n');
                json
            }
            _ => saved.to_yaml()?,
        };
        atomic_write(&path, &content)?;

        info!(
            template_id = %saved.id,
            version = saved.version,
            path = %path.display(),
            "saved template"
        );
        Ok(saved)
    }
}

impl ValueSource for FileStore {
    /// Values are coerced against the template's catalog when one exists;
    /// otherwise their types are inferred.
    fn get_values(&self, template_id: &str, context_id: &str) -> Result<ParameterValues> {
        check_id("template", template_id)?;
        check_id("context", context_id)?;

        let raw: Option<BTreeMap<String, serde_json::Value>> =
            self.read_required(&self.values_dir(template_id), context_id, "values")?;
        let raw = raw.unwrap_or_default();

        let catalog = match self.existing(&self.catalogs_dir(), template_id) {
            Some(_) => Some(self.get_parameters(template_id)?),
            None => None,
        };
        ParameterValues::from_json_map(&raw, catalog.as_ref())
    }
}

/// Reject ids that would escape the store's directories.
fn check_id(kind: &str, id: &str) -> Result<()> {
    let bad = id.is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\'])
        || id.chars().any(char::is_control);
    if bad {
        return Err(EngineError::UserError(format!(
            "invalid {} id '{}'\n\nFix: use letters, digits, '-' or '_'",
            kind, id
        )));
    }
    Ok(())
}

fn format_of(path: &Path) -> Option<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Some(Format::Yaml),
        Some("json") => Some(Format::Json),
        _ => None,
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EngineError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })?;

    let parsed = match format_of(path) {
        Some(Format::Json) => serde_json::from_str(&content).map_err(|e| e.to_string()),
        _ => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| {
        EngineError::UserError(format!(
            "failed to parse '{}': {}\n\nFix: check the file for syntax errors",
            path.display(),
            e
        ))
    })
}

/// Templates parse through [`Template::from_yaml`] / [`Template::from_json`];
/// the error names the file.
fn read_template(path: &Path) -> Result<Template> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EngineError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })?;
    let parsed = match format_of(path) {
        Some(Format::Json) => Template::from_json(&content),
        _ => Template::from_yaml(&content),
    };
    parsed.map_err(|e| EngineError::UserError(format!("{}: {}", path.display(), e)))
}

fn serialize<T: serde::Serialize>(value: &T, format: Format) -> Result<String> {
    let out = match format {
        Format::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        Format::Json => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
    };
    out.map_err(|e| EngineError::UserError(format!("failed to serialize: {}", e)))
}
