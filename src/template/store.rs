//! # Template Store
//!
//! Keeps named templates and an "active template" pointer in a single JSON
//! file:
//!
//! ```json
//! {
//!   "templates": { "order-slip": { "name": "order-slip", "content": "..." } },
//!   "active": "order-slip"
//! }
//! ```
//!
//! Every template is validated before it is written, so anything read back
//! from the store can go straight into the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Template;
use crate::error::SlipcastError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    templates: BTreeMap<String, Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active: Option<String>,
}

/// JSON-file backed template store.
#[derive(Debug)]
pub struct TemplateStore {
    path: PathBuf,
    data: StoreFile,
}

impl TemplateStore {
    /// Open a store. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SlipcastError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw).map_err(|e| {
                SlipcastError::Store(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            StoreFile::default()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and save a template, replacing any template with the same name.
    pub fn save(&mut self, template: Template) -> Result<(), SlipcastError> {
        template.validate()?;
        log::debug!("saving template '{}'", template.name);
        self.data.templates.insert(template.name.clone(), template);
        self.flush()
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.data.templates.get(name)
    }

    /// Template names in sorted order.
    pub fn list(&self) -> Vec<&str> {
        self.data.templates.keys().map(String::as_str).collect()
    }

    /// Remove a template. Clears the active pointer if it named this template.
    pub fn delete(&mut self, name: &str) -> Result<Template, SlipcastError> {
        let removed = self
            .data
            .templates
            .remove(name)
            .ok_or_else(|| SlipcastError::Store(format!("No template named '{}'", name)))?;
        if self.data.active.as_deref() == Some(name) {
            self.data.active = None;
        }
        self.flush()?;
        Ok(removed)
    }

    /// Point the active template at an existing template.
    pub fn set_active(&mut self, name: &str) -> Result<(), SlipcastError> {
        if !self.data.templates.contains_key(name) {
            return Err(SlipcastError::Store(format!("No template named '{}'", name)));
        }
        self.data.active = Some(name.to_string());
        self.flush()
    }

    /// The active template, if one is set.
    pub fn active(&self) -> Option<&Template> {
        self.data
            .active
            .as_deref()
            .and_then(|name| self.data.templates.get(name))
    }

    pub fn active_name(&self) -> Option<&str> {
        self.data.active.as_deref()
    }

    /// Rewrite the store file through a temporary file and rename.
    fn flush(&self) -> Result<(), SlipcastError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn temp_store_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "slipcast-store-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("templates.json")
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let store = TemplateStore::open(temp_store_path("empty")).unwrap();
        assert!(store.list().is_empty());
        assert!(store.active().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_store_path("reload");
        {
            let mut store = TemplateStore::open(&path).unwrap();
            store.save(Template::new("b", "{{x}}")).unwrap();
            store.save(Template::new("a", "hello")).unwrap();
            store.set_active("b").unwrap();
        }
        let store = TemplateStore::open(&path).unwrap();
        assert_eq!(store.list(), vec!["a", "b"]);
        assert_eq!(store.active().map(|t| t.content.as_str()), Some("{{x}}"));
    }

    #[test]
    fn test_invalid_template_not_persisted() {
        let path = temp_store_path("invalid");
        let mut store = TemplateStore::open(&path).unwrap();
        let err = store.save(Template::new("", "content")).unwrap_err();
        assert!(matches!(
            err,
            SlipcastError::Template(ValidationError::EmptyName)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_set_active_requires_existing_template() {
        let mut store = TemplateStore::open(temp_store_path("active")).unwrap();
        assert!(store.set_active("nope").is_err());
    }

    #[test]
    fn test_delete_clears_active() {
        let mut store = TemplateStore::open(temp_store_path("delete")).unwrap();
        store.save(Template::new("slip", "x")).unwrap();
        store.set_active("slip").unwrap();
        store.delete("slip").unwrap();
        assert!(store.active_name().is_none());
        assert!(store.delete("slip").is_err());
    }
}
