//! YAML coaching-catalog loader.
//!
//! Reads level bands, skill categories, the metric→skill dictionary and
//! playbooks from a YAML file. Sections left out of the file keep their
//! built-in defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::coaching::CoachingCatalog;

/// Errors raised while loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Loads a [`CoachingCatalog`] from a YAML file.
#[derive(Debug, Clone)]
pub struct YamlCatalogLoader {
    path: PathBuf,
}

impl YamlCatalogLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<CoachingCatalog, CatalogError> {
        let yaml = fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Io {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        parse_catalog(&yaml)
    }
}

/// Parses and cross-checks a catalog document.
///
/// Level tables are validated during deserialization. Afterwards every skill
/// the dictionary points at must be a configured category, and playbook ids
/// must be unique.
pub fn parse_catalog(yaml: &str) -> Result<CoachingCatalog, CatalogError> {
    let catalog: CoachingCatalog =
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;

    for (metric, skill) in catalog.skill_map.iter() {
        if catalog.skill_category(skill).is_none() {
            return Err(CatalogError::Invalid(format!(
                "metric '{}' maps to unknown skill category '{}'",
                metric, skill
            )));
        }
    }

    let mut seen = HashSet::new();
    for playbook in catalog.playbooks.playbooks() {
        if !seen.insert(&playbook.id) {
            return Err(CatalogError::Invalid(format!(
                "duplicate playbook id '{}'",
                playbook.id
            )));
        }
    }

    Ok(catalog)
}
