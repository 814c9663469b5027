//! Catalogue des projections enregistrées
//!
//! Les projections sont des données de référence en lecture seule, résolues
//! une fois par lot.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use carto_proj::ProjectionParameterSet;
use tracing::info;
use uuid::Uuid;

/// Source des jeux de paramètres de projection
pub trait ProjectionCatalog: Send + Sync {
    fn projection(&self, id: Uuid) -> Option<ProjectionParameterSet>;
}

impl<T: ProjectionCatalog + ?Sized> ProjectionCatalog for Arc<T> {
    fn projection(&self, id: Uuid) -> Option<ProjectionParameterSet> {
        (**self).projection(id)
    }
}

/// Catalogue en mémoire
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    projections: HashMap<Uuid, ProjectionParameterSet>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute ou remplace une projection
    pub fn insert(&mut self, set: ProjectionParameterSet) {
        self.projections.insert(set.id(), set);
    }

    /// Charge un tableau JSON de projections
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read catalog file: {}", path.display()))?;
        let sets: Vec<ProjectionParameterSet> =
            serde_json::from_str(&content).context("Failed to parse catalog JSON")?;

        info!(path = %path.display(), projections = sets.len(), "Catalog loaded");
        Ok(sets.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.projections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }
}

impl FromIterator<ProjectionParameterSet> for MemoryCatalog {
    fn from_iter<I: IntoIterator<Item = ProjectionParameterSet>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for set in iter {
            catalog.insert(set);
        }
        catalog
    }
}

impl ProjectionCatalog for MemoryCatalog {
    fn projection(&self, id: Uuid) -> Option<ProjectionParameterSet> {
        self.projections.get(&id).cloned()
    }
}
