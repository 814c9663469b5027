//! Types d'erreurs pour le crate carto-proj

use thiserror::Error;

use crate::registry::ProjectionFamily;

/// Erreurs pouvant survenir lors de la construction d'une définition ou d'une projection
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// La définition PROJ est vide (jeu de paramètres ou ellipsoïde absent)
    #[error("Empty projection definition: {0}")]
    EmptyDefinition(String),

    /// Famille de projection absente du registre
    #[error("Unknown projection family: {0:?}")]
    UnknownFamily(ProjectionFamily),

    /// Le moteur de transformation a rejeté la définition
    #[error("Transform engine failed for '{definition}': {reason}")]
    Engine { definition: String, reason: String },

    /// Reprojection indisponible dans ce build
    #[error("Reprojection requires the 'reproject' feature. Build with: cargo build --features reproject")]
    FeatureDisabled,
}

impl ProjectionError {
    /// Crée une erreur moteur avec contexte
    pub fn engine(definition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Engine {
            definition: definition.into(),
            reason: reason.into(),
        }
    }
}
