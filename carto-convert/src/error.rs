//! Erreurs de conversion d'un lot

use carto_proj::ProjectionError;
use thiserror::Error;

/// Erreurs pouvant interrompre la conversion d'un lot
///
/// Les dépassements de délai du service distant ne sont pas des erreurs : ils
/// dégradent le résultat (voir `ConversionReport`).
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Entrée vide ou coordonnée ni cartographique ni géodésique
    #[error("Invalid input: {0}")]
    Input(String),

    /// Projection, datum ou ellipsoïde introuvable
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Échec du calcul local (définition inutilisable par le moteur)
    #[error("Computation failed: {0}")]
    Computation(#[from] ProjectionError),

    /// Erreur de transport avec le service de datum
    #[error("Remote service error in {operation}: {reason}")]
    Remote { operation: String, reason: String },
}

impl ConversionError {
    /// Crée une erreur d'entrée pour la coordonnée d'indice `index`
    pub fn unclassifiable(index: usize) -> Self {
        Self::Input(format!(
            "coordinate #{} has neither a cartographic nor a geodetic triple",
            index
        ))
    }

    /// Crée une erreur de transport avec contexte
    pub fn remote(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::Remote {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Erreur visible par l'appelant (entrée ou ressource), par opposition aux échecs internes
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Input(_) | Self::ResourceNotFound(_))
    }
}
