//! Rapport de conversion avec dégradation gracieuse
//!
//! Une conversion peut aboutir avec des données incomplètes (service distant
//! trop lent, point hors du domaine de la projection). Le rapport l'indique
//! explicitement plutôt que de le passer sous silence.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use carto_proj::CartographicCoordinate;
use serde::Serialize;

use crate::poll::PollOutcome;

/// Statut global de la conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionStatus {
    /// Toutes les coordonnées sont complètes
    Complete,
    /// Au moins une coordonnée est incomplète
    Partial,
}

/// Issue de l'appel distant d'un sous-lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemoteStatus {
    Completed,
    TimedOut,
    Failed,
}

impl From<&PollOutcome> for RemoteStatus {
    fn from(outcome: &PollOutcome) -> Self {
        match outcome {
            PollOutcome::Completed(_) => Self::Completed,
            PollOutcome::TimedOut(_) => Self::TimedOut,
            PollOutcome::Failed(_) => Self::Failed,
        }
    }
}

/// Sous-lot d'origine d'une coordonnée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Subset {
    Cartographic,
    Geodetic,
}

/// Avertissement attaché à la conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionWarning {
    /// Indice de la coordonnée dans le lot (optionnel)
    pub index: Option<usize>,
    /// Message
    pub message: String,
}

/// Rapport de conversion d'un lot
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Nom du lot
    pub batch: String,
    /// Durée de la conversion
    pub duration_secs: f64,
    /// Statut global
    pub status: ConversionStatus,

    /// Nombre de coordonnées définies en cartographique
    pub cartographic_count: usize,
    /// Nombre de coordonnées définies en géodésique
    pub geodetic_count: usize,

    /// Issue de l'appel distant du sous-lot cartographique (`None` : aucun appel)
    pub cartographic_remote: Option<RemoteStatus>,
    /// Issue de l'appel distant du sous-lot géodésique (`None` : aucun appel)
    pub geodetic_remote: Option<RemoteStatus>,

    /// Indices des coordonnées restées incomplètes
    pub incomplete_items: Vec<usize>,
    /// Liste des warnings
    pub warnings: Vec<ConversionWarning>,
}

impl Default for ConversionReport {
    fn default() -> Self {
        Self {
            batch: String::new(),
            duration_secs: 0.0,
            status: ConversionStatus::Complete,
            cartographic_count: 0,
            geodetic_count: 0,
            cartographic_remote: None,
            geodetic_remote: None,
            incomplete_items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ConversionReport {
    /// Crée un nouveau rapport pour un lot
    pub fn new(batch: &str) -> Self {
        Self {
            batch: batch.to_string(),
            ..Default::default()
        }
    }

    /// Enregistre l'issue d'un appel distant
    pub fn record_remote(&mut self, subset: Subset, outcome: &PollOutcome) {
        let status = RemoteStatus::from(outcome);
        match subset {
            Subset::Cartographic => self.cartographic_remote = Some(status),
            Subset::Geodetic => self.geodetic_remote = Some(status),
        }
        match outcome {
            PollOutcome::Completed(_) => {}
            PollOutcome::TimedOut(partial) => self.record_warning(
                None,
                format!(
                    "{:?} subset: geodetic conversion timed out ({})",
                    subset,
                    if partial.is_some() {
                        "partial data kept"
                    } else {
                        "no data received"
                    }
                ),
            ),
            PollOutcome::Failed(reason) => self.record_warning(
                None,
                format!("{:?} subset: geodetic conversion failed: {}", subset, reason),
            ),
        }
    }

    /// Enregistre un warning
    pub fn record_warning(&mut self, index: Option<usize>, message: impl Into<String>) {
        self.warnings.push(ConversionWarning {
            index,
            message: message.into(),
        });
    }

    /// Définit la durée de la conversion
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final à partir des coordonnées converties
    pub fn finalize(&mut self, coordinates: &[CartographicCoordinate]) {
        self.incomplete_items = coordinates
            .iter()
            .enumerate()
            .filter(|(_, c)| !is_item_complete(c))
            .map(|(i, _)| i)
            .collect();

        let remote_ok = [self.cartographic_remote, self.geodetic_remote]
            .iter()
            .flatten()
            .all(|s| *s == RemoteStatus::Completed);

        self.status = if self.incomplete_items.is_empty() && remote_ok {
            ConversionStatus::Complete
        } else {
            ConversionStatus::Partial
        };
    }

    pub fn is_complete(&self) -> bool {
        self.status == ConversionStatus::Complete
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION REPORT - {}", self.batch);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Coordinates: {} cartographic, {} geodetic, {} incomplete",
            self.cartographic_count,
            self.geodetic_count,
            self.incomplete_items.len()
        );
        println!(
            "Remote: cartographic {}, geodetic {}",
            remote_label(self.cartographic_remote),
            remote_label(self.geodetic_remote)
        );

        if !self.incomplete_items.is_empty() {
            let shown: Vec<String> = self
                .incomplete_items
                .iter()
                .take(20)
                .map(|i| i.to_string())
                .collect();
            println!("\n--- INCOMPLETE ---");
            println!("  #{}", shown.join(", #"));
            if self.incomplete_items.len() > 20 {
                println!("  ... and {} more", self.incomplete_items.len() - 20);
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                match w.index {
                    Some(i) => println!("  [#{}] {}", i, w.message),
                    None => println!("  {}", w.message),
                }
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} cartographic, {} geodetic, {} incomplete, {} warnings",
            self.batch,
            self.cartographic_count,
            self.geodetic_count,
            self.incomplete_items.len(),
            self.warnings.len()
        )
    }
}

/// Coordonnée entièrement renseignée : cartographique, convergence et géodésique
pub fn is_item_complete(coordinate: &CartographicCoordinate) -> bool {
    coordinate.northing.is_some()
        && coordinate.easting.is_some()
        && coordinate.vertical_depth.is_some()
        && coordinate.grid_convergence_datum.is_some()
        && coordinate
            .geodetic_coordinate
            .as_ref()
            .is_some_and(|g| g.is_complete())
}

fn remote_label(status: Option<RemoteStatus>) -> String {
    status
        .map(|s| format!("{:?}", s))
        .unwrap_or_else(|| "-".to_string())
}
