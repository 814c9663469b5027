//! Attente de complétion d'un lot soumis au service de datum
//!
//! Le lot est interrogé à intervalle fixe jusqu'à ce que toutes ses
//! coordonnées portent les trois représentations géodésiques, ou jusqu'à
//! expiration du délai. Il n'y a ni backoff ni nouvelle tentative au-delà de
//! l'intervalle.

use std::time::Duration;

use carto_proj::GeodeticCoordinate;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::remote::DatumTransformService;

/// Cadence et délai maximal du polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Issue du polling d'un lot
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Toutes les coordonnées sont complètes
    Completed(Vec<GeodeticCoordinate>),
    /// Délai expiré ; contient la dernière réponse obtenue, s'il y en a une
    TimedOut(Option<Vec<GeodeticCoordinate>>),
    /// Le service n'a jamais pu être interrogé (ou la soumission a échoué)
    Failed(String),
}

impl PollOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Coordonnées disponibles, complètes ou non
    pub fn into_records(self) -> Option<Vec<GeodeticCoordinate>> {
        match self {
            Self::Completed(records) => Some(records),
            Self::TimedOut(records) => records,
            Self::Failed(_) => None,
        }
    }
}

/// Un lot est complet quand il a la longueur attendue et que chaque coordonnée est complète
pub fn is_complete(records: &[GeodeticCoordinate], expected_len: usize) -> bool {
    !records.is_empty()
        && records.len() == expected_len
        && records.iter().all(GeodeticCoordinate::is_complete)
}

/// Interroge le lot `id` jusqu'à complétion ou expiration du délai
///
/// En cas de complétion, le lot est supprimé côté service ; un échec de
/// suppression est journalisé sans affecter le résultat.
pub async fn poll_until_complete<S>(
    service: &S,
    id: Uuid,
    expected_len: usize,
    settings: PollSettings,
) -> PollOutcome
where
    S: DatumTransformService + ?Sized,
{
    let mut last: Option<Vec<GeodeticCoordinate>> = None;
    let mut last_error: Option<String> = None;
    let mut attempts = 0usize;

    let polling = async {
        let mut ticker = interval(settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            attempts += 1;

            match service.get_by_id(id).await {
                Ok(Some(set)) => {
                    let records = set.geodetic_coordinates;
                    if is_complete(&records, expected_len) {
                        return records;
                    }
                    debug!(
                        correlation_id = %id,
                        attempt = attempts,
                        received = records.len(),
                        "Geodetic conversion not complete yet"
                    );
                    last = Some(records);
                }
                Ok(None) => {
                    debug!(correlation_id = %id, attempt = attempts, "Geodetic conversion not available yet");
                }
                Err(e) => {
                    warn!(correlation_id = %id, attempt = attempts, "Polling failed: {}", e);
                    last_error = Some(e.to_string());
                }
            }
        }
    };

    let result = timeout(settings.timeout, polling).await;

    match result {
        Ok(records) => {
            info!(correlation_id = %id, attempts, items = records.len(), "Geodetic conversion completed");
            if let Err(e) = service.delete_by_id(id).await {
                warn!(correlation_id = %id, "Failed to delete completed conversion: {}", e);
            }
            PollOutcome::Completed(records)
        }
        Err(_) => match (last, last_error) {
            (None, Some(reason)) => {
                warn!(correlation_id = %id, attempts, "Geodetic conversion unreachable: {}", reason);
                PollOutcome::Failed(reason)
            }
            (last, _) => {
                warn!(
                    correlation_id = %id,
                    attempts,
                    timeout_ms = settings.timeout.as_millis() as u64,
                    partial = last.is_some(),
                    "Geodetic conversion timed out"
                );
                PollOutcome::TimedOut(last)
            }
        },
    }
}
