//! Configuration du service de conversion

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::poll::PollSettings;

/// Configuration de l'accès au service de datum et du polling
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// URL racine du service de datum (ex : `https://host/`)
    pub datum_service_url: String,

    /// Intervalle entre deux interrogations du service (ms)
    pub poll_interval_ms: u64,

    /// Durée maximale d'attente d'une conversion distante (ms)
    pub poll_timeout_ms: u64,

    /// Délai maximal d'une requête HTTP (s)
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            datum_service_url: "http://localhost:5000/".to_string(),
            poll_interval_ms: 200,
            poll_timeout_ms: 5000,
            request_timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    /// Configuration depuis les variables d'environnement, avec valeurs par défaut
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            datum_service_url: std::env::var("GEODETIC_DATUM_HOST_URL")
                .unwrap_or(defaults.datum_service_url),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
            poll_timeout_ms: std::env::var("POLL_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.poll_timeout_ms),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Paramètres de polling dérivés
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
