//! Définition et implémentation des commandes CLI
//!
//! - `convert` : conversion d'un lot JSON
//! - `definition` : définition PROJ d'une projection du catalogue
//! - `families` : familles de projection connues

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carto_proj::registry::{all_families, descriptor_for};
use carto_proj::{ConversionBatch, ProjEngine};
use clap::{Args, Subcommand};
use tracing::{info, warn};
use uuid::Uuid;

use carto_convert::{ConversionOrchestrator, HttpDatumService, MemoryCatalog, ServiceConfig};

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a batch of survey coordinates
    Convert {
        /// Path to the batch JSON file
        #[arg(short, long)]
        batch: PathBuf,

        /// Path to the projection catalog (JSON array)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Output file for the converted batch (défaut : stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the conversion report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Print the PROJ definition of a catalog projection
    Definition {
        /// Path to the projection catalog (JSON array)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Projection identifier
        #[arg(long)]
        id: Uuid,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// List projection families, keywords and used parameters
    Families,
}

/// Accès au service de datum
#[derive(Args)]
pub struct ServiceArgs {
    /// Datum service base URL (défaut : env GEODETIC_DATUM_HOST_URL)
    #[arg(long)]
    pub datum_service: Option<String>,

    /// Service configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ServiceArgs {
    /// Fichier de config, sinon environnement ; l'URL en ligne de commande l'emporte
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::load(path)?,
            None => ServiceConfig::from_env(),
        };
        if let Some(url) = &self.datum_service {
            config.datum_service_url = url.clone();
        }
        Ok(config)
    }
}

/// Exécute la commande convert
pub async fn cmd_convert(
    batch_path: &Path,
    catalog_path: &Path,
    output: Option<&Path>,
    report_path: Option<&Path>,
    config: &ServiceConfig,
) -> Result<()> {
    if !carto_proj::engine::is_available() {
        warn!("Built without the 'reproject' feature: local projections will fail");
    }

    let catalog = MemoryCatalog::load(catalog_path)?;
    let content = std::fs::read_to_string(batch_path)
        .context(format!("Failed to read batch file: {}", batch_path.display()))?;
    let mut batch: ConversionBatch =
        serde_json::from_str(&content).context("Failed to parse batch JSON")?;

    let service = HttpDatumService::new(config)?;
    info!(url = %service.base_url(), "Datum service");

    let orchestrator =
        ConversionOrchestrator::new(ProjEngine::new(), catalog, service, config.poll_settings());
    let report = orchestrator
        .convert(&mut batch)
        .await
        .context("Batch conversion failed")?;

    let json = serde_json::to_string_pretty(&batch)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .context(format!("Failed to write output file: {}", path.display()))?;
            report.display();
        }
        None => {
            println!("{}", json);
            info!("{}", report.summary());
        }
    }

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    Ok(())
}

/// Exécute la commande definition
pub async fn cmd_definition(catalog_path: &Path, id: Uuid, config: &ServiceConfig) -> Result<()> {
    let catalog = MemoryCatalog::load(catalog_path)?;
    let service = HttpDatumService::new(config)?;
    let orchestrator =
        ConversionOrchestrator::new(ProjEngine::new(), catalog, service, config.poll_settings());

    let definition = orchestrator
        .definition(id)
        .await
        .context(format!("Failed to build definition for projection {}", id))?;
    println!("{}", definition);
    Ok(())
}

/// Exécute la commande families
pub fn cmd_families() {
    for family in all_families() {
        let Some(descriptor) = descriptor_for(family) else {
            continue;
        };
        let params: Vec<String> = descriptor
            .used_parameters()
            .map(|p| format!("{:?}", p))
            .collect();
        println!(
            "{:<10} {:<36} {}",
            descriptor.keyword,
            format!("{:?}", family),
            params.join(", ")
        );
    }
}
