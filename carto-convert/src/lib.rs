//! # carto-convert
//!
//! Conversion de lots de positions de forage entre une projection
//! cartographique, un datum géodésique de référence et WGS84.
//!
//! ## Features
//!
//! - Lots mixtes : coordonnées cartographiques et géodésiques dans un même lot, ordre conservé
//! - Conversion des datums déléguée au service distant (polling borné)
//! - Dégradation gracieuse : rapport `Partial` plutôt qu'une erreur quand le service tarde
//! - CLI simple
//!
//! ## Usage CLI
//!
//! ```bash
//! # Convertir un lot
//! carto-convert convert --batch ./batch.json --catalog ./projections.json --output ./result.json
//!
//! # Afficher la définition PROJ d'une projection
//! carto-convert definition --catalog ./projections.json --id 3f2504e0-4f89-41d3-9a0c-0305e82c3301
//!
//! # Lister les familles de projection
//! carto-convert families
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod poll;
pub mod remote;
pub mod report;

pub use catalog::{MemoryCatalog, ProjectionCatalog};
pub use config::ServiceConfig;
pub use error::ConversionError;
pub use orchestrator::ConversionOrchestrator;
pub use poll::{poll_until_complete, PollOutcome, PollSettings};
pub use remote::{DatumTransformService, GeodeticConversionSet, HttpDatumService};
pub use report::{ConversionReport, ConversionStatus, RemoteStatus};
