//! # carto-proj
//!
//! Projections cartographiques pour les levés de forage : registre des familles
//! de projection, construction des définitions PROJ et conversion entre
//! coordonnées cartographiques (nord, est) et géodésiques (latitude, longitude).
//!
//! ## Features
//!
//! - Registre statique de 45 familles de projection et de leurs paramètres
//! - Définitions textuelles au format PROJ (`+proj=utm +zone=32 +a=... +rf=...`)
//! - Conversion directe, inverse et convergence du quadrillage
//! - Moteur PROJ (feature `reproject`, activé par défaut), interchangeable via `TransformEngine`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carto_proj::{CoordinateConverter, ProjEngine, ProjectionFamily, ProjectionParameterSet, Spheroid};
//!
//! let mut set = ProjectionParameterSet::new(ProjectionFamily::UTM, datum_id);
//! set.parameters.zone = Some(32);
//!
//! let converter = CoordinateConverter::new(ProjEngine::new(), &set, &Spheroid::wgs84())?;
//! let (lat, lon) = converter.inverse(6_700_000.0, 300_000.0)?.unwrap();
//! ```

pub mod converter;
pub mod definition;
pub mod engine;
pub mod error;
pub mod registry;
pub mod types;

pub use converter::{CoordinateConverter, DEFAULT_CONVERGENCE_STEP};
pub use definition::{build_definition, build_geographic_definition, build_spheroid_definition};
pub use engine::{ProjEngine, TransformEngine};
pub use error::ProjectionError;
pub use registry::{descriptor_for, ProjectionDescriptor, ProjectionFamily, ProjectionParameter};
pub use types::{
    AreaNormalization, CartographicCoordinate, ConversionBatch, CoordinateSource, GeodeticCoordinate,
    GeodeticDatum, GeodeticSource, MetaInfo, ProjectionParameterSet, ProjectionParameters,
    SpatialCode, Spheroid, SweepAxis,
};
