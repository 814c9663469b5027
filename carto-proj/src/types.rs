//! Types de données pour le crate carto-proj
//!
//! Les structures publiques reprennent le format JSON échangé avec les autres
//! services (champs en PascalCase). Les vues typées (`CoordinateSource`,
//! `GeodeticSource`) sont dérivées de ces enregistrements plats.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::ProjectionFamily;

/// Identifiant d'un enregistrement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(rename = "ID")]
    pub id: Uuid,
}

impl MetaInfo {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

/// Ellipsoïde de référence
///
/// N'importe quel sous-ensemble des champs peut être renseigné ;
/// aucune valeur par défaut n'est déduite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Spheroid {
    /// Demi-grand axe en mètres (`+a`)
    pub semi_major_axis: Option<f64>,
    /// Demi-petit axe en mètres (`+b`)
    pub semi_minor_axis: Option<f64>,
    /// Aplatissement (`+f`)
    pub flattening: Option<f64>,
    /// Inverse de l'aplatissement (`+rf`)
    pub inverse_flattening: Option<f64>,
    /// Excentricité (`+e`)
    pub eccentricity: Option<f64>,
    /// Excentricité au carré (`+es`)
    pub squared_eccentricity: Option<f64>,
}

impl Spheroid {
    /// Ellipsoïde WGS84 défini par `a` et `1/f`
    pub fn wgs84() -> Self {
        Self {
            semi_major_axis: Some(6378137.0),
            inverse_flattening: Some(298.257223563),
            ..Default::default()
        }
    }
}

/// Datum géodésique : un identifiant et son ellipsoïde
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeodeticDatum {
    pub meta_info: Option<MetaInfo>,
    pub name: Option<String>,
    pub spheroid: Option<Spheroid>,
}

/// Axe de balayage de l'instrument (projection `geos`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepAxis {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
}

impl SweepAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

/// Transformation de normalisation d'aire (projection `s2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AreaNormalization {
    #[default]
    None,
    Linear,
    Quadratic,
    Tangent,
}

impl AreaNormalization {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Tangent => "tangent",
        }
    }
}

/// Valeurs des paramètres d'une projection
///
/// Les angles sont en radians. Seuls les paramètres déclarés par la famille
/// (voir `registry`) sont pris en compte, les autres sont ignorés.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProjectionParameters {
    pub latitude_origin: Option<f64>,
    /// Premier parallèle standard
    pub latitude1: Option<f64>,
    /// Second parallèle standard
    pub latitude2: Option<f64>,
    pub latitude_true_scale: Option<f64>,
    pub longitude_origin: Option<f64>,
    /// Facteur d'échelle
    pub scaling: Option<f64>,
    pub false_easting: Option<f64>,
    pub false_northing: Option<f64>,
    /// Zone UTM (1 à 60)
    pub zone: Option<u32>,
    pub is_south: bool,
    pub is_hyperbolic: bool,
    pub projection_height: Option<f64>,
    pub height_view_point: Option<f64>,
    pub sweep: Option<SweepAxis>,
    pub azimuth_central_line: Option<f64>,
    pub weight: Option<f64>,
    /// Numéro du satellite Landsat (1 à 5)
    pub landsat: Option<i32>,
    pub path: Option<i32>,
    pub alpha: Option<f64>,
    pub gamma: Option<f64>,
    pub longitude1: Option<f64>,
    pub longitude2: Option<f64>,
    pub longitude_central_point: Option<f64>,
    pub no_offset: bool,
    pub no_rotation: bool,
    pub area_normalization_transform: Option<AreaNormalization>,
    pub peg_latitude: Option<f64>,
    pub peg_longitude: Option<f64>,
    pub peg_heading: Option<f64>,
    pub n: Option<f64>,
    pub q: Option<f64>,
}

/// Projection cartographique enregistrée : famille, paramètres et datum de référence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectionParameterSet {
    pub meta_info: MetaInfo,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "ProjectionType")]
    pub family: ProjectionFamily,
    #[serde(rename = "GeodeticDatumID", default)]
    pub datum_id: Option<Uuid>,
    #[serde(flatten)]
    pub parameters: ProjectionParameters,
}

impl ProjectionParameterSet {
    pub fn new(family: ProjectionFamily, datum_id: Uuid) -> Self {
        Self {
            meta_info: MetaInfo::new(Uuid::new_v4()),
            name: None,
            family,
            datum_id: Some(datum_id),
            parameters: ProjectionParameters::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.meta_info.id
    }
}

/// Code spatial hiérarchique (octree) sur 128 bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpatialCode {
    pub code_high: u64,
    pub code_low: u64,
}

/// Coordonnée géodésique dans le datum de référence, en WGS84 et sous forme de code spatial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeodeticCoordinate {
    /// Latitude dans le datum de référence (radians)
    pub latitude_datum: Option<f64>,
    /// Longitude dans le datum de référence (radians)
    pub longitude_datum: Option<f64>,
    pub vertical_depth_datum: Option<f64>,
    #[serde(rename = "LatitudeWGS84")]
    pub latitude_wgs84: Option<f64>,
    #[serde(rename = "LongitudeWGS84")]
    pub longitude_wgs84: Option<f64>,
    #[serde(rename = "VerticalDepthWGS84")]
    pub vertical_depth_wgs84: Option<f64>,
    #[serde(rename = "OctreeCode")]
    pub spatial_code: Option<SpatialCode>,
    #[serde(rename = "OctreeDepth")]
    pub spatial_code_depth: u32,
}

impl GeodeticCoordinate {
    /// Triplet (latitude, longitude, profondeur) dans le datum de référence
    pub fn datum_triple(&self) -> Option<(f64, f64, f64)> {
        Some((
            self.latitude_datum?,
            self.longitude_datum?,
            self.vertical_depth_datum?,
        ))
    }

    /// Triplet (latitude, longitude, profondeur) en WGS84
    pub fn wgs84_triple(&self) -> Option<(f64, f64, f64)> {
        Some((
            self.latitude_wgs84?,
            self.longitude_wgs84?,
            self.vertical_depth_wgs84?,
        ))
    }

    /// Code spatial présent avec une profondeur non nulle
    pub fn has_spatial_code(&self) -> bool {
        self.spatial_code.is_some() && self.spatial_code_depth > 0
    }

    /// Les trois représentations sont renseignées
    ///
    /// Le code spatial doit en plus avoir des bits de poids fort non nuls.
    pub fn is_complete(&self) -> bool {
        self.datum_triple().is_some()
            && self.wgs84_triple().is_some()
            && self.spatial_code_depth > 0
            && self.spatial_code.is_some_and(|c| c.code_high > 0)
    }

    /// Représentation d'entrée, par ordre de priorité : datum, WGS84, code spatial
    pub fn source(&self) -> Option<GeodeticSource> {
        if let Some((latitude, longitude, vertical_depth)) = self.datum_triple() {
            return Some(GeodeticSource::Datum {
                latitude,
                longitude,
                vertical_depth,
            });
        }
        if let Some((latitude, longitude, vertical_depth)) = self.wgs84_triple() {
            return Some(GeodeticSource::Wgs84 {
                latitude,
                longitude,
                vertical_depth,
            });
        }
        match self.spatial_code {
            Some(code) if self.spatial_code_depth > 0 => Some(GeodeticSource::SpatialCode {
                code,
                depth: self.spatial_code_depth,
            }),
            _ => None,
        }
    }
}

/// Représentation géodésique fournie par l'appelant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeodeticSource {
    Datum {
        latitude: f64,
        longitude: f64,
        vertical_depth: f64,
    },
    Wgs84 {
        latitude: f64,
        longitude: f64,
        vertical_depth: f64,
    },
    SpatialCode { code: SpatialCode, depth: u32 },
}

/// Origine d'une coordonnée : cartographique ou géodésique
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateSource {
    Cartographic {
        northing: f64,
        easting: f64,
        vertical_depth: f64,
    },
    Geodetic(GeodeticSource),
}

/// Coordonnée cartographique (nord, est, profondeur verticale)
///
/// Par convention `vertical_depth` est égale à
/// `geodetic_coordinate.vertical_depth_datum` dès que les deux sont connues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CartographicCoordinate {
    pub northing: Option<f64>,
    pub easting: Option<f64>,
    pub vertical_depth: Option<f64>,
    pub geodetic_coordinate: Option<GeodeticCoordinate>,
    /// Convergence du quadrillage dans le datum de référence (radians)
    pub grid_convergence_datum: Option<f64>,
}

impl CartographicCoordinate {
    /// Coordonnée définie par ses valeurs cartographiques
    pub fn from_grid(northing: f64, easting: f64, vertical_depth: f64) -> Self {
        Self {
            northing: Some(northing),
            easting: Some(easting),
            vertical_depth: Some(vertical_depth),
            ..Default::default()
        }
    }

    /// Coordonnée définie par une position géodésique
    pub fn from_geodetic(geodetic: GeodeticCoordinate) -> Self {
        Self {
            geodetic_coordinate: Some(geodetic),
            ..Default::default()
        }
    }

    /// Classe la coordonnée ; `None` si elle n'est ni cartographique ni géodésique
    pub fn source(&self) -> Option<CoordinateSource> {
        if let (Some(northing), Some(easting), Some(vertical_depth)) =
            (self.northing, self.easting, self.vertical_depth)
        {
            return Some(CoordinateSource::Cartographic {
                northing,
                easting,
                vertical_depth,
            });
        }
        self.geodetic_coordinate
            .as_ref()
            .and_then(GeodeticCoordinate::source)
            .map(CoordinateSource::Geodetic)
    }
}

/// Lot de coordonnées à convertir pour une projection donnée
///
/// L'ordre des coordonnées est significatif et conservé de bout en bout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionBatch {
    #[serde(rename = "MetaInfo", default)]
    pub meta_info: Option<MetaInfo>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "CartographicProjectionID")]
    pub projection_id: Uuid,
    #[serde(rename = "CartographicCoordinateList", default)]
    pub coordinates: Vec<CartographicCoordinate>,
}

impl ConversionBatch {
    pub fn new(projection_id: Uuid, coordinates: Vec<CartographicCoordinate>) -> Self {
        Self {
            meta_info: None,
            name: None,
            projection_id,
            coordinates,
        }
    }
}
