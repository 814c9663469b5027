//! Registre des familles de projection
//!
//! Chaque famille est associée au mot-clé PROJ (`+proj=...`) et à la liste
//! des paramètres qu'elle exploite. La table est un `static` construit à la
//! compilation : aucune initialisation paresseuse, lecture sans verrou.

use serde::{Deserialize, Serialize};

/// Famille de projection cartographique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectionFamily {
    /// Valeur par défaut côté JSON, absente du registre
    #[default]
    Unknown,
    UTM,
    LambertConformalConic,
    LambertConformalConicAlternative,
    LambertEqualAreaConic,
    TransverseMercator,
    Mercator,
    Polyconic,
    ModifiedStereographicAlaska,
    AlbersEqualArea,
    AzimuthalEquidistant,
    Aitoff,
    Bonne,
    CalCoopOceanFish,
    Cassini,
    CentralCylinder,
    EqualAreaCylindrical,
    EquidistantCylindrical,
    EquidistantConic,
    GeostationarySatelliteView,
    GeneralSinusoidalSeries,
    ModifiedStereographic48US,
    ModifiedStereographic50US,
    InternationalMapWorldPolyconic,
    Laborde,
    LambertAzimuthalEqualArea,
    Lagrange,
    LeeOblatedStereographic,
    SpaceObliqueLandsat,
    McBrydeThomasFlatPolarSinusoidal,
    MillerOblatedStereographic,
    SpaceObliqueMISR,
    NewZealandMapGrid,
    ObliqueMercator,
    Orthographic,
    QuadrilateralizedSphericalCube,
    RoussilheStereographic,
    S2,
    SphericalCrossTrackHeight,
    Sinusoidal,
    SwissObliqueMercator,
    Stereographic,
    ObliqueStereographicAlternative,
    UniversalPolarStereographic,
    UrmaevV,
    WebMercator,
}

/// Paramètre optionnel d'une projection
///
/// L'ordre de `ALL` est l'ordre d'émission dans la définition PROJ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionParameter {
    /// `+x_0` et `+y_0` (un seul drapeau pour les deux)
    FalseEastingNorthing,
    LatitudeOrigin,
    LongitudeOrigin,
    Zone,
    South,
    Latitude1,
    Latitude2,
    Scaling,
    LatitudeTrueScale,
    Hyperbolic,
    ProjectionHeight,
    HeightViewPoint,
    Sweep,
    AzimuthCentralLine,
    Weight,
    Landsat,
    Path,
    Alpha,
    Gamma,
    LongitudeCentralPoint,
    Longitude1,
    Longitude2,
    NoOffset,
    NoRotation,
    AreaNormalizationTransform,
    PegLatitude,
    PegLongitude,
    PegHeading,
    N,
    Q,
}

impl ProjectionParameter {
    pub const ALL: [ProjectionParameter; 30] = [
        Self::FalseEastingNorthing,
        Self::LatitudeOrigin,
        Self::LongitudeOrigin,
        Self::Zone,
        Self::South,
        Self::Latitude1,
        Self::Latitude2,
        Self::Scaling,
        Self::LatitudeTrueScale,
        Self::Hyperbolic,
        Self::ProjectionHeight,
        Self::HeightViewPoint,
        Self::Sweep,
        Self::AzimuthCentralLine,
        Self::Weight,
        Self::Landsat,
        Self::Path,
        Self::Alpha,
        Self::Gamma,
        Self::LongitudeCentralPoint,
        Self::Longitude1,
        Self::Longitude2,
        Self::NoOffset,
        Self::NoRotation,
        Self::AreaNormalizationTransform,
        Self::PegLatitude,
        Self::PegLongitude,
        Self::PegHeading,
        Self::N,
        Self::Q,
    ];

    /// Clés PROJ produites par ce paramètre
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            Self::FalseEastingNorthing => &["x_0", "y_0"],
            Self::LatitudeOrigin => &["lat_0"],
            Self::LongitudeOrigin => &["lon_0"],
            Self::Zone => &["zone"],
            Self::South => &["south"],
            Self::Latitude1 => &["lat_1"],
            Self::Latitude2 => &["lat_2"],
            Self::Scaling => &["k_0"],
            Self::LatitudeTrueScale => &["lat_ts"],
            Self::Hyperbolic => &["hyperbolic"],
            Self::ProjectionHeight => &["h_0"],
            Self::HeightViewPoint => &["h"],
            Self::Sweep => &["sweep"],
            Self::AzimuthCentralLine => &["azi"],
            Self::Weight => &["W"],
            Self::Landsat => &["lsat"],
            Self::Path => &["path"],
            Self::Alpha => &["alpha"],
            Self::Gamma => &["gamma"],
            Self::LongitudeCentralPoint => &["lonc"],
            Self::Longitude1 => &["lon_1"],
            Self::Longitude2 => &["lon_2"],
            Self::NoOffset => &["no_off"],
            Self::NoRotation => &["no_rot"],
            Self::AreaNormalizationTransform => &["UVtoST"],
            Self::PegLatitude => &["plat_0"],
            Self::PegLongitude => &["plon_0"],
            Self::PegHeading => &["phdg_0"],
            Self::N => &["n"],
            Self::Q => &["q"],
        }
    }
}

/// Description immuable d'une famille : mot-clé PROJ et paramètres utilisés
#[derive(Debug)]
pub struct ProjectionDescriptor {
    /// Famille décrite
    pub family: ProjectionFamily,
    /// Valeur de `+proj=`
    pub keyword: &'static str,
    params: &'static [ProjectionParameter],
}

impl ProjectionDescriptor {
    /// Indique si la famille exploite ce paramètre
    pub fn uses(&self, param: ProjectionParameter) -> bool {
        self.params.contains(&param)
    }

    /// Paramètres utilisés, dans l'ordre d'émission
    pub fn used_parameters(&self) -> impl Iterator<Item = ProjectionParameter> + '_ {
        ProjectionParameter::ALL
            .into_iter()
            .filter(move |p| self.uses(*p))
    }
}

use ProjectionFamily as F;
use ProjectionParameter as P;

const fn entry(
    family: ProjectionFamily,
    keyword: &'static str,
    params: &'static [ProjectionParameter],
) -> ProjectionDescriptor {
    ProjectionDescriptor {
        family,
        keyword,
        params,
    }
}

static DESCRIPTORS: [ProjectionDescriptor; 45] = [
    entry(F::UTM, "utm", &[P::Zone, P::South]),
    entry(
        F::LambertConformalConic,
        "lcc",
        &[
            P::LatitudeOrigin,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
            P::Latitude1,
            P::Latitude2,
            P::Scaling,
        ],
    ),
    entry(
        F::LambertConformalConicAlternative,
        "lcca",
        &[P::LatitudeOrigin, P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::LambertEqualAreaConic,
        "leac",
        &[P::Latitude1, P::South, P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::TransverseMercator,
        "tmerc",
        &[
            P::LongitudeOrigin,
            P::LatitudeOrigin,
            P::Scaling,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::Mercator,
        "merc",
        &[
            P::LatitudeTrueScale,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
            P::Scaling,
        ],
    ),
    entry(F::Polyconic, "poly", &[P::LongitudeOrigin, P::FalseEastingNorthing]),
    entry(F::ModifiedStereographicAlaska, "alsk", &[P::FalseEastingNorthing]),
    entry(
        F::AlbersEqualArea,
        "aea",
        &[
            P::Latitude1,
            P::Latitude2,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::AzimuthalEquidistant,
        "aeqd",
        &[P::LatitudeOrigin, P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(F::Aitoff, "aitoff", &[P::LongitudeOrigin, P::FalseEastingNorthing]),
    entry(
        F::Bonne,
        "bonne",
        &[P::Latitude1, P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(F::CalCoopOceanFish, "calcofi", &[]),
    entry(
        F::Cassini,
        "cass",
        &[
            P::LatitudeOrigin,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
            P::Hyperbolic,
        ],
    ),
    entry(F::CentralCylinder, "cc", &[P::LongitudeOrigin, P::FalseEastingNorthing]),
    entry(
        F::EqualAreaCylindrical,
        "cea",
        &[
            P::LatitudeTrueScale,
            P::LongitudeOrigin,
            P::Scaling,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::EquidistantCylindrical,
        "eqc",
        &[
            P::LongitudeOrigin,
            P::LatitudeOrigin,
            P::LatitudeTrueScale,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::EquidistantConic,
        "eqdc",
        &[
            P::Latitude1,
            P::Latitude2,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::GeostationarySatelliteView,
        "geos",
        &[
            P::HeightViewPoint,
            P::Sweep,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::GeneralSinusoidalSeries,
        "gn_sinu",
        &[P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(F::ModifiedStereographic48US, "gs48", &[P::FalseEastingNorthing]),
    entry(F::ModifiedStereographic50US, "gs50", &[P::FalseEastingNorthing]),
    entry(
        F::InternationalMapWorldPolyconic,
        "imw_p",
        &[
            P::Latitude1,
            P::Latitude2,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::Laborde,
        "labrd",
        &[
            P::LongitudeOrigin,
            P::LatitudeOrigin,
            P::AzimuthCentralLine,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::LambertAzimuthalEqualArea,
        "laea",
        &[P::LongitudeOrigin, P::LatitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::Lagrange,
        "lagrng",
        &[
            P::Weight,
            P::LongitudeOrigin,
            P::Latitude1,
            P::FalseEastingNorthing,
        ],
    ),
    entry(F::LeeOblatedStereographic, "lee_os", &[P::FalseEastingNorthing]),
    entry(
        F::SpaceObliqueLandsat,
        "lsat",
        &[
            P::Landsat,
            P::Path,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::McBrydeThomasFlatPolarSinusoidal,
        "mbtfps",
        &[P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(F::MillerOblatedStereographic, "mil_os", &[P::FalseEastingNorthing]),
    entry(
        F::SpaceObliqueMISR,
        "misrsom",
        &[P::Path, P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(F::NewZealandMapGrid, "nzmg", &[]),
    entry(
        F::ObliqueMercator,
        "omerc",
        &[
            P::Alpha,
            P::Gamma,
            P::LongitudeCentralPoint,
            P::LatitudeOrigin,
            P::Longitude1,
            P::Latitude1,
            P::Longitude2,
            P::Latitude2,
            P::NoRotation,
            P::NoOffset,
            P::Scaling,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::Orthographic,
        "ortho",
        &[P::LongitudeOrigin, P::LatitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::QuadrilateralizedSphericalCube,
        "qsc",
        &[P::LongitudeOrigin, P::LatitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::RoussilheStereographic,
        "rouss",
        &[P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::S2,
        "s2",
        &[
            P::LongitudeOrigin,
            P::LatitudeOrigin,
            P::AreaNormalizationTransform,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::SphericalCrossTrackHeight,
        "sch",
        &[
            P::PegLatitude,
            P::PegLongitude,
            P::PegHeading,
            P::ProjectionHeight,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(F::Sinusoidal, "sinu", &[P::LongitudeOrigin, P::FalseEastingNorthing]),
    entry(
        F::SwissObliqueMercator,
        "somerc",
        &[P::LongitudeOrigin, P::Scaling, P::FalseEastingNorthing],
    ),
    entry(
        F::Stereographic,
        "stere",
        &[
            P::LatitudeOrigin,
            P::LatitudeTrueScale,
            P::Scaling,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(
        F::ObliqueStereographicAlternative,
        "sterea",
        &[P::LongitudeOrigin, P::LatitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::UniversalPolarStereographic,
        "ups",
        &[P::South, P::LongitudeOrigin, P::FalseEastingNorthing],
    ),
    entry(
        F::UrmaevV,
        "urm5",
        &[
            P::N,
            P::Q,
            P::Alpha,
            P::LongitudeOrigin,
            P::FalseEastingNorthing,
        ],
    ),
    entry(F::WebMercator, "webmerc", &[P::LongitudeOrigin, P::FalseEastingNorthing]),
];

/// Retourne la description d'une famille, `None` si elle n'est pas enregistrée
pub fn descriptor_for(family: ProjectionFamily) -> Option<&'static ProjectionDescriptor> {
    DESCRIPTORS.iter().find(|d| d.family == family)
}

/// Toutes les familles enregistrées
pub fn all_families() -> impl Iterator<Item = ProjectionFamily> {
    DESCRIPTORS.iter().map(|d| d.family)
}

impl ProjectionFamily {
    /// Mot-clé PROJ de la famille (`None` pour `Unknown`)
    pub fn keyword(self) -> Option<&'static str> {
        descriptor_for(self).map(|d| d.keyword)
    }

    /// Retrouve une famille depuis son mot-clé PROJ (`utm`, `tmerc`, ...)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().trim_start_matches("+proj=");
        DESCRIPTORS
            .iter()
            .find(|d| d.keyword.eq_ignore_ascii_case(keyword))
            .map(|d| d.family)
    }
}
