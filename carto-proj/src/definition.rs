//! Construction des définitions PROJ
//!
//! Une définition est une chaîne `+proj=... +clé=valeur ...` consommée par le
//! moteur de transformation. Les nombres sont formatés par `Display` de `f64` :
//! séparateur point, pas de séparateur de milliers, indépendant de la locale.

use crate::registry::{descriptor_for, ProjectionParameter};
use crate::types::{ProjectionParameterSet, ProjectionParameters, Spheroid};

/// Mot-clé de la définition géographique (latitude/longitude sur l'ellipsoïde)
pub const GEOGRAPHIC_KEYWORD: &str = "longlat";

/// Construit la définition complète : famille, paramètres utilisés puis ellipsoïde
///
/// Retourne une chaîne vide si le jeu de paramètres ou l'ellipsoïde est absent,
/// ou si la famille n'est pas enregistrée. L'appelant doit traiter une chaîne
/// vide comme un échec.
pub fn build_definition(
    parameter_set: Option<&ProjectionParameterSet>,
    spheroid: Option<&Spheroid>,
) -> String {
    let (Some(parameter_set), Some(spheroid)) = (parameter_set, spheroid) else {
        return String::new();
    };
    let Some(descriptor) = descriptor_for(parameter_set.family) else {
        return String::new();
    };

    let mut fragments = vec![format!("+proj={}", descriptor.keyword)];
    for param in descriptor.used_parameters() {
        push_parameter(&mut fragments, param, &parameter_set.parameters);
    }
    fragments.extend(spheroid_fragments(spheroid));

    fragments.join(" ")
}

/// Construit la partie ellipsoïde (`+a`, `+b`, `+f`, `+rf`, `+e`, `+es`)
///
/// Les champs absents sont omis, jamais complétés.
pub fn build_spheroid_definition(spheroid: Option<&Spheroid>) -> String {
    spheroid
        .map(|s| spheroid_fragments(s).join(" "))
        .unwrap_or_default()
}

/// Définition géographique `+proj=longlat` sur le même ellipsoïde
pub fn build_geographic_definition(spheroid: Option<&Spheroid>) -> String {
    let Some(spheroid) = spheroid else {
        return String::new();
    };
    let mut fragments = vec![format!("+proj={}", GEOGRAPHIC_KEYWORD)];
    fragments.extend(spheroid_fragments(spheroid));
    fragments.join(" ")
}

fn spheroid_fragments(spheroid: &Spheroid) -> Vec<String> {
    [
        ("a", spheroid.semi_major_axis),
        ("b", spheroid.semi_minor_axis),
        ("f", spheroid.flattening),
        ("rf", spheroid.inverse_flattening),
        ("e", spheroid.eccentricity),
        ("es", spheroid.squared_eccentricity),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| numeric(key, v)))
    .collect()
}

fn numeric(key: &str, value: f64) -> String {
    format!("+{}={}", key, value)
}

fn angle(key: &str, radians: f64) -> String {
    numeric(key, radians.to_degrees())
}

fn switch(key: &str) -> String {
    format!("+{}", key)
}

fn push_parameter(out: &mut Vec<String>, param: ProjectionParameter, p: &ProjectionParameters) {
    use ProjectionParameter as P;

    match param {
        P::FalseEastingNorthing => {
            out.extend(p.false_easting.map(|v| numeric("x_0", v)));
            out.extend(p.false_northing.map(|v| numeric("y_0", v)));
        }
        P::LatitudeOrigin => out.extend(p.latitude_origin.map(|v| angle("lat_0", v))),
        P::LongitudeOrigin => out.extend(p.longitude_origin.map(|v| angle("lon_0", v))),
        P::Zone => {
            // Zone hors 1..=60 : repli sur la zone 1
            out.extend(
                p.zone
                    .map(|z| if (1..=60).contains(&z) { z } else { 1 })
                    .map(|z| format!("+zone={}", z)),
            );
        }
        P::South => {
            if p.is_south {
                out.push(switch("south"));
            }
        }
        P::Latitude1 => out.extend(p.latitude1.map(|v| angle("lat_1", v))),
        P::Latitude2 => out.extend(p.latitude2.map(|v| angle("lat_2", v))),
        P::Scaling => out.extend(p.scaling.map(|v| numeric("k_0", v))),
        P::LatitudeTrueScale => out.extend(p.latitude_true_scale.map(|v| angle("lat_ts", v))),
        P::Hyperbolic => {
            if p.is_hyperbolic {
                out.push(switch("hyperbolic"));
            }
        }
        P::ProjectionHeight => out.extend(p.projection_height.map(|v| numeric("h_0", v))),
        P::HeightViewPoint => out.extend(p.height_view_point.map(|v| numeric("h", v))),
        P::Sweep => out.extend(p.sweep.map(|s| format!("+sweep={}", s.as_str()))),
        P::AzimuthCentralLine => out.extend(p.azimuth_central_line.map(|v| angle("azi", v))),
        P::Weight => out.extend(p.weight.map(|v| numeric("W", v))),
        P::Landsat => out.extend(p.landsat.map(|v| format!("+lsat={}", v))),
        P::Path => out.extend(p.path.map(|v| format!("+path={}", v))),
        P::Alpha => out.extend(p.alpha.map(|v| angle("alpha", v))),
        P::Gamma => out.extend(p.gamma.map(|v| angle("gamma", v))),
        P::LongitudeCentralPoint => {
            out.extend(p.longitude_central_point.map(|v| angle("lonc", v)))
        }
        P::Longitude1 => out.extend(p.longitude1.map(|v| angle("lon_1", v))),
        P::Longitude2 => out.extend(p.longitude2.map(|v| angle("lon_2", v))),
        P::NoOffset => {
            if p.no_offset {
                out.push(switch("no_off"));
            }
        }
        P::NoRotation => {
            if p.no_rotation {
                out.push(switch("no_rot"));
            }
        }
        P::AreaNormalizationTransform => out.extend(
            p.area_normalization_transform
                .map(|t| format!("+UVtoST={}", t.as_str())),
        ),
        P::PegLatitude => out.extend(p.peg_latitude.map(|v| angle("plat_0", v))),
        P::PegLongitude => out.extend(p.peg_longitude.map(|v| angle("plon_0", v))),
        P::PegHeading => out.extend(p.peg_heading.map(|v| angle("phdg_0", v))),
        P::N => out.extend(p.n.map(|v| numeric("n", v))),
        P::Q => out.extend(p.q.map(|v| numeric("q", v))),
    }
}
