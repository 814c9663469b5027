//! Conversion entre coordonnées cartographiques et géodésiques
//!
//! - `inverse` : (nord, est) → (latitude, longitude) dans le datum de la projection
//! - `forward` : (latitude, longitude) → (nord, est)
//! - `grid_convergence` : angle entre le nord du quadrillage et le nord géographique
//!
//! Chaque opération existe en version par lot (`*_many`), qui n'appelle le
//! moteur qu'une fois quel que soit le nombre de points.
//!
//! Les angles sont en radians côté API, en degrés côté moteur.

use std::f64::consts::PI;

use crate::definition::{build_definition, build_geographic_definition};
use crate::engine::TransformEngine;
use crate::error::ProjectionError;
use crate::registry::descriptor_for;
use crate::types::{ProjectionParameterSet, Spheroid};

/// Pas de latitude pour le calcul de la convergence : 0.1° en radians
pub const DEFAULT_CONVERGENCE_STEP: f64 = 0.1 * PI / 180.0;

/// Convertisseur pour une projection et un ellipsoïde donnés
///
/// Sans état mutable : peut être partagé entre threads si le moteur le permet.
pub struct CoordinateConverter<E> {
    engine: E,
    projected: String,
    geographic: String,
}

impl<E: TransformEngine> CoordinateConverter<E> {
    /// Prépare les deux définitions (projetée et géographique)
    pub fn new(
        engine: E,
        parameter_set: &ProjectionParameterSet,
        spheroid: &Spheroid,
    ) -> Result<Self, ProjectionError> {
        if descriptor_for(parameter_set.family).is_none() {
            return Err(ProjectionError::UnknownFamily(parameter_set.family));
        }

        let projected = build_definition(Some(parameter_set), Some(spheroid));
        if projected.is_empty() {
            return Err(ProjectionError::EmptyDefinition(format!(
                "projection {}",
                parameter_set.id()
            )));
        }
        let geographic = build_geographic_definition(Some(spheroid));

        Ok(Self {
            engine,
            projected,
            geographic,
        })
    }

    /// Définition projetée (famille + paramètres + ellipsoïde)
    pub fn definition(&self) -> &str {
        &self.projected
    }

    /// Définition géographique sur le même ellipsoïde
    pub fn geographic_definition(&self) -> &str {
        &self.geographic
    }

    /// (nord, est) → (latitude, longitude) en radians
    pub fn inverse(&self, northing: f64, easting: f64) -> Result<Option<(f64, f64)>, ProjectionError> {
        Ok(self
            .inverse_many(&[(northing, easting)])?
            .into_iter()
            .next()
            .flatten())
    }

    /// Version par lot de `inverse`, indice pour indice
    pub fn inverse_many(
        &self,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        let planar: Vec<(f64, f64)> = points
            .iter()
            .map(|&(northing, easting)| (easting, northing))
            .collect();

        let out = self.run(&self.projected, &self.geographic, &planar)?;

        Ok(out
            .into_iter()
            .map(|p| p.map(|(lon, lat)| (lat.to_radians(), lon.to_radians())))
            .collect())
    }

    /// (latitude, longitude) en radians → (nord, est) dans l'unité de la projection
    pub fn forward(&self, latitude: f64, longitude: f64) -> Result<Option<(f64, f64)>, ProjectionError> {
        Ok(self
            .forward_many(&[(latitude, longitude)])?
            .into_iter()
            .next()
            .flatten())
    }

    /// Version par lot de `forward`, indice pour indice
    pub fn forward_many(
        &self,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        let geographic: Vec<(f64, f64)> = points
            .iter()
            .map(|&(lat, lon)| (lon.to_degrees(), lat.to_degrees()))
            .collect();

        let out = self.run(&self.geographic, &self.projected, &geographic)?;

        Ok(out
            .into_iter()
            .map(|p| p.map(|(easting, northing)| (northing, easting)))
            .collect())
    }

    /// Convergence du quadrillage au point (radians, dans ]-π, π])
    ///
    /// Différence finie du premier ordre : la latitude est décalée de
    /// `DEFAULT_CONVERGENCE_STEP`. La précision se dégrade près des pôles et
    /// des limites de la projection.
    pub fn grid_convergence(
        &self,
        northing: f64,
        easting: f64,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<f64>, ProjectionError> {
        self.grid_convergence_with_step(
            northing,
            easting,
            latitude,
            longitude,
            DEFAULT_CONVERGENCE_STEP,
        )
    }

    /// `grid_convergence` avec un pas de latitude explicite (radians)
    pub fn grid_convergence_with_step(
        &self,
        northing: f64,
        easting: f64,
        latitude: f64,
        longitude: f64,
        step: f64,
    ) -> Result<Option<f64>, ProjectionError> {
        Ok(self
            .grid_convergence_many_with_step(&[(northing, easting, latitude, longitude)], step)?
            .into_iter()
            .next()
            .flatten())
    }

    /// Version par lot de `grid_convergence` : `(nord, est, latitude, longitude)`
    ///
    /// Tous les points décalés passent par un seul appel au moteur. Un point
    /// dont une composante n'est pas finie donne `None`.
    pub fn grid_convergence_many(
        &self,
        points: &[(f64, f64, f64, f64)],
    ) -> Result<Vec<Option<f64>>, ProjectionError> {
        self.grid_convergence_many_with_step(points, DEFAULT_CONVERGENCE_STEP)
    }

    /// `grid_convergence_many` avec un pas de latitude explicite (radians)
    pub fn grid_convergence_many_with_step(
        &self,
        points: &[(f64, f64, f64, f64)],
        step: f64,
    ) -> Result<Vec<Option<f64>>, ProjectionError> {
        let shifted: Vec<(f64, f64)> = points
            .iter()
            .map(|&(_, _, latitude, longitude)| (latitude + step, longitude))
            .collect();
        let planar = self.forward_many(&shifted)?;

        Ok(points
            .iter()
            .zip(planar)
            .map(|(&(northing, easting, _, _), p)| {
                let (northing2, easting2) = p?;
                (northing.is_finite() && easting.is_finite())
                    .then(|| (easting2 - easting).atan2(northing2 - northing))
            })
            .collect())
    }

    /// Appelle le moteur en écartant les entrées non finies
    fn run(
        &self,
        from: &str,
        to: &str,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        let valid: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
            .map(|(i, _)| i)
            .collect();

        let mut result = vec![None; points.len()];
        if valid.is_empty() {
            return Ok(result);
        }

        let input: Vec<(f64, f64)> = valid.iter().map(|&i| points[i]).collect();
        let output = self.engine.reproject(from, to, &input)?;
        if output.len() != input.len() {
            return Err(ProjectionError::engine(
                to,
                format!("expected {} points, got {}", input.len(), output.len()),
            ));
        }

        for (i, p) in valid.into_iter().zip(output) {
            result[i] = p.filter(|(x, y)| x.is_finite() && y.is_finite());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProjectionFamily;
    use uuid::Uuid;

    /// Moteur déterministe : grille plane tournée d'un angle fixe
    ///
    /// est  = K (lon cos θ + lat sin θ) + E0
    /// nord = K (-lon sin θ + lat cos θ)
    struct RotatedGridEngine {
        angle: f64,
    }

    const K: f64 = 111_000.0;
    const E0: f64 = 500_000.0;

    impl TransformEngine for RotatedGridEngine {
        fn reproject(
            &self,
            from: &str,
            to: &str,
            points: &[(f64, f64)],
        ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
            if !from.starts_with("+proj=") || !to.starts_with("+proj=") {
                return Err(ProjectionError::engine(from, "malformed definition"));
            }
            let (s, c) = self.angle.sin_cos();
            let forward = from.starts_with("+proj=longlat");

            Ok(points
                .iter()
                .map(|&(x, y)| {
                    if forward {
                        let (lon, lat) = (x, y);
                        (lat.abs() <= 90.0)
                            .then(|| (K * (lon * c + lat * s) + E0, K * (-lon * s + lat * c)))
                    } else {
                        let (e, n) = (x - E0, y);
                        let lon = (e * c - n * s) / K;
                        let lat = (e * s + n * c) / K;
                        (lat.abs() <= 90.0).then_some((lon, lat))
                    }
                })
                .collect())
        }
    }

    fn utm32() -> ProjectionParameterSet {
        let mut set = ProjectionParameterSet::new(ProjectionFamily::UTM, Uuid::new_v4());
        set.parameters.zone = Some(32);
        set
    }

    fn converter(angle: f64) -> CoordinateConverter<RotatedGridEngine> {
        CoordinateConverter::new(RotatedGridEngine { angle }, &utm32(), &Spheroid::wgs84()).unwrap()
    }

    #[test]
    fn test_definitions() {
        let conv = converter(0.0);
        assert_eq!(
            conv.definition(),
            "+proj=utm +zone=32 +a=6378137 +rf=298.257223563"
        );
        assert_eq!(
            conv.geographic_definition(),
            "+proj=longlat +a=6378137 +rf=298.257223563"
        );
    }

    #[test]
    fn test_unknown_family_rejected() {
        let set = ProjectionParameterSet::new(ProjectionFamily::Unknown, Uuid::new_v4());
        let result = CoordinateConverter::new(
            RotatedGridEngine { angle: 0.0 },
            &set,
            &Spheroid::wgs84(),
        );
        assert!(matches!(result, Err(ProjectionError::UnknownFamily(_))));
    }

    #[test]
    fn test_round_trip() {
        let conv = converter(0.3);
        let lat = 60.3913f64.to_radians();
        let lon = 5.3221f64.to_radians();

        let (northing, easting) = conv.forward(lat, lon).unwrap().unwrap();
        let (lat2, lon2) = conv.inverse(northing, easting).unwrap().unwrap();

        assert!((lat2 - lat).abs() < 1e-7, "lat={} vs {}", lat2, lat);
        assert!((lon2 - lon).abs() < 1e-7, "lon={} vs {}", lon2, lon);
    }

    #[test]
    fn test_grid_convergence_matches_grid_rotation() {
        for angle in [0.0, 0.05, -0.2, 1.2] {
            let conv = converter(angle);
            let lat = 60f64.to_radians();
            let lon = 5f64.to_radians();
            let (n, e) = conv.forward(lat, lon).unwrap().unwrap();

            let gc = conv.grid_convergence(n, e, lat, lon).unwrap().unwrap();
            assert!(gc.is_finite());
            assert!(gc > -PI && gc <= PI);
            assert!((gc - angle).abs() < 1e-9, "angle={} gc={}", angle, gc);
        }
    }

    #[test]
    fn test_grid_convergence_fails_past_pole() {
        let conv = converter(0.0);
        let lat = 89.95f64.to_radians();
        let (n, e) = conv.forward(lat, 0.0).unwrap().unwrap();

        assert_eq!(conv.grid_convergence(n, e, lat, 0.0).unwrap(), None);
        // Avec un pas négatif le point décalé reste dans le domaine
        assert!(conv
            .grid_convergence_with_step(n, e, lat, 0.0, -DEFAULT_CONVERGENCE_STEP)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_batch_keeps_order_and_length() {
        let conv = converter(0.1);
        let inputs = vec![
            (60f64.to_radians(), 5f64.to_radians()),
            (95f64.to_radians(), 5f64.to_radians()), // hors domaine
            (f64::NAN, 1.0),
            (59.9f64.to_radians(), 10.7f64.to_radians()),
        ];

        let out = conv.forward_many(&inputs).unwrap();
        assert_eq!(out.len(), inputs.len());
        assert!(out[0].is_some());
        assert!(out[1].is_none());
        assert!(out[2].is_none());

        let single = conv.forward(inputs[3].0, inputs[3].1).unwrap();
        assert_eq!(out[3], single);

        let back = conv
            .inverse_many(&out.iter().flatten().copied().collect::<Vec<_>>())
            .unwrap();
        assert_eq!(back.len(), 2);
        assert!((back[1].unwrap().0 - inputs[3].0).abs() < 1e-9);
    }

    /// Compte les appels au moteur
    struct CountingEngine {
        inner: RotatedGridEngine,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl TransformEngine for CountingEngine {
        fn reproject(
            &self,
            from: &str,
            to: &str,
            points: &[(f64, f64)],
        ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.reproject(from, to, points)
        }
    }

    #[test]
    fn test_batch_convergence_single_engine_call() {
        let engine = CountingEngine {
            inner: RotatedGridEngine { angle: 0.07 },
            calls: Default::default(),
        };
        let conv = CoordinateConverter::new(&engine, &utm32(), &Spheroid::wgs84()).unwrap();

        let geographic: Vec<(f64, f64)> = (0..1000)
            .map(|i| ((50.0 + i as f64 * 0.01).to_radians(), (2.0 + i as f64 * 0.005).to_radians()))
            .collect();
        let planar = conv.forward_many(&geographic).unwrap();

        let points: Vec<(f64, f64, f64, f64)> = planar
            .iter()
            .zip(&geographic)
            .map(|(p, &(lat, lon))| {
                let (n, e) = p.unwrap();
                (n, e, lat, lon)
            })
            .collect();
        let convergences = conv.grid_convergence_many(&points).unwrap();

        assert_eq!(engine.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(convergences.len(), 1000);
        for gc in convergences {
            assert!((gc.unwrap() - 0.07).abs() < 1e-9);
        }
    }

    #[test]
    fn test_batch_convergence_missing_inputs() {
        let conv = converter(0.0);
        let lat = 60f64.to_radians();
        let (n, e) = conv.forward(lat, 0.1).unwrap().unwrap();

        let out = conv
            .grid_convergence_many(&[
                (n, e, lat, 0.1),
                (f64::NAN, e, lat, 0.1),
                (n, e, f64::NAN, 0.1),
                (n, e, 89.95f64.to_radians(), 0.1),
            ])
            .unwrap();

        assert!(out[0].unwrap().abs() < 1e-9);
        assert_eq!(out[1..], [None, None, None]);
    }

    #[test]
    fn test_engine_error_propagates() {
        struct Broken;
        impl TransformEngine for Broken {
            fn reproject(
                &self,
                from: &str,
                _to: &str,
                _points: &[(f64, f64)],
            ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
                Err(ProjectionError::engine(from, "unparsable"))
            }
        }

        let conv = CoordinateConverter::new(Broken, &utm32(), &Spheroid::wgs84()).unwrap();
        assert!(conv.inverse(6_700_000.0, 300_000.0).is_err());
        // Aucune entrée valide : le moteur n'est pas appelé
        assert_eq!(conv.inverse(f64::NAN, 0.0).unwrap(), None);
    }
}
