//! Moteur de transformation géométrique
//!
//! Le calcul des projections est délégué à un moteur opaque qui reprojette des
//! points d'une définition PROJ vers une autre. L'implémentation `ProjEngine`
//! s'appuie sur PROJ et n'est disponible qu'avec le feature `reproject`.

use crate::error::ProjectionError;

/// Reprojection de points entre deux définitions PROJ
///
/// Les points sont des couples `(x, y)` : `(est, nord)` côté projeté,
/// `(longitude, latitude)` en degrés côté géographique.
pub trait TransformEngine: Send + Sync {
    /// Reprojette `points` de `from` vers `to`
    ///
    /// `Err` si une des définitions est inutilisable. Le vecteur retourné a la
    /// même longueur que `points` ; `None` à l'indice i signifie que le point i
    /// n'a pas pu être transformé.
    fn reproject(
        &self,
        from: &str,
        to: &str,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError>;
}

impl<T: TransformEngine + ?Sized> TransformEngine for &T {
    fn reproject(
        &self,
        from: &str,
        to: &str,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        (**self).reproject(from, to, points)
    }
}

impl<T: TransformEngine + ?Sized> TransformEngine for std::sync::Arc<T> {
    fn reproject(
        &self,
        from: &str,
        to: &str,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        (**self).reproject(from, to, points)
    }
}

/// Vérifie si la reprojection PROJ est disponible
pub fn is_available() -> bool {
    cfg!(feature = "reproject")
}

/// Nombre de points convertis par un même pipeline avant de paralléliser
#[cfg(feature = "reproject")]
const CHUNK_SIZE: usize = 2048;

#[cfg(feature = "reproject")]
type PipelineKey = (String, String);

/// Moteur de transformation basé sur PROJ
///
/// Les pipelines PROJ sont créés une fois par couple de définitions puis
/// réutilisés d'un appel à l'autre. Un pipeline n'est utilisé que par un thread
/// à la fois ; les gros lots sont découpés et convertis en parallèle, chaque
/// morceau empruntant son propre pipeline.
#[derive(Default)]
pub struct ProjEngine {
    #[cfg(feature = "reproject")]
    pipelines: std::sync::Mutex<std::collections::HashMap<PipelineKey, Vec<proj::Proj>>>,
}

impl ProjEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "reproject")]
impl ProjEngine {
    fn pool(
        &self,
    ) -> std::sync::MutexGuard<'_, std::collections::HashMap<PipelineKey, Vec<proj::Proj>>> {
        self.pipelines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Emprunte un pipeline libre, ou en crée un
    fn checkout(&self, key: &PipelineKey) -> Result<proj::Proj, ProjectionError> {
        if let Some(proj) = self.pool().get_mut(key).and_then(Vec::pop) {
            return Ok(proj);
        }

        // Les chaînes +proj doivent être marquées comme CRS pour proj_create_crs_to_crs
        let source = as_crs(&key.0);
        let target = as_crs(&key.1);
        tracing::debug!(from = %key.0, to = %key.1, "Creating PROJ pipeline");

        proj::Proj::new_known_crs(&source, &target, None).map_err(|e| {
            ProjectionError::engine(format!("{} -> {}", key.0, key.1), e.to_string())
        })
    }

    fn checkin(&self, key: &PipelineKey, proj: proj::Proj) {
        self.pool().entry(key.clone()).or_default().push(proj);
    }

    #[cfg(test)]
    fn pooled(&self) -> usize {
        self.pool().values().map(Vec::len).sum()
    }
}

#[cfg(feature = "reproject")]
impl TransformEngine for ProjEngine {
    fn reproject(
        &self,
        from: &str,
        to: &str,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        use rayon::prelude::*;

        let key = (from.to_string(), to.to_string());

        let chunks = points
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| {
                let proj = self.checkout(&key)?;
                let out: Vec<Option<(f64, f64)>> = chunk
                    .iter()
                    .map(|&point| match proj.convert(point) {
                        Ok((x, y)) if x.is_finite() && y.is_finite() => Some((x, y)),
                        Ok(_) => None,
                        Err(e) => {
                            tracing::debug!("Point {:?} rejected by PROJ: {}", point, e);
                            None
                        }
                    })
                    .collect();
                self.checkin(&key, proj);
                Ok(out)
            })
            .collect::<Result<Vec<_>, ProjectionError>>()?;

        Ok(chunks.into_iter().flatten().collect())
    }
}

#[cfg(feature = "reproject")]
fn as_crs(definition: &str) -> String {
    if definition.contains("+type=crs") {
        definition.to_string()
    } else {
        format!("{} +type=crs", definition)
    }
}

// Moteur factice quand le feature reproject est désactivé
#[cfg(not(feature = "reproject"))]
impl TransformEngine for ProjEngine {
    fn reproject(
        &self,
        _from: &str,
        _to: &str,
        _points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        Err(ProjectionError::FeatureDisabled)
    }
}

#[cfg(feature = "reproject")]
#[cfg(test)]
mod tests {
    use super::*;

    const UTM32N: &str = "+proj=utm +zone=32 +a=6378137 +rf=298.257223563";
    const GEOGRAPHIC: &str = "+proj=longlat +a=6378137 +rf=298.257223563";

    #[test]
    fn test_geographic_to_utm() {
        let engine = ProjEngine::new();
        let out = engine
            .reproject(GEOGRAPHIC, UTM32N, &[(9.0, 0.0), (5.3221, 60.3913)])
            .unwrap();

        // Méridien central de la zone 32 : est = 500000
        let (e0, n0) = out[0].unwrap();
        assert!((e0 - 500000.0).abs() < 1e-6, "easting={}", e0);
        assert!(n0.abs() < 1e-6, "northing={}", n0);

        // Bergen : environ 297 km à l'est, 6700 km au nord
        let (e1, n1) = out[1].unwrap();
        assert!(e1 > 250000.0 && e1 < 350000.0, "easting={}", e1);
        assert!(n1 > 6650000.0 && n1 < 6750000.0, "northing={}", n1);
    }

    #[test]
    fn test_pipeline_reused_across_calls() {
        let engine = ProjEngine::new();
        for _ in 0..3 {
            engine.reproject(GEOGRAPHIC, UTM32N, &[(9.0, 45.0)]).unwrap();
        }
        assert_eq!(engine.pooled(), 1);

        engine.reproject(UTM32N, GEOGRAPHIC, &[(500000.0, 0.0)]).unwrap();
        assert_eq!(engine.pooled(), 2);
    }

    #[test]
    fn test_large_batch_keeps_order() {
        let engine = ProjEngine::new();
        let points: Vec<(f64, f64)> = (0..3 * CHUNK_SIZE + 17)
            .map(|i| (9.0, -60.0 + i as f64 * 0.01))
            .collect();

        let out = engine.reproject(GEOGRAPHIC, UTM32N, &points).unwrap();
        assert_eq!(out.len(), points.len());

        // Sur le méridien central, le nord croît avec la latitude
        let northings: Vec<f64> = out.iter().map(|p| p.unwrap().1).collect();
        assert!(northings.windows(2).all(|w| w[1] > w[0]));
        assert!(engine.pooled() >= 1);
    }

    #[test]
    fn test_invalid_definition() {
        let engine = ProjEngine::new();
        let result = engine.reproject("+proj=doesnotexist", GEOGRAPHIC, &[(0.0, 0.0)]);
        assert!(result.is_err());
    }
}
