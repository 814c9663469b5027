//! Orchestration de la conversion d'un lot
//!
//! 1. Répartition des coordonnées selon leur origine (cartographique ou géodésique)
//! 2. Résolution de la projection et du datum
//! 3. Pré-passe locale : projection inverse et convergence du sous-lot cartographique
//! 4. Conversions distantes des deux sous-lots, en parallèle
//! 5. Post-passe locale : projection directe et convergence du sous-lot géodésique
//! 6. Fusion des résultats à leur indice d'origine
//!
//! Le lot n'est modifié qu'à la fin, si aucune erreur n'a interrompu la conversion.

use std::time::Instant;

use carto_proj::{
    CartographicCoordinate, ConversionBatch, CoordinateConverter, CoordinateSource,
    GeodeticCoordinate, GeodeticDatum, ProjectionParameterSet, Spheroid, TransformEngine,
    DEFAULT_CONVERGENCE_STEP,
};
use futures::future::join;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::ProjectionCatalog;
use crate::error::ConversionError;
use crate::poll::{poll_until_complete, PollOutcome, PollSettings};
use crate::remote::{DatumTransformService, GeodeticConversionSet};
use crate::report::{ConversionReport, Subset};

/// Coordonnée définie en cartographique, avec son indice dans le lot
#[derive(Debug, Clone, Copy)]
struct CartographicItem {
    index: usize,
    northing: f64,
    easting: f64,
    vertical_depth: f64,
}

/// Répartition du lot ; chaque indice apparaît dans exactement un sous-lot
#[derive(Debug, Default)]
struct Partition {
    cartographic: Vec<CartographicItem>,
    geodetic: Vec<usize>,
}

/// Projection et datum résolus pour un lot
struct Resolved {
    projection: ProjectionParameterSet,
    datum: GeodeticDatum,
    spheroid: Spheroid,
}

/// Orchestrateur de conversion
///
/// Sans état propre à un lot : une même instance peut convertir plusieurs
/// lots en parallèle.
pub struct ConversionOrchestrator<E, C, S> {
    engine: E,
    catalog: C,
    service: S,
    poll: PollSettings,
    convergence_step: f64,
}

impl<E, C, S> ConversionOrchestrator<E, C, S>
where
    E: TransformEngine,
    C: ProjectionCatalog,
    S: DatumTransformService,
{
    pub fn new(engine: E, catalog: C, service: S, poll: PollSettings) -> Self {
        Self {
            engine,
            catalog,
            service,
            poll,
            convergence_step: DEFAULT_CONVERGENCE_STEP,
        }
    }

    /// Pas de latitude utilisé pour la convergence du quadrillage (radians)
    pub fn with_convergence_step(mut self, step: f64) -> Self {
        self.convergence_step = step;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Définition PROJ de la projection `projection_id` sur l'ellipsoïde de son datum
    pub async fn definition(&self, projection_id: Uuid) -> Result<String, ConversionError> {
        let resolved = self.resolve(projection_id).await?;
        let converter = CoordinateConverter::new(&self.engine, &resolved.projection, &resolved.spheroid)?;
        Ok(converter.definition().to_string())
    }

    /// Convertit le lot en place
    ///
    /// Erreur si le lot est vide, si une coordonnée n'est ni cartographique ni
    /// géodésique, si la projection ou le datum est introuvable, ou si le
    /// moteur rejette la définition. Un service distant lent ou indisponible
    /// ne produit pas d'erreur : le rapport est alors `Partial`.
    pub async fn convert(
        &self,
        batch: &mut ConversionBatch,
    ) -> Result<ConversionReport, ConversionError> {
        let start = Instant::now();
        let label = batch_label(batch);

        let partition = partition(&batch.coordinates)?;
        info!(
            batch = %label,
            items = batch.coordinates.len(),
            cartographic = partition.cartographic.len(),
            geodetic = partition.geodetic.len(),
            "Converting batch"
        );

        let resolved = self.resolve(batch.projection_id).await?;
        let converter =
            CoordinateConverter::new(&self.engine, &resolved.projection, &resolved.spheroid)?;
        debug!(definition = %converter.definition(), "Projection resolved");

        let mut report = ConversionReport::new(&label);
        report.cartographic_count = partition.cartographic.len();
        report.geodetic_count = partition.geodetic.len();

        let mut coordinates = batch.coordinates.clone();

        let cartographic_request = self.cartographic_prepass(
            &converter,
            &partition.cartographic,
            &mut coordinates,
            &mut report,
        )?;
        let geodetic_request: Vec<GeodeticCoordinate> = partition
            .geodetic
            .iter()
            .map(|&i| coordinates[i].geodetic_coordinate.clone().unwrap_or_default())
            .collect();

        let (cartographic_outcome, geodetic_outcome) = join(
            self.remote_subset(&resolved.datum, cartographic_request, Subset::Cartographic),
            self.remote_subset(&resolved.datum, geodetic_request, Subset::Geodetic),
        )
        .await;

        let cartographic_records = usable_records(
            cartographic_outcome,
            partition.cartographic.len(),
            Subset::Cartographic,
            &mut report,
        );
        let geodetic_records = usable_records(
            geodetic_outcome,
            partition.geodetic.len(),
            Subset::Geodetic,
            &mut report,
        );

        merge_cartographic_subset(
            &mut coordinates,
            &partition.cartographic,
            cartographic_records.as_deref(),
        );
        self.geodetic_postpass(
            &converter,
            &partition.geodetic,
            geodetic_records.as_deref(),
            &mut coordinates,
            &mut report,
        )?;

        batch.coordinates = coordinates;

        report.set_duration(start.elapsed());
        report.finalize(&batch.coordinates);
        info!(
            batch = %label,
            status = ?report.status,
            incomplete = report.incomplete_items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch converted"
        );

        Ok(report)
    }

    async fn resolve(&self, projection_id: Uuid) -> Result<Resolved, ConversionError> {
        let projection = self.catalog.projection(projection_id).ok_or_else(|| {
            ConversionError::ResourceNotFound(format!("projection {}", projection_id))
        })?;

        let datum_id = projection
            .datum_id
            .filter(|id| !id.is_nil())
            .ok_or_else(|| {
                ConversionError::ResourceNotFound(format!(
                    "geodetic datum of projection {}",
                    projection_id
                ))
            })?;

        let datum = self
            .service
            .datum(datum_id)
            .await?
            .ok_or_else(|| ConversionError::ResourceNotFound(format!("geodetic datum {}", datum_id)))?;

        let spheroid = datum.spheroid.clone().ok_or_else(|| {
            ConversionError::ResourceNotFound(format!("spheroid of geodetic datum {}", datum_id))
        })?;

        Ok(Resolved {
            projection,
            datum,
            spheroid,
        })
    }

    /// Projection inverse et convergence ; retourne les coordonnées à soumettre au service
    fn cartographic_prepass(
        &self,
        converter: &CoordinateConverter<&E>,
        items: &[CartographicItem],
        coordinates: &mut [CartographicCoordinate],
        report: &mut ConversionReport,
    ) -> Result<Vec<GeodeticCoordinate>, ConversionError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let points: Vec<(f64, f64)> = items.iter().map(|it| (it.northing, it.easting)).collect();
        let geodetic = converter.inverse_many(&points)?;

        let convergence_input: Vec<(f64, f64, f64, f64)> = items
            .iter()
            .zip(&geodetic)
            .map(|(item, g)| {
                let (lat, lon) = g.unwrap_or((f64::NAN, f64::NAN));
                (item.northing, item.easting, lat, lon)
            })
            .collect();
        let convergences =
            converter.grid_convergence_many_with_step(&convergence_input, self.convergence_step)?;

        let mut request = Vec::with_capacity(items.len());
        for ((item, g), gc) in items.iter().zip(geodetic).zip(convergences) {
            if g.is_none() {
                warn!(index = item.index, "Inverse projection failed");
                report.record_warning(Some(item.index), "inverse projection failed");
            } else if gc.is_none() {
                warn!(index = item.index, "Grid convergence unavailable");
                report.record_warning(Some(item.index), "grid convergence unavailable");
            }

            let coordinate = &mut coordinates[item.index];
            coordinate.grid_convergence_datum = gc;

            let geo = coordinate
                .geodetic_coordinate
                .get_or_insert_with(GeodeticCoordinate::default);
            geo.latitude_datum = g.map(|(lat, _)| lat);
            geo.longitude_datum = g.map(|(_, lon)| lon);
            geo.vertical_depth_datum = Some(item.vertical_depth);

            request.push(geo.clone());
        }

        Ok(request)
    }

    /// Projection directe et convergence à partir des coordonnées du datum
    fn geodetic_postpass(
        &self,
        converter: &CoordinateConverter<&E>,
        indices: &[usize],
        records: Option<&[GeodeticCoordinate]>,
        coordinates: &mut [CartographicCoordinate],
        report: &mut ConversionReport,
    ) -> Result<(), ConversionError> {
        if indices.is_empty() {
            return Ok(());
        }

        // Valeurs du service en priorité, valeurs de l'appelant sinon
        let merged: Vec<GeodeticCoordinate> = indices
            .iter()
            .enumerate()
            .map(|(k, &i)| {
                let mut geo = coordinates[i].geodetic_coordinate.clone().unwrap_or_default();
                if let Some(remote) = records.and_then(|r| r.get(k)) {
                    merge_geodetic(&mut geo, remote);
                }
                geo
            })
            .collect();

        let points: Vec<(f64, f64)> = merged
            .iter()
            .map(|g| {
                (
                    g.latitude_datum.unwrap_or(f64::NAN),
                    g.longitude_datum.unwrap_or(f64::NAN),
                )
            })
            .collect();
        let planar = converter.forward_many(&points)?;

        let convergence_input: Vec<(f64, f64, f64, f64)> = planar
            .iter()
            .zip(&points)
            .map(|(p, &(lat, lon))| {
                let (northing, easting) = p.unwrap_or((f64::NAN, f64::NAN));
                (northing, easting, lat, lon)
            })
            .collect();
        let convergences =
            converter.grid_convergence_many_with_step(&convergence_input, self.convergence_step)?;

        for (((&index, geo), p), gc) in indices.iter().zip(merged).zip(planar).zip(convergences) {
            if geo.latitude_datum.is_none() || geo.longitude_datum.is_none() {
                warn!(index, "No datum coordinates available for forward projection");
                report.record_warning(Some(index), "datum coordinates unavailable");
            } else if p.is_none() {
                warn!(index, "Forward projection failed");
                report.record_warning(Some(index), "forward projection failed");
            }

            let coordinate = &mut coordinates[index];
            coordinate.northing = p.map(|(northing, _)| northing);
            coordinate.easting = p.map(|(_, easting)| easting);
            coordinate.vertical_depth = geo.vertical_depth_datum;
            coordinate.grid_convergence_datum = gc;
            coordinate.geodetic_coordinate = Some(geo);
        }

        Ok(())
    }

    /// Soumet un sous-lot et attend sa complétion ; `None` si le sous-lot est vide
    async fn remote_subset(
        &self,
        datum: &GeodeticDatum,
        records: Vec<GeodeticCoordinate>,
        subset: Subset,
    ) -> Option<PollOutcome> {
        if records.is_empty() {
            return None;
        }

        let id = Uuid::new_v4();
        let expected = records.len();
        let request = GeodeticConversionSet::new(id, datum.clone(), records);

        info!(correlation_id = %id, subset = ?subset, items = expected, "Submitting geodetic conversion");
        if let Err(e) = self.service.submit(&request).await {
            warn!(correlation_id = %id, subset = ?subset, "Submit failed: {}", e);
            return Some(PollOutcome::Failed(e.to_string()));
        }

        Some(poll_until_complete(&self.service, id, expected, self.poll).await)
    }
}

/// Classe chaque coordonnée ; la première coordonnée inclassable interrompt tout le lot
fn partition(coordinates: &[CartographicCoordinate]) -> Result<Partition, ConversionError> {
    if coordinates.is_empty() {
        return Err(ConversionError::Input("empty coordinate list".to_string()));
    }

    let mut partition = Partition::default();
    for (index, coordinate) in coordinates.iter().enumerate() {
        match coordinate.source() {
            Some(CoordinateSource::Cartographic {
                northing,
                easting,
                vertical_depth,
            }) => partition.cartographic.push(CartographicItem {
                index,
                northing,
                easting,
                vertical_depth,
            }),
            Some(CoordinateSource::Geodetic(_)) => partition.geodetic.push(index),
            None => return Err(ConversionError::unclassifiable(index)),
        }
    }
    Ok(partition)
}

/// Enregistre l'issue distante et ne garde que des réponses alignées sur la requête
fn usable_records(
    outcome: Option<PollOutcome>,
    expected: usize,
    subset: Subset,
    report: &mut ConversionReport,
) -> Option<Vec<GeodeticCoordinate>> {
    let outcome = outcome?;
    report.record_remote(subset, &outcome);

    let records = outcome.into_records()?;
    if records.len() != expected {
        warn!(
            subset = ?subset,
            expected,
            received = records.len(),
            "Remote response length mismatch, ignored"
        );
        report.record_warning(
            None,
            format!(
                "{:?} subset: remote response has {} items, expected {}",
                subset,
                records.len(),
                expected
            ),
        );
        return None;
    }
    Some(records)
}

/// Fusion du sous-lot cartographique : WGS84 et code spatial issus du service
fn merge_cartographic_subset(
    coordinates: &mut [CartographicCoordinate],
    items: &[CartographicItem],
    records: Option<&[GeodeticCoordinate]>,
) {
    let Some(records) = records else {
        return;
    };
    for (item, remote) in items.iter().zip(records) {
        let geo = coordinates[item.index]
            .geodetic_coordinate
            .get_or_insert_with(GeodeticCoordinate::default);
        merge_wgs84_and_code(geo, remote);
    }
}

fn merge_wgs84_and_code(target: &mut GeodeticCoordinate, remote: &GeodeticCoordinate) {
    target.latitude_wgs84 = remote.latitude_wgs84.or(target.latitude_wgs84);
    target.longitude_wgs84 = remote.longitude_wgs84.or(target.longitude_wgs84);
    target.vertical_depth_wgs84 = remote.vertical_depth_wgs84.or(target.vertical_depth_wgs84);
    if remote.has_spatial_code() {
        target.spatial_code = remote.spatial_code;
        target.spatial_code_depth = remote.spatial_code_depth;
    }
}

/// Fusion complète : datum, WGS84 et code spatial
fn merge_geodetic(target: &mut GeodeticCoordinate, remote: &GeodeticCoordinate) {
    target.latitude_datum = remote.latitude_datum.or(target.latitude_datum);
    target.longitude_datum = remote.longitude_datum.or(target.longitude_datum);
    target.vertical_depth_datum = remote.vertical_depth_datum.or(target.vertical_depth_datum);
    merge_wgs84_and_code(target, remote);
}

fn batch_label(batch: &ConversionBatch) -> String {
    batch
        .name
        .clone()
        .or_else(|| batch.meta_info.map(|m| m.id.to_string()))
        .unwrap_or_else(|| format!("projection {}", batch.projection_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_proj::SpatialCode;

    fn geodetic_wgs84() -> CartographicCoordinate {
        CartographicCoordinate::from_geodetic(GeodeticCoordinate {
            latitude_wgs84: Some(1.0),
            longitude_wgs84: Some(0.1),
            vertical_depth_wgs84: Some(50.0),
            ..Default::default()
        })
    }

    #[test]
    fn test_partition_keeps_indices() {
        let coords = vec![
            geodetic_wgs84(),
            CartographicCoordinate::from_grid(6_700_000.0, 300_000.0, 1000.0),
            geodetic_wgs84(),
            CartographicCoordinate::from_grid(6_710_000.0, 305_000.0, 1100.0),
        ];
        let p = partition(&coords).unwrap();

        let carto: Vec<usize> = p.cartographic.iter().map(|it| it.index).collect();
        assert_eq!(carto, vec![1, 3]);
        assert_eq!(p.geodetic, vec![0, 2]);
        assert_eq!(p.cartographic[1].vertical_depth, 1100.0);
    }

    #[test]
    fn test_partition_rejects_unclassifiable() {
        let coords = vec![
            CartographicCoordinate::from_grid(1.0, 2.0, 3.0),
            CartographicCoordinate {
                northing: Some(1.0),
                easting: Some(2.0),
                ..Default::default()
            },
        ];
        let err = partition(&coords).unwrap_err();
        assert!(matches!(err, ConversionError::Input(ref m) if m.contains("#1")));
    }

    #[test]
    fn test_partition_rejects_empty() {
        assert!(matches!(partition(&[]), Err(ConversionError::Input(_))));
    }

    #[test]
    fn test_merge_prefers_remote_values() {
        let mut target = GeodeticCoordinate {
            latitude_datum: Some(1.0),
            latitude_wgs84: Some(2.0),
            ..Default::default()
        };
        let remote = GeodeticCoordinate {
            latitude_datum: Some(1.5),
            longitude_datum: Some(0.5),
            spatial_code: Some(SpatialCode {
                code_high: 9,
                code_low: 1,
            }),
            spatial_code_depth: 18,
            ..Default::default()
        };
        merge_geodetic(&mut target, &remote);

        assert_eq!(target.latitude_datum, Some(1.5));
        assert_eq!(target.longitude_datum, Some(0.5));
        // Absent côté service : valeur de l'appelant conservée
        assert_eq!(target.latitude_wgs84, Some(2.0));
        assert_eq!(target.spatial_code_depth, 18);
    }

    #[test]
    fn test_merge_ignores_code_without_depth() {
        let mut target = GeodeticCoordinate::default();
        let remote = GeodeticCoordinate {
            spatial_code: Some(SpatialCode::default()),
            spatial_code_depth: 0,
            ..Default::default()
        };
        merge_wgs84_and_code(&mut target, &remote);
        assert_eq!(target.spatial_code, None);
    }

    #[test]
    fn test_usable_records_rejects_length_mismatch() {
        let mut report = ConversionReport::new("t");
        let outcome = PollOutcome::TimedOut(Some(vec![GeodeticCoordinate::default()]));

        let records = usable_records(Some(outcome), 2, Subset::Geodetic, &mut report);
        assert!(records.is_none());
        assert_eq!(report.warnings.len(), 2);

        assert!(usable_records(None, 0, Subset::Cartographic, &mut report).is_none());
        assert_eq!(report.cartographic_remote, None);
    }
}
