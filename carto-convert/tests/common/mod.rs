//! Outils partagés par les tests d'intégration : moteur déterministe et service simulé

#![allow(dead_code)]

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use carto_convert::{
    ConversionError, ConversionOrchestrator, DatumTransformService, GeodeticConversionSet,
    MemoryCatalog, PollSettings,
};
use carto_proj::{
    GeodeticCoordinate, GeodeticDatum, MetaInfo, ProjectionError, ProjectionFamily,
    ProjectionParameterSet, SpatialCode, Spheroid, TransformEngine,
};
use uuid::Uuid;

/// Rotation de la grille, égale à la convergence attendue (radians)
pub const ANGLE: f64 = 0.04;
const SCALE: f64 = 111_000.0;
const FALSE_EASTING: f64 = 500_000.0;
const CODE_SCALE: f64 = 1e9;

/// Grille plane tournée : est = K (lon cos θ + lat sin θ) + E0, nord = K (-lon sin θ + lat cos θ)
pub struct RotatedGridEngine {
    pub angle: f64,
}

impl RotatedGridEngine {
    /// (latitude, longitude) en degrés → (nord, est)
    pub fn grid(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (s, c) = self.angle.sin_cos();
        (
            SCALE * (-lon * s + lat * c),
            SCALE * (lon * c + lat * s) + FALSE_EASTING,
        )
    }
}

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
                    (lat.abs() <= 90.0).then(|| {
                        (
                            SCALE * (lon * c + lat * s) + FALSE_EASTING,
                            SCALE * (-lon * s + lat * c),
                        )
                    })
                } else {
                    let (e, n) = (x - FALSE_EASTING, y);
                    let lon = (e * c - n * s) / SCALE;
                    let lat = (e * s + n * c) / SCALE;
                    (lat.abs() <= 90.0).then_some((lon, lat))
                }
            })
            .collect())
    }
}

/// Grille tournée qui compte les appels au moteur
pub struct CountingEngine {
    pub inner: RotatedGridEngine,
    pub calls: AtomicUsize,
}

impl CountingEngine {
    pub fn new(angle: f64) -> Self {
        Self {
            inner: RotatedGridEngine { angle },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TransformEngine for CountingEngine {
    fn reproject(
        &self,
        from: &str,
        to: &str,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reproject(from, to, points)
    }
}

/// Moteur qui rejette toute définition
pub struct BrokenEngine;

impl TransformEngine for BrokenEngine {
    fn reproject(
        &self,
        from: &str,
        _to: &str,
        _points: &[(f64, f64)],
    ) -> Result<Vec<Option<(f64, f64)>>, ProjectionError> {
        Err(ProjectionError::engine(from, "unsupported operation"))
    }
}

/// Code spatial simulé : latitude et longitude décalées et mises à l'échelle
pub fn encode(lat: f64, lon: f64) -> SpatialCode {
    SpatialCode {
        code_high: ((lat + PI) * CODE_SCALE).round() as u64,
        code_low: ((lon + PI) * CODE_SCALE).round() as u64,
    }
}

pub fn decode(code: SpatialCode) -> (f64, f64) {
    (
        code.code_high as f64 / CODE_SCALE - PI,
        code.code_low as f64 / CODE_SCALE - PI,
    )
}

/// Conversion simulée : datum identique à WGS84, code spatial de profondeur 20
fn complete_record(record: &GeodeticCoordinate) -> GeodeticCoordinate {
    let triple = record.datum_triple().or(record.wgs84_triple()).or_else(|| {
        record
            .spatial_code
            .filter(|_| record.spatial_code_depth > 0)
            .map(|code| {
                let (lat, lon) = decode(code);
                (lat, lon, 0.0)
            })
    });

    let Some((lat, lon, depth)) = triple else {
        return record.clone();
    };
    GeodeticCoordinate {
        latitude_datum: Some(lat),
        longitude_datum: Some(lon),
        vertical_depth_datum: Some(depth),
        latitude_wgs84: Some(lat),
        longitude_wgs84: Some(lon),
        vertical_depth_wgs84: Some(depth),
        spatial_code: Some(encode(lat, lon)),
        spatial_code_depth: 20,
    }
}

struct Job {
    request: GeodeticConversionSet,
    polls: usize,
}

/// Service de datum en mémoire
///
/// Un lot soumis est renvoyé tel quel jusqu'au `complete_after`-ième appel de
/// `get_by_id`, puis complété. `None` : jamais complété.
pub struct MockDatumService {
    datums: HashMap<Uuid, GeodeticDatum>,
    complete_after: Option<usize>,
    fail_submit: bool,
    jobs: Mutex<HashMap<Uuid, Job>>,
    pub submitted: Mutex<Vec<GeodeticConversionSet>>,
    pub deleted: Mutex<Vec<Uuid>>,
    pub gets: AtomicUsize,
}

impl MockDatumService {
    pub fn new(complete_after: Option<usize>) -> Self {
        Self {
            datums: HashMap::new(),
            complete_after,
            fail_submit: false,
            jobs: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            gets: AtomicUsize::new(0),
        }
    }

    pub fn with_datum(mut self, datum: GeodeticDatum) -> Self {
        let id = datum.meta_info.map(|m| m.id).unwrap_or_default();
        self.datums.insert(id, datum);
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }
}

#[async_trait]
impl DatumTransformService for MockDatumService {
    async fn datum(&self, id: Uuid) -> Result<Option<GeodeticDatum>, ConversionError> {
        Ok(self.datums.get(&id).cloned())
    }

    async fn submit(&self, request: &GeodeticConversionSet) -> Result<(), ConversionError> {
        self.submitted.lock().unwrap().push(request.clone());
        if self.fail_submit {
            return Err(ConversionError::remote("submit", "HTTP 503: unavailable"));
        }
        let id = request.id().unwrap_or_default();
        self.jobs.lock().unwrap().insert(
            id,
            Job {
                request: request.clone(),
                polls: 0,
            },
        );
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<GeodeticConversionSet>, ConversionError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let mut jobs = self.jobs.lock().unwrap();
        let Some(job) = jobs.get_mut(&id) else {
            return Ok(None);
        };
        job.polls += 1;

        let mut response = job.request.clone();
        if self.complete_after.is_some_and(|k| job.polls >= k) {
            response.geodetic_coordinates = response
                .geodetic_coordinates
                .iter()
                .map(complete_record)
                .collect();
        }
        Ok(Some(response))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), ConversionError> {
        self.jobs.lock().unwrap().remove(&id);
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}

/// Catalogue avec une projection UTM 32 et service exposant son datum WGS84
pub struct Fixture {
    pub projection_id: Uuid,
    pub datum_id: Uuid,
    pub catalog: MemoryCatalog,
    pub service: Arc<MockDatumService>,
}

pub fn wgs84_datum(id: Uuid) -> GeodeticDatum {
    GeodeticDatum {
        meta_info: Some(MetaInfo::new(id)),
        name: Some("WGS84".to_string()),
        spheroid: Some(Spheroid::wgs84()),
    }
}

pub fn fixture(service: MockDatumService) -> Fixture {
    let datum_id = Uuid::new_v4();
    let mut projection = ProjectionParameterSet::new(ProjectionFamily::UTM, datum_id);
    projection.parameters.zone = Some(32);
    let projection_id = projection.id();

    let mut catalog = MemoryCatalog::new();
    catalog.insert(projection);

    Fixture {
        projection_id,
        datum_id,
        catalog,
        service: Arc::new(service.with_datum(wgs84_datum(datum_id))),
    }
}

pub type TestOrchestrator =
    ConversionOrchestrator<RotatedGridEngine, MemoryCatalog, Arc<MockDatumService>>;

pub fn orchestrator(fixture: &Fixture) -> TestOrchestrator {
    ConversionOrchestrator::new(
        RotatedGridEngine { angle: ANGLE },
        fixture.catalog.clone(),
        fixture.service.clone(),
        PollSettings::default(),
    )
}
