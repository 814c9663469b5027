//! Service distant de transformation de datum
//!
//! Le service convertit des coordonnées géodésiques entre le datum de
//! référence, WGS84 et le code spatial. L'API est orientée tâches : on soumet
//! un lot identifié par un identifiant de corrélation puis on l'interroge
//! jusqu'à ce qu'il soit complet.

pub mod http;
pub mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use carto_proj::{GeodeticCoordinate, GeodeticDatum, MetaInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConversionError;

pub use http::HttpDatumService;

/// Lot de coordonnées géodésiques échangé avec le service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeodeticConversionSet {
    pub meta_info: Option<MetaInfo>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(with = "wire::optional_datum")]
    pub geodetic_datum: Option<GeodeticDatum>,
    pub geodetic_coordinates: Vec<GeodeticCoordinate>,
}

impl GeodeticConversionSet {
    /// Nouveau lot identifié par `id`
    pub fn new(id: Uuid, datum: GeodeticDatum, coordinates: Vec<GeodeticCoordinate>) -> Self {
        Self {
            meta_info: Some(MetaInfo::new(id)),
            name: Some("CartographicProjection".to_string()),
            description: Some("Geodetic conversion requested by the cartographic conversion".to_string()),
            geodetic_datum: Some(datum),
            geodetic_coordinates: coordinates,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.meta_info.map(|m| m.id)
    }
}

/// Opérations du service de datum
///
/// `Ok(None)` signifie « introuvable » ; `Err` est réservé aux erreurs de transport.
#[async_trait]
pub trait DatumTransformService: Send + Sync {
    /// Datum géodésique par identifiant
    async fn datum(&self, id: Uuid) -> Result<Option<GeodeticDatum>, ConversionError>;

    /// Soumet un lot à convertir
    async fn submit(&self, request: &GeodeticConversionSet) -> Result<(), ConversionError>;

    /// État courant d'un lot soumis
    async fn get_by_id(&self, id: Uuid) -> Result<Option<GeodeticConversionSet>, ConversionError>;

    /// Supprime un lot côté service
    async fn delete_by_id(&self, id: Uuid) -> Result<(), ConversionError>;
}

#[async_trait]
impl<T: DatumTransformService + ?Sized> DatumTransformService for Arc<T> {
    async fn datum(&self, id: Uuid) -> Result<Option<GeodeticDatum>, ConversionError> {
        (**self).datum(id).await
    }

    async fn submit(&self, request: &GeodeticConversionSet) -> Result<(), ConversionError> {
        (**self).submit(request).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<GeodeticConversionSet>, ConversionError> {
        (**self).get_by_id(id).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), ConversionError> {
        (**self).delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let id = Uuid::new_v4();
        let datum = GeodeticDatum {
            spheroid: Some(carto_proj::Spheroid::wgs84()),
            ..Default::default()
        };
        let set = GeodeticConversionSet::new(
            id,
            datum,
            vec![GeodeticCoordinate {
                latitude_datum: Some(1.0),
                ..Default::default()
            }],
        );
        let json = serde_json::to_value(&set).unwrap();

        assert_eq!(json["MetaInfo"]["ID"], id.to_string());
        assert_eq!(
            json["GeodeticDatum"]["Spheroid"]["InverseFlattening"]["DiracDistributionValue"]["Value"],
            298.257223563
        );
        assert_eq!(json["GeodeticCoordinates"][0]["LatitudeDatum"], 1.0);
        assert_eq!(set.id(), Some(id));
    }

    #[test]
    fn test_missing_coordinates_default_to_empty() {
        let set: GeodeticConversionSet =
            serde_json::from_str(r#"{ "MetaInfo": { "ID": "00000000-0000-0000-0000-000000000001" } }"#)
                .unwrap();
        assert!(set.geodetic_coordinates.is_empty());
    }
}
