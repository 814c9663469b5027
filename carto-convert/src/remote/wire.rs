//! Format JSON des datums côté service
//!
//! Le service encapsule chaque grandeur de l'ellipsoïde dans une propriété
//! scalaire : `{"SemiMajorAxis": {"DiracDistributionValue": {"Value": 6378137.0}}}`.
//! Ces types ne servent qu'à la (dé)sérialisation ; le reste du crate manipule
//! `GeodeticDatum` et `Spheroid`.

use carto_proj::{GeodeticDatum, MetaInfo, Spheroid};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DiracDistribution {
    pub value: Option<f64>,
}

/// Grandeur scalaire du service, seule la distribution de Dirac est lue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScalarProperty {
    pub dirac_distribution_value: Option<DiracDistribution>,
}

impl ScalarProperty {
    fn wrap(value: Option<f64>) -> Option<Self> {
        value.map(|value| Self {
            dirac_distribution_value: Some(DiracDistribution { value: Some(value) }),
        })
    }

    fn value(property: &Option<Self>) -> Option<f64> {
        property
            .as_ref()
            .and_then(|p| p.dirac_distribution_value.as_ref())
            .and_then(|d| d.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpheroidPayload {
    pub semi_major_axis: Option<ScalarProperty>,
    pub semi_minor_axis: Option<ScalarProperty>,
    pub flattening: Option<ScalarProperty>,
    pub inverse_flattening: Option<ScalarProperty>,
    pub eccentricity: Option<ScalarProperty>,
    pub squared_eccentricity: Option<ScalarProperty>,
}

impl From<&Spheroid> for SpheroidPayload {
    fn from(spheroid: &Spheroid) -> Self {
        Self {
            semi_major_axis: ScalarProperty::wrap(spheroid.semi_major_axis),
            semi_minor_axis: ScalarProperty::wrap(spheroid.semi_minor_axis),
            flattening: ScalarProperty::wrap(spheroid.flattening),
            inverse_flattening: ScalarProperty::wrap(spheroid.inverse_flattening),
            eccentricity: ScalarProperty::wrap(spheroid.eccentricity),
            squared_eccentricity: ScalarProperty::wrap(spheroid.squared_eccentricity),
        }
    }
}

impl From<SpheroidPayload> for Spheroid {
    fn from(payload: SpheroidPayload) -> Self {
        Self {
            semi_major_axis: ScalarProperty::value(&payload.semi_major_axis),
            semi_minor_axis: ScalarProperty::value(&payload.semi_minor_axis),
            flattening: ScalarProperty::value(&payload.flattening),
            inverse_flattening: ScalarProperty::value(&payload.inverse_flattening),
            eccentricity: ScalarProperty::value(&payload.eccentricity),
            squared_eccentricity: ScalarProperty::value(&payload.squared_eccentricity),
        }
    }
}

/// Datum tel qu'échangé avec le service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DatumPayload {
    pub meta_info: Option<MetaInfo>,
    pub name: Option<String>,
    pub spheroid: Option<SpheroidPayload>,
}

impl From<&GeodeticDatum> for DatumPayload {
    fn from(datum: &GeodeticDatum) -> Self {
        Self {
            meta_info: datum.meta_info,
            name: datum.name.clone(),
            spheroid: datum.spheroid.as_ref().map(SpheroidPayload::from),
        }
    }
}

impl From<DatumPayload> for GeodeticDatum {
    fn from(payload: DatumPayload) -> Self {
        Self {
            meta_info: payload.meta_info,
            name: payload.name,
            spheroid: payload.spheroid.map(Spheroid::from),
        }
    }
}

/// `#[serde(with = ...)]` pour un champ `Option<GeodeticDatum>` au format du service
pub mod optional_datum {
    use super::*;

    pub fn serialize<S: Serializer>(
        datum: &Option<GeodeticDatum>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        datum.as_ref().map(DatumPayload::from).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<GeodeticDatum>, D::Error> {
        Ok(Option::<DatumPayload>::deserialize(deserializer)?.map(GeodeticDatum::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const WGS84_PAYLOAD: &str = r#"{
        "MetaInfo": { "ID": "6f2b1c1e-9a55-4c1b-8f61-0d7d3b0c2a11" },
        "Name": "WGS84",
        "Spheroid": {
            "SemiMajorAxis": { "DiracDistributionValue": { "Value": 6378137.0 } },
            "InverseFlattening": { "DiracDistributionValue": { "Value": 298.257223563 } },
            "Flattening": { "DiracDistributionValue": null },
            "Eccentricity": null
        }
    }"#;

    #[test]
    fn test_nested_spheroid_payload() {
        let payload: DatumPayload = serde_json::from_str(WGS84_PAYLOAD).unwrap();
        let datum = GeodeticDatum::from(payload);

        assert_eq!(datum.name.as_deref(), Some("WGS84"));
        assert_eq!(
            datum.meta_info.map(|m| m.id),
            Some(Uuid::parse_str("6f2b1c1e-9a55-4c1b-8f61-0d7d3b0c2a11").unwrap())
        );
        assert_eq!(datum.spheroid, Some(Spheroid::wgs84()));
    }

    #[test]
    fn test_spheroid_written_in_service_format() {
        let datum = GeodeticDatum {
            meta_info: Some(MetaInfo::new(Uuid::new_v4())),
            name: None,
            spheroid: Some(Spheroid::wgs84()),
        };
        let json = serde_json::to_value(DatumPayload::from(&datum)).unwrap();

        assert_eq!(
            json["Spheroid"]["SemiMajorAxis"]["DiracDistributionValue"]["Value"],
            6378137.0
        );
        assert!(json["Spheroid"]["SemiMinorAxis"].is_null());

        let back: DatumPayload = serde_json::from_value(json).unwrap();
        assert_eq!(GeodeticDatum::from(back), datum);
    }
}
