//! Client HTTP du service de datum

use async_trait::async_trait;
use carto_proj::GeodeticDatum;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::wire::DatumPayload;
use super::{DatumTransformService, GeodeticConversionSet};
use crate::config::ServiceConfig;
use crate::error::ConversionError;

const DATUM_PATH: &str = "GeodeticDatum/api/GeodeticDatum";
const CONVERSION_SET_PATH: &str = "GeodeticDatum/api/GeodeticConversionSet";

/// Client REST du service de datum
pub struct HttpDatumService {
    http: Client,
    base_url: String,
}

impl HttpDatumService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ConversionError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConversionError::remote("client", e))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.datum_service_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn datum_url(&self, id: Uuid) -> String {
        format!("{}{}/{}", self.base_url, DATUM_PATH, id)
    }

    fn conversion_set_url(&self, id: Option<Uuid>) -> String {
        match id {
            Some(id) => format!("{}{}/{}", self.base_url, CONVERSION_SET_PATH, id),
            None => format!("{}{}", self.base_url, CONVERSION_SET_PATH),
        }
    }

    /// GET avec 404 → `None`
    async fn get_optional<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
    ) -> Result<Option<T>, ConversionError> {
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ConversionError::remote(operation, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(operation, response).await?;
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ConversionError::remote(operation, e))
    }
}

#[async_trait]
impl DatumTransformService for HttpDatumService {
    async fn datum(&self, id: Uuid) -> Result<Option<GeodeticDatum>, ConversionError> {
        let payload: Option<DatumPayload> = self.get_optional("datum", &self.datum_url(id)).await?;
        Ok(payload.map(GeodeticDatum::from))
    }

    async fn submit(&self, request: &GeodeticConversionSet) -> Result<(), ConversionError> {
        let url = self.conversion_set_url(None);
        debug!(url = %url, items = request.geodetic_coordinates.len(), "POST");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ConversionError::remote("submit", e))?;

        check_status("submit", response).await?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<GeodeticConversionSet>, ConversionError> {
        self.get_optional("get_by_id", &self.conversion_set_url(Some(id)))
            .await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), ConversionError> {
        let url = self.conversion_set_url(Some(id));
        debug!(url = %url, "DELETE");

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| ConversionError::remote("delete_by_id", e))?;

        // Déjà supprimé
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status("delete_by_id", response).await?;
        Ok(())
    }
}

async fn check_status(operation: &str, response: Response) -> Result<Response, ConversionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ConversionError::remote(
        operation,
        format!(
            "HTTP {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        ),
    ))
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
