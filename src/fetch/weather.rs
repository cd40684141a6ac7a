//! Weather source abstraction and its HTTP/filesystem implementation.

use async_trait::async_trait;
use tracing::debug;

use super::{HttpClient, fetch_bytes};
use crate::cities::CityConfig;
use crate::error::{CityError, FetchError};
use crate::model::CityForecast;
use crate::parser::parse_forecast;

/// Supplies the raw forecast for a configured city.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<CityForecast, CityError>;
}

/// Resolves cities through a [`CityConfig`] and loads their payloads over
/// HTTP, or from disk for non-`http` sources.
pub struct WeatherApiClient<C> {
    http: C,
    cities: CityConfig,
}

impl<C: HttpClient> WeatherApiClient<C> {
    pub fn new(http: C, cities: CityConfig) -> Self {
        Self { http, cities }
    }

    async fn load(&self, source: &str) -> Result<Vec<u8>, FetchError> {
        if source.starts_with("http") {
            fetch_bytes(&self.http, source).await
        } else {
            tokio::fs::read(source).await.map_err(|e| FetchError::Io {
                path: source.to_string(),
                source: e,
            })
        }
    }
}

#[async_trait]
impl<C: HttpClient> WeatherSource for WeatherApiClient<C> {
    async fn fetch(&self, city: &str) -> Result<CityForecast, CityError> {
        let source = self
            .cities
            .source(city)
            .ok_or_else(|| FetchError::UnknownCity(city.to_string()))?;

        let bytes = self.load(source).await?;
        debug!(bytes = bytes.len(), source, "Forecast payload received, parsing");
        parse_forecast(&bytes)
    }
}
