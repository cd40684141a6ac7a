//! Retrieval of forecast payloads.

mod basic;
mod weather;

pub use basic::BasicClient;
pub use weather::{WeatherApiClient, WeatherSource};

use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::error::FetchError;

/// Transport used to reach forecast sources over HTTP.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Issues a GET against `url` and returns the response body.
///
/// Non-success statuses are reported as [`FetchError::Status`].
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = Request::new(reqwest::Method::GET, parsed);

    let http_err = |source| FetchError::Http {
        url: url.to_string(),
        source,
    };

    let resp = client.execute(req).await.map_err(http_err)?;
    if !resp.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    Ok(resp.bytes().await.map_err(http_err)?.to_vec())
}
