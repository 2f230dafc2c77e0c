use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::FetchError,
    model::IconAsset,
    provider::{endpoint_url, send},
};

use super::ImageFetchClient;

const ICON_ENDPOINT: &str = "img/wn/";
const ICON_SUFFIX: &str = "@2x.png";

/// Condition-icon client following the OpenWeather `img/wn/<code>@2x.png` convention.
#[derive(Debug, Clone)]
pub struct OpenWeatherIconClient {
    host: String,
    http: Client,
}

impl OpenWeatherIconClient {
    pub fn new(host: String) -> Self {
        Self {
            host,
            http: Client::new(),
        }
    }
}

fn icon_endpoint(icon_code: &str) -> String {
    format!("{ICON_ENDPOINT}{icon_code}{ICON_SUFFIX}")
}

#[async_trait]
impl ImageFetchClient for OpenWeatherIconClient {
    async fn fetch(&self, icon_code: &str) -> Result<IconAsset, FetchError> {
        let url = endpoint_url(&self.host, &icon_endpoint(icon_code))?;

        tracing::debug!(icon_code, "fetching condition icon");

        let body = send(self.http.get(url)).await?;
        Ok(IconAsset::new(body))
    }
}
