use crate::{
    config::WidgetConfig,
    error::FetchError,
    model::{Coordinate, IconAsset, WeatherReading},
    provider::{icons::OpenWeatherIconClient, openweather::OpenWeatherClient},
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use std::{fmt::Debug, sync::Arc};

pub mod icons;
pub mod openweather;

/// One network round trip per call, yielding the current conditions at a coordinate.
#[async_trait]
pub trait WeatherFetchClient: Send + Sync + Debug {
    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherReading, FetchError>;
}

/// One network round trip per call, yielding the raw bytes of a condition icon.
///
/// `icon_code` is opaque to callers; the client owns the naming convention
/// that turns it into a request URL.
#[async_trait]
pub trait ImageFetchClient: Send + Sync + Debug {
    async fn fetch(&self, icon_code: &str) -> Result<IconAsset, FetchError>;
}

/// Build both fetch clients from config.
pub fn clients_from_config(
    config: &WidgetConfig,
) -> anyhow::Result<(Arc<dyn WeatherFetchClient>, Arc<dyn ImageFetchClient>)> {
    let api_key = config.api_key()?;

    let weather = OpenWeatherClient::new(config.weather_api_url.clone(), api_key.to_owned());
    let images = OpenWeatherIconClient::new(config.image_api_url.clone());

    Ok((Arc::new(weather), Arc::new(images)))
}

/// Join a service host and an endpoint, failing with `BadUrl` if the result is not absolute.
pub(crate) fn endpoint_url(host: &str, endpoint: &str) -> Result<Url, FetchError> {
    let raw = format!("{host}{endpoint}");
    Url::parse(&raw).map_err(|_| FetchError::BadUrl { url: raw })
}

/// Send a prepared request and return its body, classifying every failure.
pub(crate) async fn send(request: RequestBuilder) -> Result<Vec<u8>, FetchError> {
    let res = request.send().await?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::BadHttpStatus(status));
    }

    let body = res.bytes().await?;
    if body.is_empty() {
        return Err(FetchError::EmptyBody);
    }

    Ok(body.to_vec())
}
