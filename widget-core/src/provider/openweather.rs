use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{ConditionEntry, Coordinate, WeatherReading},
    provider::{endpoint_url, send},
};

use super::WeatherFetchClient;

const CURRENT_WEATHER_ENDPOINT: &str = "data/2.5/weather";

/// Current-conditions client for an OpenWeather-compatible service.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    host: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    /// `host` is the service root including its trailing slash,
    /// e.g. `https://api.openweathermap.org/`.
    pub fn new(host: String, api_key: String) -> Self {
        Self {
            host,
            api_key,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    weather: Vec<OwCondition>,
    main: OwMain,
    name: String,
}

impl From<OwCurrentResponse> for WeatherReading {
    fn from(parsed: OwCurrentResponse) -> Self {
        Self {
            place_name: parsed.name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            pressure: parsed.main.pressure,
            humidity: parsed.main.humidity,
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| ConditionEntry {
                    description: w.description,
                    icon_code: w.icon,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl WeatherFetchClient for OpenWeatherClient {
    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherReading, FetchError> {
        let url = endpoint_url(&self.host, CURRENT_WEATHER_ENDPOINT)?;

        tracing::debug!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "fetching current weather"
        );

        let request = self.http.get(url).query(&[
            ("units", "metric"),
            ("lat", coordinate.latitude.to_string().as_str()),
            ("lon", coordinate.longitude.to_string().as_str()),
            ("appid", self.api_key.as_str()),
        ]);

        let body = send(request).await?;

        let parsed: OwCurrentResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(parsed.into())
    }
}
