use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::City;

use super::{Geocoder, GeocoderId, USER_AGENT};

const DIRECT_GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";

#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherGeocoder {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DIRECT_GEOCODING_URL.to_string(), http: Client::new() }
    }

    #[cfg(test)]
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self { api_key: api_key.to_string(), base_url: base_url.to_string(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoResult {
    #[serde(default)]
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    state: Option<String>,
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    fn id(&self) -> GeocoderId {
        GeocoderId::OpenWeather
    }

    async fn search(&self, query: &str) -> Result<Vec<City>> {
        let res = self
            .http
            .get(&self.base_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("q", query), ("limit", "10"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to send request to OpenWeather geocoding")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("OpenWeather HTTP error! status: {}", status.as_u16()));
        }

        let results: Vec<OwGeoResult> =
            res.json().await.context("Failed to parse OpenWeather geocoding JSON")?;

        Ok(results
            .into_iter()
            .filter(|r| !r.name.is_empty() && !r.country.is_empty())
            .map(|r| City {
                id: format!("openweather-{}-{}", r.lat, r.lon),
                name: r.name,
                country: r.country,
                state: r.state.filter(|s| !s.is_empty()),
                latitude: r.lat,
                longitude: r.lon,
                is_custom: true,
            })
            .collect())
    }
}
