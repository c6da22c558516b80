//! OpenStreetMap Nominatim search. Free, no key required.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::City;

use super::{Geocoder, GeocoderId, USER_AGENT};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

const PLACE_TYPES: &[&str] = &["city", "town", "village", "municipality"];

/// Results at or below this importance are mostly hamlets and landmarks.
const MIN_IMPORTANCE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self { base_url: NOMINATIM_URL.to_string(), http: Client::new() }
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: &str) -> Self {
        Self { base_url: base_url.to_string(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    place_id: u64,
    lat: String,
    lon: String,
    display_name: String,
    class: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    importance: f64,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    country: Option<String>,
    state: Option<String>,
    county: Option<String>,
}

impl NominatimResult {
    fn is_settlement(&self) -> bool {
        self.class == "place"
            && PLACE_TYPES.contains(&self.kind.as_str())
            && self.importance > MIN_IMPORTANCE
    }

    fn into_city(self) -> Option<City> {
        let latitude = self.lat.parse().ok()?;
        let longitude = self.lon.parse().ok()?;
        let address = self.address.unwrap_or_default();

        // Prefer city > town > village > municipality, then the leading display segment
        let name = address
            .city
            .or(address.town)
            .or(address.village)
            .or(address.municipality)
            .unwrap_or_else(|| {
                self.display_name.split(',').next().unwrap_or_default().trim().to_string()
            });

        let country = address.country.unwrap_or_else(|| "Unknown".to_string());
        let state = address.state.or(address.county).filter(|s| !s.is_empty());

        if name.is_empty() || country.is_empty() {
            return None;
        }

        Some(City {
            id: format!("nominatim-{}", self.place_id),
            name,
            country,
            state,
            latitude,
            longitude,
            is_custom: true,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn id(&self) -> GeocoderId {
        GeocoderId::Nominatim
    }

    async fn search(&self, query: &str) -> Result<Vec<City>> {
        let res = self
            .http
            .get(&self.base_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "15"),
                ("featureType", "city"),
                ("addressdetails", "1"),
                ("extratags", "1"),
                ("accept-language", "en"),
            ])
            .send()
            .await
            .context("Failed to send request to Nominatim")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Nominatim HTTP error! status: {}", status.as_u16()));
        }

        let results: Vec<NominatimResult> =
            res.json().await.context("Failed to parse Nominatim JSON")?;

        let cities: Vec<City> = results
            .into_iter()
            .filter(NominatimResult::is_settlement)
            .filter_map(NominatimResult::into_city)
            .collect();

        tracing::debug!(query, count = cities.len(), "nominatim results");
        Ok(cities)
    }
}
