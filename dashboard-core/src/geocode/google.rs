use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;

use crate::City;

use super::{Geocoder, GeocoderId, USER_AGENT};

const GOOGLE_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Each prediction costs a details lookup, so only the first few are resolved.
const MAX_DETAILS: usize = 5;

#[derive(Debug, Clone)]
pub struct GooglePlacesGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GooglePlacesGeocoder {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: GOOGLE_PLACES_URL.to_string(), http: Client::new() }
    }

    #[cfg(test)]
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self { api_key: api_key.to_string(), base_url: base_url.to_string(), http: Client::new() }
    }

    async fn predictions(&self, query: &str) -> Result<Vec<GpPrediction>> {
        let res = self
            .http
            .get(format!("{}/autocomplete/json", self.base_url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("input", query), ("types", "(cities)"), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to send request to Google Places (autocomplete)")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Google Places HTTP error! status: {}", status.as_u16()));
        }

        let parsed: GpAutocompleteResponse =
            res.json().await.context("Failed to parse Google Places autocomplete JSON")?;

        Ok(parsed.predictions)
    }

    async fn details(&self, place_id: &str) -> Result<GpPlaceDetails> {
        let res = self
            .http
            .get(format!("{}/details/json", self.base_url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("place_id", place_id),
                ("fields", "geometry,address_components,formatted_address"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to Google Places (details)")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Google Places details HTTP error! status: {}", status.as_u16()));
        }

        let parsed: GpDetailsResponse =
            res.json().await.context("Failed to parse Google Places details JSON")?;

        Ok(parsed.result)
    }
}

#[derive(Debug, Deserialize)]
struct GpAutocompleteResponse {
    #[serde(default)]
    predictions: Vec<GpPrediction>,
}

#[derive(Debug, Deserialize)]
struct GpPrediction {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct GpDetailsResponse {
    result: GpPlaceDetails,
}

#[derive(Debug, Deserialize)]
struct GpPlaceDetails {
    geometry: GpGeometry,
    #[serde(default)]
    address_components: Vec<GpAddressComponent>,
    formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct GpGeometry {
    location: GpLatLng,
}

#[derive(Debug, Deserialize)]
struct GpLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GpAddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GpPlaceDetails {
    fn component(&self, kind: &str) -> Option<&str> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| c.long_name.as_str())
    }

    fn into_city(self) -> City {
        let country = self.component("country").unwrap_or("Unknown").to_string();
        let state = self.component("administrative_area_level_1").map(str::to_string);
        let name = self.formatted_address.split(',').next().unwrap_or_default().trim().to_string();
        let GpLatLng { lat, lng } = self.geometry.location;

        City {
            id: format!("google-{lat}-{lng}"),
            name,
            country,
            state,
            latitude: lat,
            longitude: lng,
            is_custom: true,
        }
    }
}

#[async_trait]
impl Geocoder for GooglePlacesGeocoder {
    fn id(&self) -> GeocoderId {
        GeocoderId::GooglePlaces
    }

    async fn search(&self, query: &str) -> Result<Vec<City>> {
        let predictions = self.predictions(query).await?;

        let lookups = predictions.iter().take(MAX_DETAILS).map(|p| self.details(&p.place_id));

        let cities = join_all(lookups)
            .await
            .into_iter()
            .filter_map(|details| match details {
                Ok(details) => Some(details.into_city()),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping place without details");
                    None
                }
            })
            .collect();

        Ok(cities)
    }
}
