use crate::{
    City, Config,
    geocode::{google::GooglePlacesGeocoder, nominatim::NominatimGeocoder, openweather::OpenWeatherGeocoder},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod google;
pub mod nominatim;
pub mod openweather;

/// Sent with every geocoding request; Nominatim rejects anonymous clients.
pub const USER_AGENT: &str = concat!("wxdash/", env!("CARGO_PKG_VERSION"), " (weather-dashboard)");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeocoderId {
    Nominatim,
    OpenWeather,
    GooglePlaces,
}

impl GeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocoderId::Nominatim => "nominatim",
            GeocoderId::OpenWeather => "openweather",
            GeocoderId::GooglePlaces => "google",
        }
    }

    pub const fn all() -> &'static [GeocoderId] {
        &[GeocoderId::Nominatim, GeocoderId::OpenWeather, GeocoderId::GooglePlaces]
    }

    /// Whether the provider needs an API key from the config.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, GeocoderId::Nominatim)
    }
}

impl std::fmt::Display for GeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "nominatim" | "osm" => Ok(GeocoderId::Nominatim),
            "openweather" => Ok(GeocoderId::OpenWeather),
            "google" | "googleplaces" => Ok(GeocoderId::GooglePlaces),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoding provider '{value}'. Supported providers: nominatim, openweather, google."
            )),
        }
    }
}

/// Turns free-text queries into candidate cities.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    fn id(&self) -> GeocoderId;

    async fn search(&self, query: &str) -> anyhow::Result<Vec<City>>;
}

fn required_api_key(id: GeocoderId, config: &Config) -> anyhow::Result<String> {
    config.provider_api_key(id).map(str::to_owned).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `wxdash configure {id}` and enter your API key."
        )
    })
}

/// Construct a geocoder from config and explicit GeocoderId.
pub fn geocoder_from_config(id: GeocoderId, config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    let boxed: Box<dyn Geocoder> = match id {
        GeocoderId::Nominatim => Box::new(NominatimGeocoder::new()),
        GeocoderId::OpenWeather => {
            Box::new(OpenWeatherGeocoder::new(required_api_key(id, config)?))
        }
        GeocoderId::GooglePlaces => {
            Box::new(GooglePlacesGeocoder::new(required_api_key(id, config)?))
        }
    };

    Ok(boxed)
}

/// Every geocoder usable with the current config. Keyed providers without a key are skipped.
pub fn geocoders_from_config(config: &Config) -> Vec<Box<dyn Geocoder>> {
    GeocoderId::all()
        .iter()
        .filter(|id| !id.requires_api_key() || config.is_provider_configured(**id))
        .filter_map(|id| match geocoder_from_config(*id, config) {
            Ok(geocoder) => Some(geocoder),
            Err(e) => {
                tracing::warn!(provider = %id, error = %e, "skipping geocoder");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocoder_id_as_str_roundtrip() {
        for id in GeocoderId::all() {
            let parsed = GeocoderId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_geocoder_error() {
        let err = GeocoderId::try_from("bing").unwrap_err();
        assert!(err.to_string().contains("Unknown geocoding provider"));
    }

    #[test]
    fn keyed_geocoder_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = geocoder_from_config(GeocoderId::OpenWeather, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
        assert!(err.to_string().contains("wxdash configure openweather"));
    }

    #[test]
    fn nominatim_needs_no_key() {
        let cfg = Config::default();
        let geocoder = geocoder_from_config(GeocoderId::Nominatim, &cfg).unwrap();
        assert_eq!(geocoder.id(), GeocoderId::Nominatim);
    }

    #[test]
    fn configured_geocoders_follow_keys() {
        let mut cfg = Config::default();
        let ids: Vec<_> = geocoders_from_config(&cfg).iter().map(|g| g.id()).collect();
        assert_eq!(ids, vec![GeocoderId::Nominatim]);

        cfg.upsert_provider_api_key(GeocoderId::GooglePlaces, "KEY".into());
        let ids: Vec<_> = geocoders_from_config(&cfg).iter().map(|g| g.id()).collect();
        assert_eq!(ids, vec![GeocoderId::Nominatim, GeocoderId::GooglePlaces]);
    }
}
