//! Core library for the `wxdash` weather dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - The historical weather archive client and date-range rules
//! - City search over several geocoding providers, plus saved custom cities
//! - Transforms and statistics that turn archive responses into chart series
//!
//! It is used by `dashboard-cli`, but can also be reused by other front ends.

pub mod archive;
pub mod cities;
pub mod config;
pub mod dates;
pub mod error;
pub mod geocode;
pub mod model;
pub mod parameters;
pub mod search;
pub mod stats;
pub mod store;
pub mod transform;

pub use archive::{ArchiveClient, OpenMeteoArchive, WeatherArchive};
pub use config::{ArchiveConfig, Config, ProviderConfig, SearchConfig};
pub use error::{ArchiveError, DateRangeError, SelectionError};
pub use geocode::{Geocoder, GeocoderId};
pub use model::{
    ArchiveRequest, ArchiveResponse, City, DateRange, DailyParameter, HourlyParameter,
};
pub use parameters::ParameterSelection;
pub use search::CitySearch;
pub use store::CustomCityStore;
