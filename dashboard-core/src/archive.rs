use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::fmt::Debug;

use crate::{
    City, Config, DateRange,
    dates::validate_range,
    error::ArchiveError,
    model::{ArchiveRequest, ArchiveResponse},
};

/// Source of historical weather observations.
#[async_trait]
pub trait WeatherArchive: Send + Sync + Debug {
    async fn fetch(&self, request: &ArchiveRequest) -> Result<ArchiveResponse, ArchiveError>;
}

/// Open-Meteo historical archive.
#[derive(Debug, Clone)]
pub struct OpenMeteoArchive {
    base_url: String,
    http: Client,
}

impl OpenMeteoArchive {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new() }
    }
}

#[async_trait]
impl WeatherArchive for OpenMeteoArchive {
    async fn fetch(&self, request: &ArchiveRequest) -> Result<ArchiveResponse, ArchiveError> {
        tracing::debug!(
            lat = request.latitude,
            lon = request.longitude,
            range = %request.range,
            "requesting weather archive"
        );

        let res = self.http.get(&self.base_url).query(&request.query_pairs()).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "weather archive request failed");
            return Err(ArchiveError::from_status(status));
        }

        let parsed: ArchiveResponse = serde_json::from_str(&body)?;

        if parsed.is_empty() {
            return Err(ArchiveError::NoData);
        }

        Ok(parsed)
    }
}

/// Validates ranges and issues the overview and insights requests.
#[derive(Debug)]
pub struct ArchiveClient {
    archive: Box<dyn WeatherArchive>,
    timezone: String,
    max_range_days: u64,
}

impl ArchiveClient {
    pub fn new(archive: Box<dyn WeatherArchive>, timezone: &str, max_range_days: u64) -> Self {
        Self { archive, timezone: timezone.to_string(), max_range_days }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(OpenMeteoArchive::new(config.archive.base_url.clone())),
            &config.archive.timezone,
            config.max_range_days,
        )
    }

    /// Daily aggregates for the overview.
    pub async fn fetch_daily(
        &self,
        city: &City,
        range: DateRange,
        today: NaiveDate,
    ) -> Result<ArchiveResponse, ArchiveError> {
        validate_range(range, self.max_range_days, today)?;
        let request = ArchiveRequest::daily(city, range, &self.timezone);
        self.archive.fetch(&request).await
    }

    /// Every hourly parameter; the caller picks which to show.
    pub async fn fetch_hourly(
        &self,
        city: &City,
        range: DateRange,
        today: NaiveDate,
    ) -> Result<ArchiveResponse, ArchiveError> {
        validate_range(range, self.max_range_days, today)?;
        let request = ArchiveRequest::hourly(city, range, &self.timezone);
        self.archive.fetch(&request).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
