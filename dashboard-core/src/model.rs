use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// A place weather can be requested for.
///
/// Serialized with camelCase keys so that custom-city files stay readable by
/// other dashboard front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_custom: bool,
}

impl City {
    pub fn new(id: &str, name: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            state: None,
            latitude,
            longitude,
            is_custom: false,
        }
    }

    /// "Name, State, Country", skipping an empty state.
    pub fn display_name(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start.format("%b %-d, %Y"), self.end.format("%b %-d, %Y"))
    }
}

/// Daily aggregates shown on the overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyParameter {
    TemperatureMax,
    TemperatureMin,
    TemperatureMean,
    PrecipitationSum,
    WindSpeedMax,
}

impl DailyParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyParameter::TemperatureMax => "temperature_2m_max",
            DailyParameter::TemperatureMin => "temperature_2m_min",
            DailyParameter::TemperatureMean => "temperature_2m_mean",
            DailyParameter::PrecipitationSum => "precipitation_sum",
            DailyParameter::WindSpeedMax => "wind_speed_10m_max",
        }
    }

    pub const fn all() -> &'static [DailyParameter] {
        &[
            DailyParameter::TemperatureMax,
            DailyParameter::TemperatureMin,
            DailyParameter::TemperatureMean,
            DailyParameter::PrecipitationSum,
            DailyParameter::WindSpeedMax,
        ]
    }
}

/// Groups parameters that can share a y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisGroup {
    Temperature,
    Humidity,
    Precipitation,
    Pressure,
    Wind,
}

/// Hourly parameters offered on the insights view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HourlyParameter {
    Temperature,
    RelativeHumidity,
    ApparentTemperature,
    Precipitation,
    PressureMsl,
    WindSpeed,
}

impl HourlyParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            HourlyParameter::Temperature => "temperature_2m",
            HourlyParameter::RelativeHumidity => "relative_humidity_2m",
            HourlyParameter::ApparentTemperature => "apparent_temperature",
            HourlyParameter::Precipitation => "precipitation",
            HourlyParameter::PressureMsl => "pressure_msl",
            HourlyParameter::WindSpeed => "wind_speed_10m",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HourlyParameter::Temperature => "Temperature",
            HourlyParameter::RelativeHumidity => "Relative Humidity",
            HourlyParameter::ApparentTemperature => "Apparent Temperature",
            HourlyParameter::Precipitation => "Precipitation",
            HourlyParameter::PressureMsl => "Sea Level Pressure",
            HourlyParameter::WindSpeed => "Wind Speed (10m)",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            HourlyParameter::Temperature | HourlyParameter::ApparentTemperature => "°C",
            HourlyParameter::RelativeHumidity => "%",
            HourlyParameter::Precipitation => "mm",
            HourlyParameter::PressureMsl => "hPa",
            HourlyParameter::WindSpeed => "km/h",
        }
    }

    /// Series colour used by chart front ends.
    pub fn color(&self) -> &'static str {
        match self {
            HourlyParameter::Temperature => "#ef4444",
            HourlyParameter::RelativeHumidity => "#3b82f6",
            HourlyParameter::ApparentTemperature => "#f59e0b",
            HourlyParameter::Precipitation => "#06b6d4",
            HourlyParameter::PressureMsl => "#8b5cf6",
            HourlyParameter::WindSpeed => "#10b981",
        }
    }

    pub fn axis(&self) -> AxisGroup {
        match self {
            HourlyParameter::Temperature | HourlyParameter::ApparentTemperature => {
                AxisGroup::Temperature
            }
            HourlyParameter::RelativeHumidity => AxisGroup::Humidity,
            HourlyParameter::Precipitation => AxisGroup::Precipitation,
            HourlyParameter::PressureMsl => AxisGroup::Pressure,
            HourlyParameter::WindSpeed => AxisGroup::Wind,
        }
    }

    pub const fn all() -> &'static [HourlyParameter] {
        &[
            HourlyParameter::Temperature,
            HourlyParameter::RelativeHumidity,
            HourlyParameter::ApparentTemperature,
            HourlyParameter::Precipitation,
            HourlyParameter::PressureMsl,
            HourlyParameter::WindSpeed,
        ]
    }
}

impl std::fmt::Display for HourlyParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HourlyParameter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl TryFrom<&str> for HourlyParameter {
    type Error = SelectionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        HourlyParameter::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| SelectionError::UnknownParameter(value.to_string()))
    }
}

/// Query sent to the weather archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub range: DateRange,
    pub daily: Vec<DailyParameter>,
    pub hourly: Vec<HourlyParameter>,
    pub timezone: Option<String>,
}

impl ArchiveRequest {
    pub fn daily(city: &City, range: DateRange, timezone: &str) -> Self {
        Self {
            latitude: city.latitude,
            longitude: city.longitude,
            range,
            daily: DailyParameter::all().to_vec(),
            hourly: Vec::new(),
            timezone: Some(timezone.to_string()),
        }
    }

    pub fn hourly(city: &City, range: DateRange, timezone: &str) -> Self {
        Self {
            latitude: city.latitude,
            longitude: city.longitude,
            range,
            daily: Vec::new(),
            hourly: HourlyParameter::all().to_vec(),
            timezone: Some(timezone.to_string()),
        }
    }

    /// Query string pairs; empty parameter lists and a missing timezone are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("start_date", self.range.start.format("%Y-%m-%d").to_string()),
            ("end_date", self.range.end.format("%Y-%m-%d").to_string()),
        ];

        if !self.daily.is_empty() {
            let list: Vec<&str> = self.daily.iter().map(DailyParameter::as_str).collect();
            pairs.push(("daily", list.join(",")));
        }
        if !self.hourly.is_empty() {
            let list: Vec<&str> = self.hourly.iter().map(HourlyParameter::as_str).collect();
            pairs.push(("hourly", list.join(",")));
        }
        if let Some(tz) = &self.timezone {
            pairs.push(("timezone", tz.clone()));
        }

        pairs
    }
}

/// Archive series may contain `null` for missing observations.
pub type Series = Vec<Option<f64>>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Series,
    #[serde(default)]
    pub temperature_2m_min: Series,
    #[serde(default)]
    pub temperature_2m_mean: Series,
    #[serde(default)]
    pub precipitation_sum: Series,
    #[serde(default)]
    pub wind_speed_10m_max: Series,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Series,
    #[serde(default)]
    pub relative_humidity_2m: Series,
    #[serde(default)]
    pub apparent_temperature: Series,
    #[serde(default)]
    pub precipitation: Series,
    #[serde(default)]
    pub pressure_msl: Series,
    #[serde(default)]
    pub wind_speed_10m: Series,
}

impl HourlyData {
    pub fn series(&self, parameter: HourlyParameter) -> &[Option<f64>] {
        match parameter {
            HourlyParameter::Temperature => &self.temperature_2m,
            HourlyParameter::RelativeHumidity => &self.relative_humidity_2m,
            HourlyParameter::ApparentTemperature => &self.apparent_temperature,
            HourlyParameter::Precipitation => &self.precipitation,
            HourlyParameter::PressureMsl => &self.pressure_msl,
            HourlyParameter::WindSpeed => &self.wind_speed_10m,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArchiveResponse {
    pub daily: Option<DailyData>,
    pub hourly: Option<HourlyData>,
    pub daily_units: Option<BTreeMap<String, String>>,
    pub hourly_units: Option<BTreeMap<String, String>>,
}

impl ArchiveResponse {
    pub fn is_empty(&self) -> bool {
        self.daily.is_none() && self.hourly.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperaturePoint {
    pub date: String,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: Option<f64>,
}

/// One hourly timestamp with a value per selected parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiParameterPoint {
    pub time: String,
    pub values: BTreeMap<HourlyParameter, Option<f64>>,
}

impl MultiParameterPoint {
    pub fn get(&self, parameter: HourlyParameter) -> Option<f64> {
        self.values.get(&parameter).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn hourly_parameter_as_str_roundtrip() {
        for p in HourlyParameter::all() {
            let parsed = HourlyParameter::try_from(p.as_str()).expect("roundtrip should succeed");
            assert_eq!(*p, parsed);
        }
    }

    #[test]
    fn unknown_hourly_parameter_error() {
        let err = HourlyParameter::try_from("snow_depth").unwrap_err();
        assert!(err.to_string().contains("Unknown hourly parameter"));
    }

    #[test]
    fn display_name_skips_empty_state() {
        let mut city = City::new("x", "Springfield", "United States", 0.0, 0.0);
        assert_eq!(city.display_name(), "Springfield, United States");

        city.state = Some(String::new());
        assert_eq!(city.display_name(), "Springfield, United States");

        city.state = Some("Illinois".into());
        assert_eq!(city.display_name(), "Springfield, Illinois, United States");
    }

    #[test]
    fn daily_request_query_pairs() {
        let city = City::new("london", "London", "United Kingdom", 51.5074, -0.1278);
        let range = DateRange::new(date("2024-03-01"), date("2024-03-08"));

        let pairs = ArchiveRequest::daily(&city, range, "auto").query_pairs();

        assert!(pairs.contains(&("latitude", "51.5074".to_string())));
        assert!(pairs.contains(&("start_date", "2024-03-01".to_string())));
        assert!(pairs.contains(&("end_date", "2024-03-08".to_string())));
        assert!(pairs.contains(&(
            "daily",
            "temperature_2m_max,temperature_2m_min,temperature_2m_mean,precipitation_sum,wind_speed_10m_max"
                .to_string()
        )));
        assert!(pairs.contains(&("timezone", "auto".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "hourly"));
    }

    #[test]
    fn response_tolerates_nulls_and_missing_series() {
        let json = r#"{
            "daily": {
                "time": ["2024-03-01", "2024-03-02"],
                "temperature_2m_max": [10.5, null]
            }
        }"#;

        let parsed: ArchiveResponse = serde_json::from_str(json).unwrap();
        let daily = parsed.daily.expect("daily block");

        assert_eq!(daily.temperature_2m_max, vec![Some(10.5), None]);
        assert!(daily.precipitation_sum.is_empty());
        assert!(parsed.hourly.is_none());
    }

    #[test]
    fn city_uses_camel_case_on_disk() {
        let mut city = City::new("nominatim-1", "Ghent", "Belgium", 51.05, 3.72);
        city.is_custom = true;

        let json = serde_json::to_string(&city).unwrap();
        assert!(json.contains("\"isCustom\":true"));
        assert!(!json.contains("state"));
    }
}
