//! Reshapes archive responses into chart-ready series.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{
    ArchiveResponse, ChartPoint, HourlyParameter, MultiParameterPoint, Series, TemperaturePoint,
};

fn value_at(series: &Series, index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

pub fn temperature_series(data: &ArchiveResponse) -> Vec<TemperaturePoint> {
    let Some(daily) = &data.daily else {
        return Vec::new();
    };

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| TemperaturePoint {
            date: format_date(date),
            max: value_at(&daily.temperature_2m_max, i),
            min: value_at(&daily.temperature_2m_min, i),
            mean: value_at(&daily.temperature_2m_mean, i),
        })
        .collect()
}

pub fn precipitation_series(data: &ArchiveResponse) -> Vec<ChartPoint> {
    daily_series(data, |d| &d.precipitation_sum)
}

pub fn wind_speed_series(data: &ArchiveResponse) -> Vec<ChartPoint> {
    daily_series(data, |d| &d.wind_speed_10m_max)
}

fn daily_series(
    data: &ArchiveResponse,
    pick: impl Fn(&crate::model::DailyData) -> &Series,
) -> Vec<ChartPoint> {
    let Some(daily) = &data.daily else {
        return Vec::new();
    };
    let values = pick(daily);

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| ChartPoint { date: format_date(date), value: value_at(values, i) })
        .collect()
}

/// One point per hour holding only the selected parameters.
pub fn hourly_series(
    data: &ArchiveResponse,
    selected: &[HourlyParameter],
) -> Vec<MultiParameterPoint> {
    let Some(hourly) = &data.hourly else {
        return Vec::new();
    };
    if selected.is_empty() {
        return Vec::new();
    }

    hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| MultiParameterPoint {
            time: format_date_time(time),
            values: selected
                .iter()
                .map(|p| (*p, hourly.series(*p).get(i).copied().flatten()))
                .collect(),
        })
        .collect()
}

/// `2023-01-01` -> `Jan 1`. Unparseable input is returned as is.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%b %-d").to_string(),
        Err(_) => date.to_string(),
    }
}

/// `2023-01-01T00:00` -> `Jan 1, 12:00 AM`.
pub fn format_date_time(time: &str) -> String {
    match NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M") {
        Ok(dt) => dt.format("%b %-d, %I:%M %p").to_string(),
        Err(_) => time.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DailyData, HourlyData};

    fn daily_response() -> ArchiveResponse {
        ArchiveResponse {
            daily: Some(DailyData {
                time: vec!["2023-01-01".into(), "2023-01-02".into(), "2023-01-03".into()],
                temperature_2m_max: vec![Some(10.0), Some(12.0), Some(8.0)],
                temperature_2m_min: vec![Some(2.0), Some(4.0), Some(1.0)],
                temperature_2m_mean: vec![Some(6.0), Some(8.0), Some(4.0)],
                precipitation_sum: vec![Some(0.0), Some(5.0), Some(10.0)],
                wind_speed_10m_max: vec![Some(15.0), Some(20.0), Some(25.0)],
            }),
            ..Default::default()
        }
    }

    fn hourly_response() -> ArchiveResponse {
        ArchiveResponse {
            hourly: Some(HourlyData {
                time: vec!["2023-01-01T00:00".into(), "2023-01-01T01:00".into(), "2023-01-01T02:00".into()],
                temperature_2m: vec![Some(5.0), Some(6.0), Some(7.0)],
                relative_humidity_2m: vec![Some(80.0), Some(85.0), Some(90.0)],
                apparent_temperature: vec![Some(3.0), Some(4.0), Some(5.0)],
                precipitation: vec![Some(0.0), Some(0.0), Some(2.0)],
                pressure_msl: vec![Some(1013.0), Some(1014.0), Some(1015.0)],
                wind_speed_10m: vec![Some(10.0), Some(12.0), Some(14.0)],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn temperature_points() {
        let points = temperature_series(&daily_response());

        assert_eq!(points.len(), 3);
        assert_eq!(
            points[0],
            TemperaturePoint { date: "Jan 1".into(), max: Some(10.0), min: Some(2.0), mean: Some(6.0) }
        );
        assert_eq!(points[1].date, "Jan 2");
    }

    #[test]
    fn daily_series_empty_without_daily_block() {
        let empty = ArchiveResponse::default();
        assert!(temperature_series(&empty).is_empty());
        assert!(precipitation_series(&empty).is_empty());
        assert!(wind_speed_series(&empty).is_empty());
    }

    #[test]
    fn precipitation_and_wind_points() {
        let data = daily_response();

        let rain = precipitation_series(&data);
        assert_eq!(rain[1], ChartPoint { date: "Jan 2".into(), value: Some(5.0) });

        let wind = wind_speed_series(&data);
        assert_eq!(wind[2], ChartPoint { date: "Jan 3".into(), value: Some(25.0) });
    }

    #[test]
    fn short_series_yields_gaps() {
        let mut data = daily_response();
        if let Some(daily) = data.daily.as_mut() {
            daily.precipitation_sum.truncate(1);
        }

        let rain = precipitation_series(&data);
        assert_eq!(rain.len(), 3);
        assert_eq!(rain[2].value, None);
    }

    #[test]
    fn hourly_points_only_hold_selected() {
        let selected = [HourlyParameter::Temperature, HourlyParameter::RelativeHumidity];
        let points = hourly_series(&hourly_response(), &selected);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].time, "Jan 1, 12:00 AM");
        assert_eq!(points[0].get(HourlyParameter::Temperature), Some(5.0));
        assert_eq!(points[0].get(HourlyParameter::RelativeHumidity), Some(80.0));
        assert_eq!(points[0].values.len(), 2);
    }

    #[test]
    fn hourly_points_empty_cases() {
        assert!(hourly_series(&hourly_response(), &[]).is_empty());
        assert!(hourly_series(&ArchiveResponse::default(), &[HourlyParameter::Temperature]).is_empty());
    }

    #[test]
    fn formatting() {
        assert_eq!(format_date("2023-12-25"), "Dec 25");
        assert_eq!(format_date_time("2023-01-01T13:00"), "Jan 1, 01:00 PM");
        assert_eq!(format_date("not a date"), "not a date");
    }
}
