use chrono::NaiveDate;

use dashboard_core::{
    City, HourlyParameter,
    dates::QuickRange,
    model::{ChartPoint, MultiParameterPoint, TemperaturePoint},
    stats::{Correlation, DEFAULT_TREND_TOLERANCE, SeriesSummary, trend},
};

pub fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

pub fn city_line(city: &City) -> String {
    let marker = if city.is_custom { " *" } else { "" };
    format!("{:<16} {}{}", city.id, city.display_name(), marker)
}

/// Daily table: one row per date with temperature, precipitation and wind.
pub fn daily_table(
    temperature: &[TemperaturePoint],
    precipitation: &[ChartPoint],
    wind: &[ChartPoint],
) -> String {
    let mut out = format!(
        "{:<8} {:>8} {:>8} {:>8} {:>10} {:>10}\n",
        "Date", "Max °C", "Min °C", "Mean °C", "Precip mm", "Wind km/h"
    );

    for (i, t) in temperature.iter().enumerate() {
        let rain = precipitation.get(i).and_then(|p| p.value);
        let gust = wind.get(i).and_then(|p| p.value);
        out.push_str(&format!(
            "{:<8} {:>8} {:>8} {:>8} {:>10} {:>10}\n",
            t.date,
            fmt_value(t.max),
            fmt_value(t.min),
            fmt_value(t.mean),
            fmt_value(rain),
            fmt_value(gust),
        ));
    }

    out
}

/// "label: min .. max, avg x unit, trend"
pub fn summary_line(label: &str, unit: &str, values: &[Option<f64>], show_total: bool) -> String {
    let Some(s) = SeriesSummary::of(values) else {
        return format!("{label}: no data");
    };
    let t = trend(values, DEFAULT_TREND_TOLERANCE);

    let mut line = format!(
        "{label}: {:.1} .. {:.1} {unit}, avg {:.1} {unit}",
        s.min, s.max, s.mean
    );
    if show_total {
        line.push_str(&format!(", total {:.1} {unit}", s.total));
    }
    line.push_str(&format!(", trend {} {:?}", t.arrow(), t));
    line
}

pub fn hourly_table(points: &[MultiParameterPoint], selected: &[HourlyParameter]) -> String {
    let mut out = format!("{:<18}", "Time");
    for p in selected {
        out.push_str(&format!(" {:>24}", format!("{} ({})", p.label(), p.unit())));
    }
    out.push('\n');

    for point in points {
        out.push_str(&format!("{:<18}", point.time));
        for p in selected {
            out.push_str(&format!(" {:>24}", fmt_value(point.get(*p))));
        }
        out.push('\n');
    }

    out
}

/// One line per quick-range preset, resolved against `today`.
pub fn presets_table(today: NaiveDate) -> String {
    QuickRange::all()
        .iter()
        .map(|preset| format!("{:<14} {}\n", preset.label(), preset.range(today)))
        .collect()
}

pub fn correlation_line(a: HourlyParameter, b: HourlyParameter, c: &Correlation) -> String {
    format!(
        "{} vs {}: r = {:.2} ({} {}, n = {})",
        a.label(),
        b.label(),
        c.coefficient,
        c.strength.as_str(),
        c.direction(),
        c.sample_size
    )
}
