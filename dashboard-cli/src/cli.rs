use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use inquire::{MultiSelect, Password, PasswordDisplayMode};

use dashboard_core::{
    ArchiveClient, ArchiveError, City, CitySearch, Config, CustomCityStore, DateRange, GeocoderId,
    ParameterSelection, cities,
    dates::{self, QuickRange},
    stats::Correlation,
    transform,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxdash", version, about = "Historical weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key of a keyed geocoding provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "google".
        provider: String,
    },

    /// List built-in and saved cities, optionally filtered.
    Cities {
        /// Filter by name or country; with --remote also search geocoders.
        #[arg(long, short)]
        query: Option<String>,

        /// Include geocoder results not already known.
        #[arg(long, requires = "query")]
        remote: bool,
    },

    /// Search geocoding providers for a city.
    Search {
        query: String,

        /// Pick results to keep as saved cities.
        #[arg(long)]
        save: bool,
    },

    /// Manage saved cities.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Set the city used when --city is omitted.
    Default {
        /// City id or name.
        city: String,
    },

    /// Show quick date-range presets for today.
    Presets,

    /// Daily temperature, precipitation and wind for a city.
    Overview {
        #[command(flatten)]
        target: Target,
    },

    /// Hourly series for up to two parameters, with their correlation.
    Insights {
        #[command(flatten)]
        target: Target,

        /// Hourly parameter key, e.g. temperature_2m. Repeat for a second one.
        #[arg(short = 'p', long = "param", required = true)]
        params: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List saved cities.
    List,
    /// Remove a saved city by id.
    Remove { id: String },
    /// Remove every saved city.
    Clear,
}

/// City and date range shared by the data commands.
#[derive(Debug, Args)]
pub struct Target {
    /// City id or name; defaults to the configured city.
    #[arg(long, short)]
    city: Option<String>,

    /// First day, YYYY-MM-DD.
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Last day, YYYY-MM-DD.
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Preset instead of explicit dates: 7d, 14d, 30d or 90d.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    last: Option<QuickRange>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!(command = ?self.command, "running");

        // Presets depend only on the calendar.
        if let Command::Presets = self.command {
            print!("{}", output::presets_table(dates::today()));
            return Ok(());
        }

        let mut config = Config::load()?;

        match self.command {
            Command::Configure { provider } => configure(&mut config, &provider)?,
            Command::Cities { query, remote } => {
                let store = CustomCityStore::open_default()?;
                list_cities(&config, &store, query.as_deref(), remote).await
            }
            Command::Search { query, save } => {
                let store = CustomCityStore::open_default()?;
                search(&config, &store, &query, save).await?
            }
            Command::Favorites { action } => favorites(&CustomCityStore::open_default()?, action)?,
            Command::Default { city } => {
                let known = known_cities(&CustomCityStore::open_default()?);
                let found = cities::find(&known, &city).ok_or_else(|| unknown_city(&city))?;
                config.set_default_city(&found.id);
                config.save()?;
                println!("Default city set to {}", found.display_name());
            }
            Command::Presets => {}
            Command::Overview { target } => {
                let store = CustomCityStore::open_default()?;
                overview(&config, &store, &target).await?
            }
            Command::Insights { target, params } => {
                let store = CustomCityStore::open_default()?;
                insights(&config, &store, &target, &params).await?
            }
        }

        Ok(())
    }
}

fn configure(config: &mut Config, provider: &str) -> anyhow::Result<()> {
    let id = GeocoderId::try_from(provider)?;
    if !id.requires_api_key() {
        println!("{id} needs no API key; it is always used for city search.");
        return Ok(());
    }

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved API key for {id}.");
    Ok(())
}

fn known_cities(store: &CustomCityStore) -> Vec<City> {
    let mut all = cities::predefined();
    all.extend(store.list());
    all
}

fn unknown_city(name: &str) -> anyhow::Error {
    anyhow!(
        "Unknown city '{name}'.\n\
         Hint: run `wxdash search \"{name}\" --save` to add it."
    )
}

async fn list_cities(config: &Config, store: &CustomCityStore, query: Option<&str>, remote: bool) {
    let known = known_cities(store);

    let shown = match query {
        Some(q) if remote => {
            let found = CitySearch::from_config(config).search(q).await;
            cities::suggestions(&known, q, &found)
        }
        Some(q) => cities::filter(&known, q).into_iter().cloned().collect(),
        None => known,
    };

    for city in &shown {
        println!("{}", output::city_line(city));
    }
}

async fn search(
    config: &Config,
    store: &CustomCityStore,
    query: &str,
    save: bool,
) -> anyhow::Result<()> {
    let searcher = CitySearch::from_config(config);
    let found = searcher.search(query).await;

    if found.is_empty() {
        println!("No cities found for '{query}'.");
        return Ok(());
    }

    if !save {
        for city in &found {
            println!("{}", output::city_line(city));
        }
        return Ok(());
    }

    let options: Vec<CityOption> = found.into_iter().map(CityOption).collect();
    let picked = MultiSelect::new("Cities to save:", options)
        .prompt()
        .context("Failed to read selection")?;

    for CityOption(city) in picked {
        if store.save(&city)? {
            println!("Saved {} as {}", city.display_name(), city.id);
        } else {
            println!("{} is already saved", city.display_name());
        }
    }

    Ok(())
}

/// Display wrapper for interactive pickers.
struct CityOption(City);

impl std::fmt::Display for CityOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.4}, {:.4})", self.0.display_name(), self.0.latitude, self.0.longitude)
    }
}

fn favorites(store: &CustomCityStore, action: FavoritesAction) -> anyhow::Result<()> {
    match action {
        FavoritesAction::List => {
            let saved = store.list();
            if saved.is_empty() {
                println!("No saved cities.");
            }
            for city in &saved {
                println!("{}", output::city_line(city));
            }
        }
        FavoritesAction::Remove { id } => {
            if store.remove(&id)? {
                println!("Removed {id}");
            } else {
                println!("No saved city with id {id}");
            }
        }
        FavoritesAction::Clear => {
            store.clear()?;
            println!("Cleared saved cities.");
        }
    }
    Ok(())
}

fn resolve_city(config: &Config, store: &CustomCityStore, target: &Target) -> anyhow::Result<City> {
    let known = known_cities(store);
    let wanted = target
        .city
        .as_deref()
        .or(config.default_city.as_deref())
        .unwrap_or(cities::DEFAULT_CITY_ID);

    cities::find(&known, wanted).cloned().ok_or_else(|| unknown_city(wanted))
}

/// Picks the range and rejects it early, before anything is fetched.
fn resolve_range(config: &Config, target: &Target, today: NaiveDate) -> anyhow::Result<DateRange> {
    let range = match (&target.last, &target.start, &target.end) {
        (Some(preset), _, _) => preset.range(today),
        (None, Some(start), Some(end)) => {
            DateRange::new(dates::parse_date(start)?, dates::parse_date(end)?)
        }
        _ => dates::default_date_range(today),
    };

    let check = dates::validate_range(range, config.max_range_days, today)?;
    if let Some(note) = check.note {
        eprintln!("{note}");
    }

    Ok(check.range)
}

fn archive_failure(err: ArchiveError) -> anyhow::Error {
    if err.is_retryable() {
        anyhow!("{}\nHint: this looks temporary; run the command again to retry.", err.user_message())
    } else {
        anyhow!("{}", err.user_message())
    }
}

async fn overview(config: &Config, store: &CustomCityStore, target: &Target) -> anyhow::Result<()> {
    let today = dates::today();
    let city = resolve_city(config, store, target)?;
    let range = resolve_range(config, target, today)?;

    let client = ArchiveClient::from_config(config);
    let data = client.fetch_daily(&city, range, today).await.map_err(archive_failure)?;

    let temperature = transform::temperature_series(&data);
    let precipitation = transform::precipitation_series(&data);
    let wind = transform::wind_speed_series(&data);

    println!("Weather overview for {} ({range})\n", city.display_name());
    print!("{}", output::daily_table(&temperature, &precipitation, &wind));
    println!();

    let means: Vec<Option<f64>> = temperature.iter().map(|t| t.mean).collect();
    let rain: Vec<Option<f64>> = precipitation.iter().map(|p| p.value).collect();
    let gusts: Vec<Option<f64>> = wind.iter().map(|p| p.value).collect();

    println!("{}", output::summary_line("Mean temperature", "°C", &means, false));
    println!("{}", output::summary_line("Precipitation", "mm", &rain, true));
    println!("{}", output::summary_line("Max wind speed", "km/h", &gusts, false));

    Ok(())
}

async fn insights(
    config: &Config,
    store: &CustomCityStore,
    target: &Target,
    params: &[String],
) -> anyhow::Result<()> {
    let selection = ParameterSelection::from_keys(params)?;
    let today = dates::today();
    let city = resolve_city(config, store, target)?;
    let range = resolve_range(config, target, today)?;

    let client = ArchiveClient::from_config(config);
    let data = client.fetch_hourly(&city, range, today).await.map_err(archive_failure)?;

    let selected = selection.as_slice();
    let points = transform::hourly_series(&data, selected);

    println!("Hourly weather for {} ({range})\n", city.display_name());
    print!("{}", output::hourly_table(&points, selected));

    if let (Some(hourly), [a, b]) = (&data.hourly, selected) {
        let correlation = Correlation::between(hourly.series(*a), hourly.series(*b));
        println!();
        println!("{}", output::correlation_line(*a, *b, &correlation));
        if selection.uses_dual_axis() {
            println!("(different units: compare shapes, not magnitudes)");
        }
    }

    Ok(())
}
