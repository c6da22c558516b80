//! City search across every configured geocoder.
//!
//! Providers are queried concurrently and individual failures are tolerated:
//! a provider that errors simply contributes nothing. Results are merged,
//! de-duplicated by name and country, ranked and cached per query for the
//! lifetime of the [`CitySearch`].

use futures::future::join_all;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::{
    City, Config,
    geocode::{Geocoder, geocoders_from_config},
};

#[derive(Debug)]
pub struct CitySearch {
    geocoders: Vec<Box<dyn Geocoder>>,
    cache: Mutex<HashMap<String, Vec<City>>>,
    generation: AtomicU64,
    debounce: Duration,
    min_query_len: usize,
    max_results: usize,
}

impl CitySearch {
    pub fn new(geocoders: Vec<Box<dyn Geocoder>>) -> Self {
        Self {
            geocoders,
            cache: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            debounce: Duration::from_millis(300),
            min_query_len: 2,
            max_results: 10,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(geocoders_from_config(config))
            .with_debounce(Duration::from_millis(config.search.debounce_ms))
            .with_limits(config.search.min_query_len, config.search.max_results)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_limits(mut self, min_query_len: usize, max_results: usize) -> Self {
        self.min_query_len = min_query_len;
        self.max_results = max_results;
        self
    }

    pub fn provider_count(&self) -> usize {
        self.geocoders.len()
    }

    /// Searches all providers. Short queries and total failure both yield an empty list.
    pub async fn search(&self, query: &str) -> Vec<City> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_query_len {
            return Vec::new();
        }

        let key = trimmed.to_lowercase();
        if let Some(hit) = self.cached(&key) {
            tracing::debug!(query = trimmed, "city search cache hit");
            return hit;
        }

        let lookups = self.geocoders.iter().map(|g| async move { (g.id(), g.search(trimmed).await) });

        let mut merged = Vec::new();
        for (id, outcome) in join_all(lookups).await {
            match outcome {
                Ok(cities) => merged.extend(cities),
                Err(e) => tracing::warn!(provider = %id, error = %e, "city search provider failed"),
            }
        }

        let mut cities = dedup(merged);
        rank(&mut cities, trimmed);
        cities.truncate(self.max_results);

        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, cities.clone());

        cities
    }

    /// Waits out the debounce interval first. Returns `None` when a newer call
    /// arrived in the meantime, so only the last of a burst hits the network.
    pub async fn search_debounced(&self, query: &str) -> Option<Vec<City>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::trace!(query, "debounced search superseded");
            return None;
        }

        Some(self.search(query).await)
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clear();
    }

    fn cached(&self, key: &str) -> Option<Vec<City>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).get(key).cloned()
    }
}

/// Keeps the first city for each case-insensitive name/country pair.
fn dedup(cities: Vec<City>) -> Vec<City> {
    let mut seen = HashSet::new();
    cities
        .into_iter()
        .filter(|c| seen.insert(format!("{}-{}", c.name.to_lowercase(), c.country.to_lowercase())))
        .collect()
}

/// Exact name matches first, then cities whose country mentions the query.
/// The sort is stable so provider order breaks ties.
fn rank(cities: &mut [City], query: &str) {
    let q = query.to_lowercase();
    cities.sort_by_key(|c| {
        let exact = c.name.to_lowercase() == q;
        let country_match = c.country.to_lowercase().contains(&q);
        (!exact, !country_match)
    });
}
