use crate::City;

/// Built-in catalogue: id, name, country, latitude, longitude.
const PREDEFINED: &[(&str, &str, &str, f64, f64)] = &[
    ("new-york", "New York", "United States", 40.7128, -74.0060),
    ("london", "London", "United Kingdom", 51.5074, -0.1278),
    ("tokyo", "Tokyo", "Japan", 35.6762, 139.6503),
    ("mumbai", "Mumbai", "India", 19.0760, 72.8777),
    ("delhi", "Delhi", "India", 28.7041, 77.1025),
    ("bangalore", "Bangalore", "India", 12.9716, 77.5946),
    ("chennai", "Chennai", "India", 13.0827, 80.2707),
    ("kolkata", "Kolkata", "India", 22.5726, 88.3639),
    ("sydney", "Sydney", "Australia", -33.8688, 151.2093),
    ("melbourne", "Melbourne", "Australia", -37.8136, 144.9631),
    ("paris", "Paris", "France", 48.8566, 2.3522),
    ("berlin", "Berlin", "Germany", 52.5200, 13.4050),
    ("madrid", "Madrid", "Spain", 40.4168, -3.7038),
    ("rome", "Rome", "Italy", 41.9028, 12.4964),
    ("amsterdam", "Amsterdam", "Netherlands", 52.3676, 4.9041),
    ("dubai", "Dubai", "United Arab Emirates", 25.2048, 55.2708),
    ("singapore", "Singapore", "Singapore", 1.3521, 103.8198),
    ("hong-kong", "Hong Kong", "China", 22.3193, 114.1694),
    ("seoul", "Seoul", "South Korea", 37.5665, 126.9780),
    ("beijing", "Beijing", "China", 39.9042, 116.4074),
    ("shanghai", "Shanghai", "China", 31.2304, 121.4737),
    ("moscow", "Moscow", "Russia", 55.7558, 37.6176),
    ("istanbul", "Istanbul", "Turkey", 41.0082, 28.9784),
    ("cairo", "Cairo", "Egypt", 30.0444, 31.2357),
    ("johannesburg", "Johannesburg", "South Africa", -26.2041, 28.0473),
    ("mexico-city", "Mexico City", "Mexico", 19.4326, -99.1332),
    ("sao-paulo", "São Paulo", "Brazil", -23.5505, -46.6333),
    ("buenos-aires", "Buenos Aires", "Argentina", -34.6118, -58.3960),
    ("toronto", "Toronto", "Canada", 43.6532, -79.3832),
    ("vancouver", "Vancouver", "Canada", 49.2827, -123.1207),
    ("los-angeles", "Los Angeles", "United States", 34.0522, -118.2437),
    ("chicago", "Chicago", "United States", 41.8781, -87.6298),
    ("houston", "Houston", "United States", 29.7604, -95.3698),
    ("miami", "Miami", "United States", 25.7617, -80.1918),
];

pub const DEFAULT_CITY_ID: &str = "new-york";

/// Remote results closer than this (in degrees, per axis) to a known city are hidden.
const SAME_PLACE_DEGREES: f64 = 0.01;

pub fn predefined() -> Vec<City> {
    PREDEFINED
        .iter()
        .map(|&(id, name, country, lat, lon)| City::new(id, name, country, lat, lon))
        .collect()
}

pub fn default_city() -> City {
    let (id, name, country, lat, lon) = PREDEFINED[0];
    City::new(id, name, country, lat, lon)
}

/// Looks a city up by id, then by case-insensitive name.
pub fn find<'a>(cities: &'a [City], id_or_name: &str) -> Option<&'a City> {
    let needle = id_or_name.trim();
    cities.iter().find(|c| c.id == needle).or_else(|| {
        let lower = needle.to_lowercase();
        cities.iter().find(|c| c.name.to_lowercase() == lower)
    })
}

/// Cities whose name or country contains `query`. Short queries match everything.
pub fn filter<'a>(cities: &'a [City], query: &str) -> Vec<&'a City> {
    if query.chars().count() < 2 {
        return cities.iter().collect();
    }

    let q = query.to_lowercase();
    cities
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&q) || c.country.to_lowercase().contains(&q))
        .collect()
}

fn is_same_place(a: &City, b: &City) -> bool {
    (a.latitude - b.latitude).abs() < SAME_PLACE_DEGREES
        && (a.longitude - b.longitude).abs() < SAME_PLACE_DEGREES
}

/// Known cities matching `query`, followed by remote results that aren't
/// already known.
pub fn suggestions(known: &[City], query: &str, remote: &[City]) -> Vec<City> {
    let mut out: Vec<City> = filter(known, query).into_iter().cloned().collect();

    out.extend(
        remote
            .iter()
            .filter(|r| !known.iter().any(|k| is_same_place(k, r)))
            .cloned(),
    );

    out
}
