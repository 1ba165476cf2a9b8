//! Open-Meteo forecast client and the Senegalese city registry
//!
//! Fetching and shaping are split: `build_forecast` turns a raw Open-Meteo
//! payload into the summary the agents consume, so the aggregation logic is
//! testable without the network.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// A city the weather service knows coordinates for.
#[derive(Debug, Clone, Serialize)]
pub struct City {
    pub key: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub region: &'static str,
}

pub const CITIES: &[City] = &[
    City { key: "dakar", lat: 14.6928, lon: -17.4467, region: "Dakar" },
    City { key: "thies", lat: 14.7886, lon: -16.9260, region: "Thies" },
    City { key: "kaolack", lat: 14.1520, lon: -16.0726, region: "Kaolack" },
    City { key: "saint-louis", lat: 16.0326, lon: -16.4818, region: "Saint-Louis" },
    City { key: "ziguinchor", lat: 12.5681, lon: -16.2719, region: "Ziguinchor" },
    City { key: "touba", lat: 14.8500, lon: -15.8833, region: "Diourbel" },
    City { key: "tambacounda", lat: 13.7709, lon: -13.6673, region: "Tambacounda" },
    City { key: "kolda", lat: 12.8835, lon: -14.9500, region: "Kolda" },
    City { key: "fatick", lat: 14.3390, lon: -16.4041, region: "Fatick" },
    City { key: "louga", lat: 15.6144, lon: -16.2281, region: "Louga" },
    City { key: "matam", lat: 15.6559, lon: -13.2554, region: "Matam" },
    City { key: "kedougou", lat: 12.5605, lon: -12.1747, region: "Kedougou" },
    City { key: "sedhiou", lat: 12.7081, lon: -15.5569, region: "Sedhiou" },
    City { key: "kaffrine", lat: 14.1058, lon: -15.5505, region: "Kaffrine" },
    City { key: "diourbel", lat: 14.6553, lon: -16.2314, region: "Diourbel" },
    City { key: "richard-toll", lat: 16.4625, lon: -15.7000, region: "Saint-Louis" },
];

/// Find a city by name, case-insensitive.
pub fn find_city(name: &str) -> Option<&'static City> {
    let key = name.trim().to_lowercase();
    CITIES.iter().find(|c| c.key == key)
}

/// Comma-joined list of known city keys, for error messages.
pub fn available_cities() -> String {
    CITIES
        .iter()
        .map(|c| c.key)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Ville inconnue: {city}. Villes disponibles: {available}")]
    UnknownCity { city: String, available: String },
    #[error("Weather lookup failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Current conditions reported by Open-Meteo.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Current {
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub weather_code: Option<u32>,
}

/// One day of the forecast.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastDay {
    pub date: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub precipitation_mm: f64,
    pub wind_max_kmh: f64,
    pub weather_code: u32,
}

/// Week-level aggregates the agents reason about.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_precipitation_mm: f64,
    pub max_temperature: f64,
    /// Days with more than 1 mm of rain.
    pub rain_days: usize,
}

/// Full forecast for one city.
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub city: String,
    pub region: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub current: Current,
    pub forecast: Vec<ForecastDay>,
    pub summary: Summary,
}

// Raw Open-Meteo payload, only the fields we request.
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: Option<RawCurrent>,
    daily: Option<RawDaily>,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    windspeed_10m_max: Vec<Option<f64>>,
    weathercode: Vec<Option<u32>>,
}

/// Open-Meteo client. Free tier, no API key.
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: Client,
    base_url: String,
}

impl WeatherService {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        }
    }

    /// Point at a different endpoint (tests, mirrors).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// 7-day forecast for a known Senegalese city.
    pub async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let Some(found) = find_city(city) else {
            return Err(WeatherError::UnknownCity {
                city: city.to_string(),
                available: available_cities(),
            });
        };

        debug!("Fetching forecast for {} ({})", found.key, found.region);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", found.lat.to_string()),
                ("longitude", found.lon.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,precipitation_sum,windspeed_10m_max,weathercode"
                        .to_string(),
                ),
                ("current_weather", "true".to_string()),
                ("timezone", "Africa/Dakar".to_string()),
                ("forecast_days", "7".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let raw: OpenMeteoResponse = response.json().await?;
        Ok(build_forecast(found, raw))
    }
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape a raw payload into the forecast the agents consume.
fn build_forecast(city: &'static City, raw: OpenMeteoResponse) -> Forecast {
    let current = raw
        .current_weather
        .map(|c| Current {
            temperature: c.temperature,
            windspeed: c.windspeed,
            weather_code: c.weathercode,
        })
        .unwrap_or_default();

    let mut days = Vec::new();
    if let Some(daily) = raw.daily {
        for (i, date) in daily.time.iter().enumerate() {
            days.push(ForecastDay {
                date: date.clone(),
                temp_max: get_at(&daily.temperature_2m_max, i),
                temp_min: get_at(&daily.temperature_2m_min, i),
                precipitation_mm: get_at(&daily.precipitation_sum, i),
                wind_max_kmh: get_at(&daily.windspeed_10m_max, i),
                weather_code: daily.weathercode.get(i).copied().flatten().unwrap_or(0),
            });
        }
    }

    let total: f64 = days.iter().map(|d| d.precipitation_mm).sum();
    let summary = Summary {
        total_precipitation_mm: (total * 10.0).round() / 10.0,
        max_temperature: days
            .iter()
            .map(|d| d.temp_max)
            .reduce(f64::max)
            .unwrap_or(0.0),
        rain_days: days.iter().filter(|d| d.precipitation_mm > 1.0).count(),
    };

    Forecast {
        city: city.key.to_string(),
        region: city.region,
        lat: city.lat,
        lon: city.lon,
        current,
        forecast: days,
        summary,
    }
}

fn get_at(values: &[Option<f64>], i: usize) -> f64 {
    values.get(i).copied().flatten().unwrap_or(0.0)
}

/// WMO weather code rendered in French and Wolof.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherCodeText {
    pub fr: String,
    pub wo: String,
}

/// Convert a WMO weather code into farmer-readable descriptions.
pub fn format_weather_code(code: u32) -> WeatherCodeText {
    let (fr, wo) = match code {
        0 => ("Ciel dégagé", "Asamaan bi leer na"),
        1 => ("Peu nuageux", "Niir yu ndaw yi"),
        2 => ("Partiellement nuageux", "Niir yi am na tuuti"),
        3 => ("Couvert", "Niir yu bari"),
        45 => ("Brouillard", "Ngelaw bu set"),
        51 => ("Bruine légère", "Taw bu tuuti"),
        53 => ("Bruine modérée", "Taw bu wanee"),
        55 => ("Bruine forte", "Taw bu bari"),
        61 => ("Pluie légère", "Taw bu tuuti"),
        63 => ("Pluie modérée", "Taw bu baax"),
        65 => ("Pluie forte", "Taw bu bari lool"),
        80 => ("Averses légères", "Taw bu gaaw tuuti"),
        81 => ("Averses modérées", "Taw bu gaaw"),
        82 => ("Averses violentes", "Taw bu doole"),
        95 => ("Orage", "Taw ak lidiir"),
        other => {
            let text = format!("Code météo {}", other);
            return WeatherCodeText {
                fr: text.clone(),
                wo: text,
            };
        }
    };

    WeatherCodeText {
        fr: fr.to_string(),
        wo: wo.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_fixture() -> OpenMeteoResponse {
        OpenMeteoResponse {
            current_weather: Some(RawCurrent {
                temperature: Some(31.5),
                windspeed: Some(14.0),
                weathercode: Some(2),
            }),
            daily: Some(RawDaily {
                time: vec![
                    "2026-08-20".to_string(),
                    "2026-08-21".to_string(),
                    "2026-08-22".to_string(),
                ],
                temperature_2m_max: vec![Some(33.0), Some(35.2), Some(30.1)],
                temperature_2m_min: vec![Some(24.0), Some(25.1), Some(23.6)],
                precipitation_sum: vec![Some(0.4), Some(12.3), None],
                windspeed_10m_max: vec![Some(20.0), Some(26.0), Some(18.0)],
                weathercode: vec![Some(2), Some(63), Some(1)],
            }),
        }
    }

    #[test]
    fn test_find_city_is_case_insensitive() {
        assert!(find_city("Kaolack").is_some());
        assert!(find_city(" SAINT-LOUIS ").is_some());
        assert!(find_city("paris").is_none());
    }

    #[test]
    fn test_unknown_city_error_lists_available() {
        let err = WeatherError::UnknownCity {
            city: "paris".to_string(),
            available: available_cities(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Ville inconnue: paris"));
        assert!(msg.contains("dakar"));
        assert!(msg.contains("richard-toll"));
    }

    #[test]
    fn test_build_forecast_summary() {
        let city = find_city("kaolack").unwrap();
        let forecast = build_forecast(city, raw_fixture());

        assert_eq!(forecast.city, "kaolack");
        assert_eq!(forecast.region, "Kaolack");
        assert_eq!(forecast.forecast.len(), 3);
        // Missing precipitation reads as 0, not a hole in the series.
        assert_eq!(forecast.forecast[2].precipitation_mm, 0.0);
        assert_eq!(forecast.summary.total_precipitation_mm, 12.7);
        assert_eq!(forecast.summary.max_temperature, 35.2);
        assert_eq!(forecast.summary.rain_days, 1);
    }

    #[test]
    fn test_build_forecast_handles_empty_payload() {
        let city = find_city("dakar").unwrap();
        let forecast = build_forecast(
            city,
            OpenMeteoResponse {
                current_weather: None,
                daily: None,
            },
        );
        assert!(forecast.forecast.is_empty());
        assert_eq!(forecast.summary.rain_days, 0);
        assert!(forecast.current.temperature.is_none());
    }

    #[test]
    fn test_format_weather_code_known_and_fallback() {
        let clear = format_weather_code(0);
        assert_eq!(clear.fr, "Ciel dégagé");
        assert_eq!(clear.wo, "Asamaan bi leer na");

        let storm = format_weather_code(95);
        assert_eq!(storm.fr, "Orage");

        let unknown = format_weather_code(42);
        assert_eq!(unknown.fr, "Code météo 42");
        assert_eq!(unknown.wo, "Code météo 42");
    }
}
