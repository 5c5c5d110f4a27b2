//! Open-Meteo forecast client.

use std::env;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Hourly series requested from the API.
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";

/// Forecast as returned by Open-Meteo, limited to the fields we keep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub generationtime_ms: f64,
    pub utc_offset_seconds: i64,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub hourly: Option<HourlySeries>,
    pub hourly_units: Option<HourlyUnits>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<f64>,
    #[serde(default)]
    pub wind_speed_10m: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyUnits {
    pub time: String,
    pub temperature_2m: String,
}

/// Client for a fixed forecast location.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    latitude: f64,
    longitude: f64,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, latitude: f64, longitude: f64) -> Self {
        Self {
            http,
            latitude,
            longitude,
        }
    }

    /// Build a client from `WEATHER_LATITUDE` / `WEATHER_LONGITUDE`, defaulting to Berlin.
    pub fn from_env() -> Result<Self> {
        let latitude = coordinate("WEATHER_LATITUDE", 52.52)?;
        let longitude = coordinate("WEATHER_LONGITUDE", 13.41)?;
        Ok(Self::new(reqwest::Client::new(), latitude, longitude))
    }

    /// Fetch the current forecast.
    pub async fn forecast(&self) -> Result<Forecast> {
        let response = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current", "temperature_2m,wind_speed_10m".to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::unavailable("Weather request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::unavailable(
                "Weather API returned an error",
                response.status(),
            ));
        }

        response
            .json::<Forecast>()
            .await
            .map_err(|e| Error::unavailable("Weather response could not be parsed", e))
    }
}

fn coordinate(name: &str, default: f64) -> Result<f64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a number: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
