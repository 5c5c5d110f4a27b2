//! Weather Lambda - Returns the hourly Open-Meteo forecast.

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;
use serde_json::json;
use shared::weather::{Forecast, HourlySeries};
use shared::WeatherClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct WeatherResponse {
    message: &'static str,
    hourly: HourlySeries,
}

/// Application state
struct AppState {
    weather: WeatherClient,
}

/// Keep only the hourly series, failing when the API left it out.
fn hourly_view(forecast: Forecast) -> Result<WeatherResponse, String> {
    let hourly = forecast
        .hourly
        .ok_or_else(|| "Hourly data is missing from the weather API response.".to_string())?;

    Ok(WeatherResponse {
        message: "Weather data fetched successfully.",
        hourly,
    })
}

async fn handler(state: Arc<AppState>, _event: Request) -> Result<Response<Body>, Error> {
    let outcome = state
        .weather
        .forecast()
        .await
        .map_err(|e| e.to_string())
        .and_then(hourly_view);

    match outcome {
        Ok(response) => {
            info!(points = response.hourly.time.len(), "Fetched forecast");
            shared::http::json_response(200, &response)
        }
        Err(e) => {
            error!("Weather fetch failed: {}", e);
            shared::http::json_response(
                500,
                &json!({
                    "message": "Failed to fetch weather data.",
                    "error": e,
                }),
            )
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState {
        weather: WeatherClient::from_env()?,
    });

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast(hourly: Option<HourlySeries>) -> Forecast {
        Forecast {
            latitude: 52.52,
            longitude: 13.41,
            elevation: 38.0,
            generationtime_ms: 0.02,
            utc_offset_seconds: 0,
            timezone: "GMT".into(),
            timezone_abbreviation: "GMT".into(),
            hourly,
            hourly_units: None,
        }
    }

    #[test]
    fn test_hourly_view_keeps_all_series() {
        let view = hourly_view(forecast(Some(HourlySeries {
            time: vec!["2024-01-01T00:00".into()],
            temperature_2m: vec![1.5],
            relative_humidity_2m: vec![80.0],
            wind_speed_10m: vec![12.0],
        })))
        .unwrap();

        let body = serde_json::to_value(&view).unwrap();
        assert_eq!(body["message"], "Weather data fetched successfully.");
        assert_eq!(body["hourly"]["temperature_2m"], json!([1.5]));
        assert_eq!(body["hourly"]["wind_speed_10m"], json!([12.0]));
    }

    #[test]
    fn test_missing_hourly_is_an_error() {
        assert!(hourly_view(forecast(None)).is_err());
    }
}
