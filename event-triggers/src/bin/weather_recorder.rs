//! Weather Recorder Lambda - Stores the current Open-Meteo forecast in DynamoDB.

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use shared::{Forecast, WeatherClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct ForecastRecord {
    id: String,
    forecast: Forecast,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecorderResponse {
    status_code: u16,
    body: String,
}

struct AppState {
    dynamo_client: DynamoClient,
    weather: WeatherClient,
    target_table: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let target_table = shared::config::require("TARGET_TABLE")?;
        let config = shared::config::load_aws_config(&shared::config::region()).await;

        Ok(Self {
            dynamo_client: DynamoClient::new(&config),
            weather: WeatherClient::from_env()?,
            target_table,
        })
    }
}

async fn record_forecast(state: &AppState) -> Result<ForecastRecord, String> {
    let forecast = state.weather.forecast().await.map_err(|e| e.to_string())?;
    let record = ForecastRecord {
        id: Uuid::new_v4().to_string(),
        forecast,
    };

    let item: HashMap<String, AttributeValue> =
        serde_dynamo::to_item(&record).map_err(|e| e.to_string())?;

    state
        .dynamo_client
        .put_item()
        .table_name(&state.target_table)
        .set_item(Some(item))
        .send()
        .await
        .map_err(|e| DisplayErrorContext(&e).to_string())?;

    Ok(record)
}

async fn handler(state: Arc<AppState>, _event: LambdaEvent<Value>) -> Result<RecorderResponse, Error> {
    match record_forecast(&state).await {
        Ok(record) => {
            info!(id = %record.id, table = %state.target_table, "Recorded forecast");
            Ok(RecorderResponse {
                status_code: 200,
                body: serde_json::to_string(&record)?,
            })
        }
        Err(e) => {
            error!("Failed to record forecast: {}", e);
            Ok(RecorderResponse {
                status_code: 500,
                body: serde_json::json!({
                    "message": "Failed to fetch or store data",
                    "error": e,
                })
                .to_string(),
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
