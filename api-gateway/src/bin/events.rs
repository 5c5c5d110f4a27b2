//! Events Lambda - Persists posted event documents.
//!
//! Endpoints:
//! - POST /events - Store `{principalId, content}` and echo the saved event

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, Utc};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use shared::http::{error_response, json_response};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Create event request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventRequest {
    principal_id: i64,
    #[serde(default)]
    content: BTreeMap<String, String>,
}

/// Stored event document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    id: String,
    principal_id: i64,
    created_at: String,
    body: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventResponse {
    status_code: u16,
    event: Event,
}

/// Application state
struct AppState {
    dynamo_client: DynamoClient,
    target_table: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let target_table = shared::config::require("TARGET_TABLE")?;
        let config = shared::config::load_aws_config(&shared::config::region()).await;

        Ok(Self {
            dynamo_client: DynamoClient::new(&config),
            target_table,
        })
    }
}

fn build_event(request: CreateEventRequest, id: Uuid, now: DateTime<Utc>) -> Event {
    Event {
        id: id.to_string(),
        principal_id: request.principal_id,
        created_at: now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        body: request.content,
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    if event.method().as_str() != "POST" {
        return error_response(
            400,
            format!("Unsupported path or method: {} {}", event.uri().path(), event.method()),
        );
    }

    let request: CreateEventRequest = match serde_json::from_slice(event.body().as_ref()) {
        Ok(request) => request,
        Err(e) => return error_response(400, format!("Invalid request body: {}", e)),
    };

    let saved = build_event(request, Uuid::new_v4(), Utc::now());
    let item: HashMap<String, AttributeValue> = serde_dynamo::to_item(&saved)?;

    if let Err(e) = state
        .dynamo_client
        .put_item()
        .table_name(&state.target_table)
        .set_item(Some(item))
        .send()
        .await
    {
        error!("Failed to store event {}: {}", saved.id, DisplayErrorContext(&e));
        return json_response(
            500,
            &serde_json::json!({
                "message": "Error saving event to the database.",
                "error": DisplayErrorContext(&e).to_string(),
            }),
        );
    }

    info!(id = %saved.id, principal_id = saved.principal_id, "Stored event");

    json_response(
        201,
        &CreateEventResponse {
            status_code: 201,
            event: saved,
        },
    )
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
