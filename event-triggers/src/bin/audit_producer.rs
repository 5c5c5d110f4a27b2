//! Audit Producer Lambda - Records configuration changes from a DynamoDB stream.
//!
//! This Lambda is triggered by the stream of the configuration table and:
//! 1. Emits one entry with the whole new item for every INSERT
//! 2. Emits one entry per changed attribute for every MODIFY
//! 3. Writes the entries to the audit table

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, SecondsFormat, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// DynamoDB stream event wrapper
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "Records")]
    records: Vec<StreamRecord>,
}

#[derive(Debug, Deserialize)]
struct StreamRecord {
    #[serde(rename = "eventName")]
    event_name: String,
    dynamodb: StreamImages,
}

#[derive(Debug, Deserialize)]
struct StreamImages {
    #[serde(rename = "NewImage", default)]
    new_image: Option<serde_dynamo::Item>,
    #[serde(rename = "OldImage", default)]
    old_image: Option<serde_dynamo::Item>,
}

/// One row of the audit table
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuditEntry {
    id: String,
    item_key: Value,
    modification_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_value: Option<Value>,
    new_value: Value,
}

#[derive(Debug, Serialize)]
struct AuditResponse {
    records_processed: usize,
    entries_written: usize,
}

struct AppState {
    dynamo_client: DynamoClient,
    audit_table: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let audit_table = shared::config::require("TARGET_TABLE")?;
        let config = shared::config::load_aws_config(&shared::config::region()).await;

        Ok(Self {
            dynamo_client: DynamoClient::new(&config),
            audit_table,
        })
    }
}

fn image(item: Option<&serde_dynamo::Item>) -> Result<Map<String, Value>, Error> {
    match item {
        Some(item) => Ok(serde_dynamo::from_item(item.clone())?),
        None => Ok(Map::new()),
    }
}

/// Audit entries describing one stream record.
fn audit_entries(record: &StreamRecord, now: DateTime<Utc>) -> Result<Vec<AuditEntry>, Error> {
    let modification_time = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    match record.event_name.as_str() {
        "INSERT" => {
            let new_item = image(record.dynamodb.new_image.as_ref())?;
            Ok(vec![AuditEntry {
                id: Uuid::new_v4().to_string(),
                item_key: new_item.get("key").cloned().unwrap_or(Value::Null),
                modification_time,
                updated_attribute: None,
                old_value: None,
                new_value: Value::Object(new_item),
            }])
        }
        "MODIFY" => {
            let new_item = image(record.dynamodb.new_image.as_ref())?;
            let old_item = image(record.dynamodb.old_image.as_ref())?;
            let item_key = new_item.get("key").cloned().unwrap_or(Value::Null);

            Ok(new_item
                .iter()
                .filter(|(attribute, value)| old_item.get(*attribute) != Some(*value))
                .map(|(attribute, value)| AuditEntry {
                    id: Uuid::new_v4().to_string(),
                    item_key: item_key.clone(),
                    modification_time: modification_time.clone(),
                    updated_attribute: Some(attribute.clone()),
                    old_value: Some(old_item.get(attribute).cloned().unwrap_or(Value::Null)),
                    new_value: value.clone(),
                })
                .collect())
        }
        _ => Ok(Vec::new()),
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<StreamEvent>) -> Result<AuditResponse, Error> {
    let records = event.payload.records;
    let now = Utc::now();

    let mut entries = Vec::new();
    for record in &records {
        entries.extend(audit_entries(record, now)?);
    }

    for entry in &entries {
        let item: HashMap<String, AttributeValue> = serde_dynamo::to_item(entry)?;
        if let Err(e) = state
            .dynamo_client
            .put_item()
            .table_name(&state.audit_table)
            .set_item(Some(item))
            .send()
            .await
        {
            error!(id = %entry.id, error = %DisplayErrorContext(&e), "Failed to write to audit table");
            return Err(e.into());
        }
    }

    let response = AuditResponse {
        records_processed: records.len(),
        entries_written: entries.len(),
    };

    info!(
        records = response.records_processed,
        entries = response.entries_written,
        "Audit entries created"
    );

    Ok(response)
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
