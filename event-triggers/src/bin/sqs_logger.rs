//! SQS Logger Lambda - Logs every message delivered from the queue.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// SQS Event wrapper
#[derive(Debug, Deserialize)]
struct SqsEvent {
    #[serde(rename = "Records", default)]
    records: Vec<SqsRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SqsRecord {
    #[serde(default)]
    message_id: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoggerResponse {
    status_code: u16,
    body: String,
}

fn log_records(event: &SqsEvent) -> LoggerResponse {
    for record in &event.records {
        info!(message_id = %record.message_id, body = %record.body, "Received SQS message");
    }

    LoggerResponse {
        status_code: 200,
        body: format!("Processed {} SQS messages", event.records.len()),
    }
}

async fn handler(event: LambdaEvent<SqsEvent>) -> Result<LoggerResponse, Error> {
    Ok(log_records(&event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(handler)).await
}
