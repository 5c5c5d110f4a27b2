//! SNS Logger Lambda - Logs every notification published to the topic.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// SNS Event wrapper
#[derive(Debug, Deserialize)]
struct SnsEvent {
    #[serde(rename = "Records", default)]
    records: Vec<SnsRecord>,
}

#[derive(Debug, Deserialize)]
struct SnsRecord {
    #[serde(rename = "Sns")]
    sns: SnsMessage,
}

#[derive(Debug, Deserialize)]
struct SnsMessage {
    #[serde(rename = "MessageId", default)]
    message_id: String,
    #[serde(rename = "Subject", default)]
    subject: Option<String>,
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoggerResponse {
    status_code: u16,
    body: String,
}

fn log_records(event: &SnsEvent) -> LoggerResponse {
    for record in &event.records {
        info!(
            message_id = %record.sns.message_id,
            subject = record.sns.subject.as_deref().unwrap_or_default(),
            message = %record.sns.message,
            "Received SNS message"
        );
    }

    LoggerResponse {
        status_code: 200,
        body: format!("Processed {} SNS messages", event.records.len()),
    }
}

async fn handler(event: LambdaEvent<SnsEvent>) -> Result<LoggerResponse, Error> {
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
