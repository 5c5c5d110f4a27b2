//! UUID Generator Lambda - Uploads a batch of fresh UUIDs to S3 on a schedule.

use std::sync::Arc;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const BATCH_SIZE: usize = 10;

#[derive(Debug, Serialize)]
struct UuidBatch {
    ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratorResponse {
    status_code: u16,
    body: String,
}

struct AppState {
    s3_client: S3Client,
    bucket: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let bucket = shared::config::require("TARGET_BUCKET")?;
        let config = shared::config::load_aws_config(&shared::config::region()).await;

        Ok(Self {
            s3_client: S3Client::new(&config),
            bucket,
        })
    }
}

fn uuid_batch(size: usize) -> UuidBatch {
    UuidBatch {
        ids: (0..size).map(|_| Uuid::new_v4().to_string()).collect(),
    }
}

/// Objects are named after the upload time, e.g. `2024-01-01T12:00:00.000Z`.
fn object_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

async fn handler(state: Arc<AppState>, _event: LambdaEvent<Value>) -> Result<GeneratorResponse, Error> {
    let batch = uuid_batch(BATCH_SIZE);
    let key = object_key(Utc::now());
    let content = serde_json::to_vec(&batch)?;

    let result = state
        .s3_client
        .put_object()
        .bucket(&state.bucket)
        .key(&key)
        .content_type("application/json")
        .body(ByteStream::from(content))
        .send()
        .await;

    match result {
        Ok(_) => {
            info!(bucket = %state.bucket, key = %key, count = batch.ids.len(), "Uploaded UUID batch");
            Ok(GeneratorResponse {
                status_code: 200,
                body: "UUIDs generated and uploaded as JSON successfully!".to_string(),
            })
        }
        Err(e) => {
            error!(bucket = %state.bucket, key = %key, error = %DisplayErrorContext(&e), "Failed to upload UUID batch");
            Ok(GeneratorResponse {
                status_code: 500,
                body: "Failed to generate or upload UUIDs.".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_batch_holds_distinct_ids() {
        let batch = uuid_batch(BATCH_SIZE);
        assert_eq!(batch.ids.len(), 10);
        let unique: HashSet<_> = batch.ids.iter().collect();
        assert_eq!(unique.len(), 10);
        assert!(batch.ids.iter().all(|id| Uuid::parse_str(id).is_ok()));

        let body = serde_json::to_value(&batch).unwrap();
        assert_eq!(body["ids"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_object_key_is_millisecond_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 1).unwrap();
        assert_eq!(object_key(now), "2024-06-30T23:59:01.000Z");
    }
}
