//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::Serialize;
use tracing::error;

use crate::Error;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?;
    Ok(response)
}

/// Create an error response with the given status code and message.
pub fn error_response(status: u16, message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        &ErrorBody {
            message: message.into(),
            error: None,
        },
    )
}

/// Turn the outcome of an operation into a response.
///
/// Successes become 200 with the serialized payload, ordinary errors become a
/// structured error body with their status code. Fatal errors are returned to
/// the runtime so the invocation fails instead of answering.
pub fn respond<T: Serialize>(outcome: crate::Result<T>) -> Result<Response<Body>, lambda_http::Error> {
    match outcome {
        Ok(payload) => json_response(200, &payload),
        Err(e) if e.is_fatal() => {
            error!(error = %e, "Aborting invocation");
            Err(e.into())
        }
        Err(e) => {
            let status = e.status_code();
            if status >= 500 {
                error!(status, error = %e, "Request failed");
            }
            json_response(
                status,
                &ErrorBody {
                    message: e.message(),
                    error: e.cause().map(String::from),
                },
            )
        }
    }
}

/// Parse a JSON body into a value, treating an empty body as `{}`.
pub fn body_json(body: &Body) -> Result<serde_json::Value, Error> {
    let bytes: &[u8] = body.as_ref();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_slice(bytes)?)
}
