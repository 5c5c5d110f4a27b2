//! Hello Lambda - Answers `GET /hello` and rejects everything else.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;
use shared::http::json_response;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Greeting {
    status_code: u16,
    message: String,
}

async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!(method, path, "Received request");

    let (status_code, message) = match (method, path) {
        ("GET", "/hello") => (200, "Hello from Lambda".to_string()),
        _ => (
            400,
            format!(
                "Bad request syntax or unsupported method. Request path: {}. HTTP method: {}",
                path, method
            ),
        ),
    };

    json_response(
        status_code,
        &Greeting {
            status_code,
            message,
        },
    )
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(handler)).await
}
