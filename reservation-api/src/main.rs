//! Reservation API Lambda - Dining tables, reservations and user sign-in.
//!
//! Endpoints:
//! - POST /signup - Register and confirm a user
//! - POST /signin - Exchange credentials for an identity token
//! - GET /tables - List tables
//! - POST /tables - Create a table
//! - GET /tables/{tableId} - Get table details
//! - GET /reservations - List reservations
//! - POST /reservations - Book a table for a time slot

mod handlers;
mod router;
mod slots;
mod state;
#[cfg(test)]
mod testing;
mod validation;

use std::sync::Arc;

use lambda_http::{run, service_fn, Error};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::from_env().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handlers::dispatch(&state, event).await }
    }))
    .await
}
