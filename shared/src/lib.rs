//! Shared library for the restaurant Lambda functions.
//!
//! This crate provides common utilities, types, and clients used across all Lambda functions.

pub mod config;
pub mod dynamo;
pub mod error;
pub mod http;
pub mod identity;
pub mod models;
pub mod store;
pub mod weather;

pub use config::Config;
pub use dynamo::DynamoStore;
pub use error::{Error, Result};
pub use identity::{CognitoIdentity, IdentityProvider, NewUser};
pub use models::{Reservation, Table, TableSnapshot};
pub use store::ReservationStore;
pub use weather::{Forecast, WeatherClient};
