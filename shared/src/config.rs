//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

/// Region used when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Reservation API configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table holding dining tables
    pub tables_table: String,
    /// DynamoDB table holding reservations
    pub reservations_table: String,
    /// Cognito user pool id, used for admin confirmation
    pub user_pool_id: String,
    /// Cognito app client id, used for sign-up and sign-in
    pub client_id: String,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            tables_table: require("TABLES_TABLE")?,
            reservations_table: require("RESERVATIONS_TABLE")?,
            user_pool_id: require("COGNITO_USER_POOL_ID")?,
            client_id: require("COGNITO_CLIENT_ID")?,
            aws_region: region(),
        })
    }
}

/// Read a required environment variable.
pub fn require(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} not set", name))),
    }
}

/// AWS region from the environment, falling back to the deployment default.
pub fn region() -> String {
    env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string())
}

/// Load the AWS SDK configuration pinned to the configured region.
pub async fn load_aws_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
