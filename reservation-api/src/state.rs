//! Process-wide dependencies built once per cold start.

use std::sync::Arc;

use shared::{CognitoIdentity, Config, DynamoStore, IdentityProvider, ReservationStore, Result};
use tracing::info;

/// Application state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReservationStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReservationStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Build the DynamoDB and Cognito clients from the environment.
    pub async fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        let aws = shared::config::load_aws_config(&config.aws_region).await;

        let store = DynamoStore::new(
            aws_sdk_dynamodb::Client::new(&aws),
            &config.tables_table,
            &config.reservations_table,
        );
        let identity = CognitoIdentity::new(
            aws_sdk_cognitoidentityprovider::Client::new(&aws),
            &config.user_pool_id,
            &config.client_id,
        );

        info!(
            tables_table = %config.tables_table,
            reservations_table = %config.reservations_table,
            region = %config.aws_region,
            "Initialized reservation API"
        );

        Ok(Self::new(Arc::new(store), Arc::new(identity)))
    }
}
