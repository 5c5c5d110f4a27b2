//! Cognito-backed sign-up and sign-in.

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use tracing::info;

use crate::{Error, Result};

/// Details collected by `POST /signup`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a user and confirm the registration straight away.
    async fn sign_up(&self, user: &NewUser) -> Result<()>;

    /// Exchange credentials for an identity token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String>;
}

/// Identity provider backed by a Cognito user pool.
#[derive(Debug, Clone)]
pub struct CognitoIdentity {
    client: CognitoClient,
    user_pool_id: String,
    client_id: String,
}

impl CognitoIdentity {
    pub fn new(client: CognitoClient, user_pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client,
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
        }
    }
}

/// Prefer the provider's own message; fall back to the full error chain.
fn provider_message<E, R>(err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = err
        .as_service_error()
        .and_then(|service| service.message())
        .map(String::from)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    Error::Identity(message)
}

fn attribute(name: &str, value: &str) -> Result<AttributeType> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| Error::Internal(format!("Failed to build user attribute {}: {}", name, e)))
}

#[async_trait]
impl IdentityProvider for CognitoIdentity {
    async fn sign_up(&self, user: &NewUser) -> Result<()> {
        self.client
            .sign_up()
            .client_id(&self.client_id)
            .username(&user.email)
            .password(&user.password)
            .user_attributes(attribute("given_name", &user.first_name)?)
            .user_attributes(attribute("family_name", &user.last_name)?)
            .user_attributes(attribute("email", &user.email)?)
            .send()
            .await
            .map_err(provider_message)?;

        self.client
            .admin_confirm_sign_up()
            .user_pool_id(&self.user_pool_id)
            .username(&user.email)
            .send()
            .await
            .map_err(provider_message)?;

        info!(email = %user.email, "Registered and confirmed user");
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(provider_message)?;

        response
            .authentication_result()
            .and_then(|result| result.id_token())
            .map(String::from)
            .ok_or_else(|| Error::Identity("Authentication did not return an identity token".to_string()))
    }
}
