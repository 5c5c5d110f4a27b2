//! Sign-up and sign-in endpoints.

use lambda_http::Body;
use shared::models::{SignInResponse, SignUpResponse};
use shared::{NewUser, Result};
use tracing::{info, warn};

use crate::state::AppState;
use crate::validation::{parse_fields, require_fields, str_field};

pub async fn sign_up(state: &AppState, body: &Body) -> Result<SignUpResponse> {
    let fields = parse_fields(body)?;
    require_fields(&["firstName", "lastName", "email", "password"], &fields)?;

    let user = NewUser {
        first_name: str_field(&fields, "firstName")?,
        last_name: str_field(&fields, "lastName")?,
        email: str_field(&fields, "email")?,
        password: str_field(&fields, "password")?,
    };

    if let Err(e) = state.identity.sign_up(&user).await {
        warn!(email = %user.email, error = %e, "Sign-up rejected");
        return Err(e);
    }

    Ok(SignUpResponse {
        message: format!("User {} signed up successfully", user.email),
    })
}

pub async fn sign_in(state: &AppState, body: &Body) -> Result<SignInResponse> {
    let fields = parse_fields(body)?;
    require_fields(&["email", "password"], &fields)?;

    let email = str_field(&fields, "email")?;
    let password = str_field(&fields, "password")?;

    match state.identity.sign_in(&email, &password).await {
        Ok(access_token) => {
            info!(email = %email, "User signed in");
            Ok(SignInResponse { access_token })
        }
        Err(e) => {
            warn!(email = %email, error = %e, "Sign-in rejected");
            Err(e)
        }
    }
}
