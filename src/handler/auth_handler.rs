use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::config::AuthUsersConfig;
use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::password::PasswordUtils;

pub struct AuthState {
    pub users: AuthUsersConfig,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

/// Resolve the supplied credentials against the configured buyer and
/// manufacturer identities. Returns `(username, role)`.
fn authenticate_user(users: &AuthUsersConfig, username: &str, password: &str) -> Option<(String, String)> {
    if let Some(buyer) = &users.buyer_username {
        if username == buyer
            && PasswordUtils::verify_configured(
                password,
                users.buyer_password_hash.as_deref(),
                users.buyer_password.as_deref(),
            )
        {
            return Some((username.to_string(), "buyer".to_string()));
        }
    }

    if let Some(manufacturer) = &users.manufacturer_username {
        if username == manufacturer
            && PasswordUtils::verify_configured(
                password,
                users.manufacturer_password_hash.as_deref(),
                users.manufacturer_password.as_deref(),
            )
        {
            return Some((username.to_string(), "manufacturer".to_string()));
        }
    }

    None
}

pub async fn login_handler(
    State(state): State<Arc<AuthState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }

    info!("Login attempt for '{}'", payload.username);

    let (username, role) = match authenticate_user(&state.users, &payload.username, &payload.password)
    {
        Some(identity) => identity,
        None => {
            warn!("Failed login attempt for '{}'", payload.username);
            return Err(HandlerError {
                error: HandlerErrorKind::Unauthorized,
                message: "Invalid username or password".to_string(),
                details: None,
            });
        }
    };

    let token_pair = state
        .jwt_utils
        .generate_token_pair(&username, &role)
        .map_err(|e| {
            error!("Failed to issue tokens: {e}");
            HandlerError {
                error: HandlerErrorKind::Internal,
                message: "Failed to issue tokens".to_string(),
                details: None,
            }
        })?;

    info!("User '{}' logged in as {}", username, role);

    Ok(Json(LoginResponse {
        access_token: token_pair.access_token,
        refresh_token: token_pair.refresh_token,
        token_type: token_pair.token_type,
        expires_in: token_pair.expires_in,
        username,
        role,
    }))
}
