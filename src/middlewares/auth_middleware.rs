use axum::{
    body::Body, extract::State, http::Request, http::StatusCode, middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

pub struct AuthLayerState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

fn validated_claims(
    state: &AuthLayerState,
    req: &Request<Body>,
) -> Result<crate::util::jwt::Claims, StatusCode> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    state
        .jwt_utils
        .validate_access_token(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Require a valid access token; the claims are attached to the request for
/// handlers to read the caller identity from.
pub async fn bearer_auth(
    State(state): State<Arc<AuthLayerState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = validated_claims(&state, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Require a valid access token carrying the manufacturer role.
pub async fn manufacturer_auth(
    State(state): State<Arc<AuthLayerState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = validated_claims(&state, &req)?;

    if claims.role != "manufacturer" {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
