use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

/// Authenticated caller, injected into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(token, &state.config)?.claims;

    let auth_user = AuthUser {
        external_id: claims.sub,
        email: claims.email.filter(|e| !e.is_empty()),
        name: claims.name,
        image_url: claims.picture,
    };

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}
