use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::models::user::UserProfile;
use crate::services::users::check_user;
use crate::AppState;

/// Current caller's profile, provisioned on first call. Storage failures
/// yield `null` so the shell can still render.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Json<Option<UserProfile>> {
    match check_user(state.store.as_ref(), &auth_user).await {
        Ok(user) => Json(Some(user.into())),
        Err(e) => {
            tracing::error!(error = %e, "Error checking user");
            Json(None)
        }
    }
}
