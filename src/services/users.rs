use crate::auth::middleware::AuthUser;
use crate::db::{JournalStore, StoreResult};
use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, User};

/// Resolves the caller to their account row.
pub async fn require_user(store: &dyn JournalStore, auth_user: &AuthUser) -> AppResult<User> {
    store
        .find_user_by_external_id(&auth_user.external_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Returns the caller's account, creating it from the token's profile claims
/// on first sight.
pub async fn check_user(store: &dyn JournalStore, auth_user: &AuthUser) -> StoreResult<User> {
    if let Some(user) = store.find_user_by_external_id(&auth_user.external_id).await? {
        return Ok(user);
    }

    let user = store
        .insert_user(NewUser {
            external_id: auth_user.external_id.clone(),
            email: auth_user.email.clone(),
            name: display_name(auth_user),
            image_url: auth_user.image_url.clone(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "Provisioned new user");
    Ok(user)
}

fn display_name(auth_user: &AuthUser) -> String {
    match auth_user.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => auth_user
            .email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .unwrap_or_default()
            .to_string(),
    }
}
