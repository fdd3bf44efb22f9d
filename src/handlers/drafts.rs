use axum::{extract::State, Extension, Json};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{ActionResult, SaveDraftRequest};
use crate::error::AppResult;
use crate::models::draft::{Draft, DraftInput};
use crate::services::users::require_user;
use crate::AppState;

pub async fn get_draft(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Json<ActionResult<Option<Draft>>> {
    let result = load_draft(&state, &auth_user).await;
    Json(ActionResult::capture(result, "loading draft"))
}

async fn load_draft(state: &AppState, auth_user: &AuthUser) -> AppResult<Option<Draft>> {
    let user = require_user(state.store.as_ref(), auth_user).await?;
    Ok(state.store.find_draft(user.id).await?)
}

pub async fn save_draft(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SaveDraftRequest>,
) -> Json<ActionResult<Draft>> {
    let result = store_draft(&state, &auth_user, body).await;
    Json(ActionResult::capture(result, "saving draft"))
}

async fn store_draft(
    state: &AppState,
    auth_user: &AuthUser,
    body: SaveDraftRequest,
) -> AppResult<Draft> {
    body.validate()?;

    let user = require_user(state.store.as_ref(), auth_user).await?;
    let draft = state
        .store
        .upsert_draft(
            user.id,
            DraftInput {
                title: body.title,
                content: body.content,
                mood: body.mood,
            },
        )
        .await?;

    Ok(draft)
}
