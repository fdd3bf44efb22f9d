use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{CreateCollectionRequest, DeleteResponse};
use crate::error::{AppError, AppResult};
use crate::models::collection::{Collection, NewCollection};
use crate::services::users::require_user;
use crate::AppState;

pub async fn list_collections(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Collection>>> {
    let user = require_user(state.store.as_ref(), &auth_user).await?;
    let collections = state.store.list_collections(user.id).await?;
    Ok(Json(collections))
}

pub async fn create_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCollectionRequest>,
) -> AppResult<Json<Collection>> {
    body.validate()?;

    let user = require_user(state.store.as_ref(), &auth_user).await?;

    let collection = state
        .store
        .insert_collection(NewCollection {
            user_id: user.id,
            name: body.name.trim().to_string(),
            description: body.description.filter(|d| !d.trim().is_empty()),
        })
        .await?;

    Ok(Json(collection))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(collection_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let user = require_user(state.store.as_ref(), &auth_user).await?;

    if !state.store.delete_collection(user.id, collection_id).await? {
        return Err(AppError::NotFound("Collection not found".into()));
    }

    tracing::info!(user_id = %user.id, collection_id = %collection_id, "Collection deleted");
    Ok(Json(DeleteResponse {
        deleted: true,
        id: collection_id,
    }))
}
