use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{ActionResult, CreateEntryRequest, EntryListData, EntryListQuery, UpdateEntryRequest};
use crate::error::{AppError, AppResult};
use crate::models::entry::{
    CollectionFilter, Entry, EntryChanges, EntryFilter, EntryView, NewEntry, SortOrder,
};
use crate::models::mood::{mood_by_id, Mood};
use crate::services::users::require_user;
use crate::AppState;

fn resolve_mood(raw: &str) -> AppResult<&'static Mood> {
    mood_by_id(raw).ok_or_else(|| AppError::Validation("Invalid mood".into()))
}

fn image_query<'a>(requested: Option<&'a str>, mood: &'static Mood) -> &'a str {
    requested
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(mood.image_query)
}

async fn ensure_collection(state: &AppState, user_id: Uuid, collection_id: Uuid) -> AppResult<()> {
    state
        .store
        .find_collection(user_id, collection_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Collection not found".into()))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()?;

    let user = require_user(state.store.as_ref(), &auth_user).await?;
    let mood = resolve_mood(&body.mood)?;

    if let Some(collection_id) = body.collection_id {
        ensure_collection(&state, user.id, collection_id).await?;
    }

    let mood_image_url = state
        .mood_images
        .lookup(image_query(body.mood_query.as_deref(), mood))
        .await;

    let entry = state
        .store
        .insert_entry(NewEntry {
            user_id: user.id,
            collection_id: body.collection_id,
            title: body.title,
            content: body.content,
            mood: mood.id.to_string(),
            mood_score: mood.score,
            mood_image_url,
        })
        .await?;

    // Publishing an entry consumes the working draft. The entry is already
    // saved, so a cleanup failure is only logged.
    if let Err(e) = state.store.delete_draft(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to clear draft after publishing entry");
    }

    tracing::info!(user_id = %user.id, entry_id = %entry.id, mood = %entry.mood, "Journal entry created");
    Ok(Json(entry))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<EntryListQuery>,
) -> Json<ActionResult<EntryListData<EntryView>>> {
    let result = load_entries(&state, &auth_user, &query).await;
    Json(ActionResult::capture(result, "loading journal entries"))
}

async fn load_entries(
    state: &AppState,
    auth_user: &AuthUser,
    query: &EntryListQuery,
) -> AppResult<EntryListData<EntryView>> {
    let user = require_user(state.store.as_ref(), auth_user).await?;

    // An id that is not a UUID names no collection, so nothing can match
    let Some(collection) = CollectionFilter::parse(query.collection_id.as_deref()) else {
        return Ok(EntryListData { entries: Vec::new() });
    };

    let filter = EntryFilter {
        collection,
        order: SortOrder::parse(query.order.as_deref()),
    };

    let rows = state.store.list_entries(user.id, filter).await?;
    Ok(EntryListData {
        entries: rows.into_iter().map(EntryView::from).collect(),
    })
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<EntryView>> {
    let user = require_user(state.store.as_ref(), &auth_user).await?;

    let row = state
        .store
        .find_entry(user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(EntryView::from(row)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()?;

    let user = require_user(state.store.as_ref(), &auth_user).await?;

    // Verify ownership
    let existing = state
        .store
        .find_entry(user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?
        .entry;

    let mood = resolve_mood(&body.mood)?;

    if let Some(collection_id) = body.collection_id {
        ensure_collection(&state, user.id, collection_id).await?;
    }

    let mood_image_url = if existing.mood == mood.id {
        existing.mood_image_url
    } else {
        state
            .mood_images
            .lookup(image_query(body.mood_query.as_deref(), mood))
            .await
    };

    let entry = state
        .store
        .update_entry(
            user.id,
            entry_id,
            EntryChanges {
                collection_id: body.collection_id,
                title: body.title,
                content: body.content,
                mood: mood.id.to_string(),
                mood_score: mood.score,
                mood_image_url,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<Entry>> {
    let user = require_user(state.store.as_ref(), &auth_user).await?;

    let entry = state
        .store
        .delete_entry(user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;

    tracing::info!(user_id = %user.id, entry_id = %entry.id, "Journal entry deleted");
    Ok(Json(entry))
}
