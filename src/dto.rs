//! Request/response DTOs.
//!
//! Conventions:
//! - `*Request` / `*Query` → deserialized from client JSON body or query params
//! - Validation is expressed via `validator` derive macros
//! - [`ActionResult`] is the tagged envelope for operations that report data
//!   failures in-band instead of through an HTTP error status

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Tagged results
// ============================================================================

/// `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
/// Callers must check `success` before reading `data`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success(T),
    Failure(String),
}

impl<T> ActionResult<T> {
    /// Converts a fallible outcome, logging the failure message under `context`.
    pub fn capture<E: std::fmt::Display>(result: Result<T, E>, context: &str) -> Self {
        match result {
            Ok(data) => ActionResult::Success(data),
            Err(e) => {
                let message = e.to_string();
                tracing::error!(error = %message, "Error {}", context);
                ActionResult::Failure(message)
            }
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ActionResult", 2)?;
        match self {
            ActionResult::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            ActionResult::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

// ============================================================================
// Entries
// ============================================================================

/// POST /api/entries
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Mood id from the catalog, case-insensitive
    pub mood: String,

    /// Illustration search phrase. Default: the mood's own query
    pub mood_query: Option<String>,

    pub collection_id: Option<Uuid>,
}

/// PUT /api/entries/:id (replaces all editable fields)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    pub mood: String,
    pub mood_query: Option<String>,
    pub collection_id: Option<Uuid>,
}

/// GET /api/entries query params
#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    /// "unorganized" or a collection id. Default: all entries
    pub collection_id: Option<String>,
    /// "asc" or "desc". Default: "desc"
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryListData<T> {
    pub entries: Vec<T>,
}

// ============================================================================
// Collections
// ============================================================================

/// POST /api/collections
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be under 1000 characters"))]
    pub description: Option<String>,
}

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

// ============================================================================
// Drafts
// ============================================================================

/// PUT /api/drafts
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SaveDraftRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
}

// ============================================================================
// Analytics
// ============================================================================

/// GET /api/analytics query params
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// "7d", "15d" or "30d". Anything else means "30d"
    pub period: Option<String>,
}
