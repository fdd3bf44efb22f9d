use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::mood::{mood_by_id, Mood};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub mood: String,
    pub mood_score: i32,
    pub mood_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry row joined with the name of its collection, if any.
#[derive(Debug, Clone, FromRow)]
pub struct EntryWithCollection {
    #[sqlx(flatten)]
    pub entry: Entry,
    pub collection_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub mood: String,
    pub mood_score: i32,
    pub mood_image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EntryChanges {
    pub collection_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub mood: String,
    pub mood_score: i32,
    pub mood_image_url: Option<String>,
}

/// Which entries to list with respect to collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionFilter {
    #[default]
    Any,
    /// Entries not filed into any collection.
    Unorganized,
    Only(Uuid),
}

impl CollectionFilter {
    /// `"unorganized"` selects loose entries and a UUID selects one
    /// collection. A missing or blank value lists everything. Returns `None`
    /// for any other value, since no collection can carry that id.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") => Some(Self::Any),
            Some("unorganized") => Some(Self::Unorganized),
            Some(s) => s.parse().ok().map(Self::Only),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFilter {
    pub collection: CollectionFilter,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionRef {
    pub id: Uuid,
    pub name: String,
}

/// Entry as returned by the listing and detail endpoints.
#[derive(Debug, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: Entry,
    pub collection: Option<CollectionRef>,
    pub mood_data: Option<&'static Mood>,
}

impl From<EntryWithCollection> for EntryView {
    fn from(row: EntryWithCollection) -> Self {
        let collection = match (row.entry.collection_id, row.collection_name) {
            (Some(id), Some(name)) => Some(CollectionRef { id, name }),
            _ => None,
        };
        let mood_data = mood_by_id(&row.entry.mood);
        Self {
            entry: row.entry,
            collection,
            mood_data,
        }
    }
}
