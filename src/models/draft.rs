use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Work-in-progress entry. Each user has at most one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Draft {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct DraftInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
}
