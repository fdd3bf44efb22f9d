use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use super::{JournalStore, StoreResult};
use crate::models::collection::{Collection, NewCollection};
use crate::models::draft::{Draft, DraftInput};
use crate::models::entry::{
    CollectionFilter, Entry, EntryChanges, EntryFilter, EntryWithCollection, NewEntry, SortOrder,
};
use crate::models::user::{NewUser, User};

#[derive(Debug, Clone)]
pub struct PgJournalStore {
    db: PgPool,
}

impl PgJournalStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Opens a pool against `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

        Ok(Self::new(db))
    }
}

#[async_trait]
impl JournalStore for PgJournalStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await?;
        Ok(())
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1 LIMIT 1")
            .bind(external_id)
            .fetch_optional(&self.db)
            .await
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        // Concurrent first requests for the same identity both land here.
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, external_id, email, name, image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (external_id) DO UPDATE SET updated_at = users.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image_url)
        .fetch_one(&self.db)
        .await
    }

    async fn entries_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Entry>> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT * FROM entries
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.db)
        .await
    }

    async fn list_entries(
        &self,
        user_id: Uuid,
        filter: EntryFilter,
    ) -> StoreResult<Vec<EntryWithCollection>> {
        let (unorganized, collection_id) = match filter.collection {
            CollectionFilter::Any => (false, None),
            CollectionFilter::Unorganized => (true, None),
            CollectionFilter::Only(id) => (false, Some(id)),
        };

        sqlx::query_as::<_, EntryWithCollection>(
            r#"
            SELECT e.*, c.name AS collection_name
            FROM entries e
            LEFT JOIN collections c ON e.collection_id = c.id
            WHERE e.user_id = $1
              AND ($2 = false OR e.collection_id IS NULL)
              AND ($3::uuid IS NULL OR e.collection_id = $3)
            ORDER BY
              CASE WHEN $4 THEN e.created_at END ASC,
              CASE WHEN NOT $4 THEN e.created_at END DESC
            "#,
        )
        .bind(user_id)
        .bind(unorganized)
        .bind(collection_id)
        .bind(filter.order == SortOrder::Asc)
        .fetch_all(&self.db)
        .await
    }

    async fn find_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> StoreResult<Option<EntryWithCollection>> {
        sqlx::query_as::<_, EntryWithCollection>(
            r#"
            SELECT e.*, c.name AS collection_name
            FROM entries e
            LEFT JOIN collections c ON e.collection_id = c.id
            WHERE e.id = $1 AND e.user_id = $2
            "#,
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn insert_entry(&self, entry: NewEntry) -> StoreResult<Entry> {
        sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (id, user_id, collection_id, title, content, mood, mood_score, mood_image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.collection_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.mood)
        .bind(entry.mood_score)
        .bind(&entry.mood_image_url)
        .fetch_one(&self.db)
        .await
    }

    async fn update_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        changes: EntryChanges,
    ) -> StoreResult<Option<Entry>> {
        sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries SET
                collection_id = $3,
                title = $4,
                content = $5,
                mood = $6,
                mood_score = $7,
                mood_image_url = $8,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(changes.collection_id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.mood)
        .bind(changes.mood_score)
        .bind(&changes.mood_image_url)
        .fetch_optional(&self.db)
        .await
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> StoreResult<Option<Entry>> {
        sqlx::query_as::<_, Entry>(
            "DELETE FROM entries WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_collections(&self, user_id: Uuid) -> StoreResult<Vec<Collection>> {
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    async fn find_collection(
        &self,
        user_id: Uuid,
        collection_id: Uuid,
    ) -> StoreResult<Option<Collection>> {
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE id = $1 AND user_id = $2",
        )
        .bind(collection_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn insert_collection(&self, collection: NewCollection) -> StoreResult<Collection> {
        sqlx::query_as::<_, Collection>(
            r#"
            INSERT INTO collections (id, user_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(collection.user_id)
        .bind(&collection.name)
        .bind(&collection.description)
        .fetch_one(&self.db)
        .await
    }

    async fn delete_collection(&self, user_id: Uuid, collection_id: Uuid) -> StoreResult<bool> {
        // entries.collection_id cascades
        let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
            .bind(collection_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_draft(&self, user_id: Uuid) -> StoreResult<Option<Draft>> {
        sqlx::query_as::<_, Draft>("SELECT * FROM drafts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
    }

    async fn upsert_draft(&self, user_id: Uuid, draft: DraftInput) -> StoreResult<Draft> {
        sqlx::query_as::<_, Draft>(
            r#"
            INSERT INTO drafts (id, user_id, title, content, mood)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                title = $3,
                content = $4,
                mood = $5,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.mood)
        .fetch_one(&self.db)
        .await
    }

    async fn delete_draft(&self, user_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM drafts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
