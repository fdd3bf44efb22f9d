use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{JournalStore, StoreResult};
use crate::models::collection::{Collection, NewCollection};
use crate::models::draft::{Draft, DraftInput};
use crate::models::entry::{
    CollectionFilter, Entry, EntryChanges, EntryFilter, EntryWithCollection, NewEntry, SortOrder,
};
use crate::models::user::{NewUser, User};

/// Process-local store used when no database is configured, and by tests.
/// Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryJournalStore {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    entries: Vec<Entry>,
    collections: Vec<Collection>,
    drafts: Vec<Draft>,
}

impl Tables {
    fn with_collection_name(&self, entry: &Entry) -> EntryWithCollection {
        let collection_name = entry.collection_id.and_then(|cid| {
            self.collections
                .iter()
                .find(|c| c.id == cid)
                .map(|c| c.name.clone())
        });
        EntryWithCollection {
            entry: entry.clone(),
            collection_name,
        }
    }

    fn push_entry(&mut self, entry: NewEntry, created_at: DateTime<Utc>) -> Entry {
        let row = Entry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            collection_id: entry.collection_id,
            title: entry.title,
            content: entry.content,
            mood: entry.mood,
            mood_score: entry.mood_score,
            mood_image_url: entry.mood_image_url,
            created_at,
            updated_at: created_at,
        };
        self.entries.push(row.clone());
        row
    }
}

impl MemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryJournalStore {
    /// Inserts an entry with an explicit creation time.
    pub async fn insert_entry_at(&self, entry: NewEntry, created_at: DateTime<Utc>) -> Entry {
        self.inner.lock().await.push_entry(entry, created_at)
    }
}

#[async_trait]
impl JournalStore for MemoryJournalStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.inner.lock().await;
        if let Some(existing) = tables
            .users
            .iter()
            .find(|u| u.external_id == user.external_id)
        {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            external_id: user.external_id,
            email: user.email,
            name: user.name,
            image_url: user.image_url,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn entries_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Entry>> {
        let tables = self.inner.lock().await;
        let mut entries: Vec<Entry> = tables
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && e.created_at >= since)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn list_entries(
        &self,
        user_id: Uuid,
        filter: EntryFilter,
    ) -> StoreResult<Vec<EntryWithCollection>> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<EntryWithCollection> = tables
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| match filter.collection {
                CollectionFilter::Any => true,
                CollectionFilter::Unorganized => e.collection_id.is_none(),
                CollectionFilter::Only(id) => e.collection_id == Some(id),
            })
            .map(|e| tables.with_collection_name(e))
            .collect();

        rows.sort_by_key(|r| r.entry.created_at);
        if filter.order == SortOrder::Desc {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn find_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> StoreResult<Option<EntryWithCollection>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .entries
            .iter()
            .find(|e| e.id == entry_id && e.user_id == user_id)
            .map(|e| tables.with_collection_name(e)))
    }

    async fn insert_entry(&self, entry: NewEntry) -> StoreResult<Entry> {
        Ok(self.inner.lock().await.push_entry(entry, Utc::now()))
    }

    async fn update_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        changes: EntryChanges,
    ) -> StoreResult<Option<Entry>> {
        let mut tables = self.inner.lock().await;
        let Some(entry) = tables
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id && e.user_id == user_id)
        else {
            return Ok(None);
        };

        entry.collection_id = changes.collection_id;
        entry.title = changes.title;
        entry.content = changes.content;
        entry.mood = changes.mood;
        entry.mood_score = changes.mood_score;
        entry.mood_image_url = changes.mood_image_url;
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> StoreResult<Option<Entry>> {
        let mut tables = self.inner.lock().await;
        let position = tables
            .entries
            .iter()
            .position(|e| e.id == entry_id && e.user_id == user_id);
        Ok(position.map(|i| tables.entries.remove(i)))
    }

    async fn list_collections(&self, user_id: Uuid) -> StoreResult<Vec<Collection>> {
        let tables = self.inner.lock().await;
        let mut collections: Vec<Collection> = tables
            .collections
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        collections.sort_by_key(|c| c.created_at);
        collections.reverse();
        Ok(collections)
    }

    async fn find_collection(
        &self,
        user_id: Uuid,
        collection_id: Uuid,
    ) -> StoreResult<Option<Collection>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .collections
            .iter()
            .find(|c| c.id == collection_id && c.user_id == user_id)
            .cloned())
    }

    async fn insert_collection(&self, collection: NewCollection) -> StoreResult<Collection> {
        let now = Utc::now();
        let row = Collection {
            id: Uuid::new_v4(),
            user_id: collection.user_id,
            name: collection.name,
            description: collection.description,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.collections.push(row.clone());
        Ok(row)
    }

    async fn delete_collection(&self, user_id: Uuid, collection_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.lock().await;
        let before = tables.collections.len();
        tables
            .collections
            .retain(|c| !(c.id == collection_id && c.user_id == user_id));
        if tables.collections.len() == before {
            return Ok(false);
        }

        tables
            .entries
            .retain(|e| e.collection_id != Some(collection_id));
        Ok(true)
    }

    async fn find_draft(&self, user_id: Uuid) -> StoreResult<Option<Draft>> {
        let tables = self.inner.lock().await;
        Ok(tables.drafts.iter().find(|d| d.user_id == user_id).cloned())
    }

    async fn upsert_draft(&self, user_id: Uuid, draft: DraftInput) -> StoreResult<Draft> {
        let mut tables = self.inner.lock().await;
        let now = Utc::now();

        if let Some(existing) = tables.drafts.iter_mut().find(|d| d.user_id == user_id) {
            existing.title = draft.title;
            existing.content = draft.content;
            existing.mood = draft.mood;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = Draft {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title,
            content: draft.content,
            mood: draft.mood,
            created_at: now,
            updated_at: now,
        };
        tables.drafts.push(row.clone());
        Ok(row)
    }

    async fn delete_draft(&self, user_id: Uuid) -> StoreResult<()> {
        self.inner
            .lock()
            .await
            .drafts
            .retain(|d| d.user_id != user_id);
        Ok(())
    }
}
