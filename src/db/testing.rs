use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{JournalStore, MemoryJournalStore, StoreResult};
use crate::models::collection::{Collection, NewCollection};
use crate::models::draft::{Draft, DraftInput};
use crate::models::entry::{Entry, EntryChanges, EntryFilter, EntryWithCollection, NewEntry};
use crate::models::user::{NewUser, User};

/// Store whose every query fails as if the pool were exhausted.
/// `user` is returned from the identity lookup when set, so failures can be
/// injected after user resolution.
#[derive(Default)]
pub struct FailingStore {
    pub user: Option<User>,
}

fn unavailable<T>() -> StoreResult<T> {
    Err(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl JournalStore for FailingStore {
    async fn ping(&self) -> StoreResult<()> {
        unavailable()
    }

    async fn find_user_by_external_id(&self, _external_id: &str) -> StoreResult<Option<User>> {
        match &self.user {
            Some(user) => Ok(Some(user.clone())),
            None => unavailable(),
        }
    }

    async fn insert_user(&self, _user: NewUser) -> StoreResult<User> {
        unavailable()
    }

    async fn entries_since(&self, _: Uuid, _: DateTime<Utc>) -> StoreResult<Vec<Entry>> {
        unavailable()
    }

    async fn list_entries(&self, _: Uuid, _: EntryFilter) -> StoreResult<Vec<EntryWithCollection>> {
        unavailable()
    }

    async fn find_entry(&self, _: Uuid, _: Uuid) -> StoreResult<Option<EntryWithCollection>> {
        unavailable()
    }

    async fn insert_entry(&self, _: NewEntry) -> StoreResult<Entry> {
        unavailable()
    }

    async fn update_entry(&self, _: Uuid, _: Uuid, _: EntryChanges) -> StoreResult<Option<Entry>> {
        unavailable()
    }

    async fn delete_entry(&self, _: Uuid, _: Uuid) -> StoreResult<Option<Entry>> {
        unavailable()
    }

    async fn list_collections(&self, _: Uuid) -> StoreResult<Vec<Collection>> {
        unavailable()
    }

    async fn find_collection(&self, _: Uuid, _: Uuid) -> StoreResult<Option<Collection>> {
        unavailable()
    }

    async fn insert_collection(&self, _: NewCollection) -> StoreResult<Collection> {
        unavailable()
    }

    async fn delete_collection(&self, _: Uuid, _: Uuid) -> StoreResult<bool> {
        unavailable()
    }

    async fn find_draft(&self, _: Uuid) -> StoreResult<Option<Draft>> {
        unavailable()
    }

    async fn upsert_draft(&self, _: Uuid, _: DraftInput) -> StoreResult<Draft> {
        unavailable()
    }

    async fn delete_draft(&self, _: Uuid) -> StoreResult<()> {
        unavailable()
    }
}

/// In-memory store whose draft removal always fails. Everything else
/// behaves like [`MemoryJournalStore`].
#[derive(Default)]
pub struct StuckDraftStore {
    pub inner: MemoryJournalStore,
}

#[async_trait]
impl JournalStore for StuckDraftStore {
    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_external_id(external_id).await
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.inner.insert_user(user).await
    }

    async fn entries_since(&self, user_id: Uuid, since: DateTime<Utc>) -> StoreResult<Vec<Entry>> {
        self.inner.entries_since(user_id, since).await
    }

    async fn list_entries(
        &self,
        user_id: Uuid,
        filter: EntryFilter,
    ) -> StoreResult<Vec<EntryWithCollection>> {
        self.inner.list_entries(user_id, filter).await
    }

    async fn find_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> StoreResult<Option<EntryWithCollection>> {
        self.inner.find_entry(user_id, entry_id).await
    }

    async fn insert_entry(&self, entry: NewEntry) -> StoreResult<Entry> {
        self.inner.insert_entry(entry).await
    }

    async fn update_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        changes: EntryChanges,
    ) -> StoreResult<Option<Entry>> {
        self.inner.update_entry(user_id, entry_id, changes).await
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> StoreResult<Option<Entry>> {
        self.inner.delete_entry(user_id, entry_id).await
    }

    async fn list_collections(&self, user_id: Uuid) -> StoreResult<Vec<Collection>> {
        self.inner.list_collections(user_id).await
    }

    async fn find_collection(
        &self,
        user_id: Uuid,
        collection_id: Uuid,
    ) -> StoreResult<Option<Collection>> {
        self.inner.find_collection(user_id, collection_id).await
    }

    async fn insert_collection(&self, collection: NewCollection) -> StoreResult<Collection> {
        self.inner.insert_collection(collection).await
    }

    async fn delete_collection(&self, user_id: Uuid, collection_id: Uuid) -> StoreResult<bool> {
        self.inner.delete_collection(user_id, collection_id).await
    }

    async fn find_draft(&self, user_id: Uuid) -> StoreResult<Option<Draft>> {
        self.inner.find_draft(user_id).await
    }

    async fn upsert_draft(&self, user_id: Uuid, draft: DraftInput) -> StoreResult<Draft> {
        self.inner.upsert_draft(user_id, draft).await
    }

    async fn delete_draft(&self, _: Uuid) -> StoreResult<()> {
        unavailable()
    }
}
