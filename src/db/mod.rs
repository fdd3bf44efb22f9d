//! Typed data access for journal records.
//!
//! Every query the service issues is a method on [`JournalStore`], taking
//! the owning user's id as an explicit parameter. Handlers never build SQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::collection::{Collection, NewCollection};
use crate::models::draft::{Draft, DraftInput};
use crate::models::entry::{Entry, EntryChanges, EntryFilter, EntryWithCollection, NewEntry};
use crate::models::user::{NewUser, User};

mod memory;
mod postgres;

#[cfg(test)]
pub mod testing;

pub use memory::MemoryJournalStore;
pub use postgres::PgJournalStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // Users
    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    // Entries

    /// Entries created at or after `since`, oldest first.
    async fn entries_since(&self, user_id: Uuid, since: DateTime<Utc>)
        -> StoreResult<Vec<Entry>>;
    async fn list_entries(
        &self,
        user_id: Uuid,
        filter: EntryFilter,
    ) -> StoreResult<Vec<EntryWithCollection>>;
    async fn find_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> StoreResult<Option<EntryWithCollection>>;
    async fn insert_entry(&self, entry: NewEntry) -> StoreResult<Entry>;
    async fn update_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        changes: EntryChanges,
    ) -> StoreResult<Option<Entry>>;
    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> StoreResult<Option<Entry>>;

    // Collections

    /// Newest first.
    async fn list_collections(&self, user_id: Uuid) -> StoreResult<Vec<Collection>>;
    async fn find_collection(
        &self,
        user_id: Uuid,
        collection_id: Uuid,
    ) -> StoreResult<Option<Collection>>;
    async fn insert_collection(&self, collection: NewCollection) -> StoreResult<Collection>;
    /// Removes the collection together with the entries filed in it.
    async fn delete_collection(&self, user_id: Uuid, collection_id: Uuid) -> StoreResult<bool>;

    // Drafts
    async fn find_draft(&self, user_id: Uuid) -> StoreResult<Option<Draft>>;
    async fn upsert_draft(&self, user_id: Uuid, draft: DraftInput) -> StoreResult<Draft>;
    async fn delete_draft(&self, user_id: Uuid) -> StoreResult<()>;
}
