use crate::error::Result;
use crate::link::{BatchCreated, BatchItem, LinkRecord};
use async_trait::async_trait;

/// Outcome of resolving a short id that exists in the store.
///
/// A soft-deleted record must never resolve to its URL; callers need to
/// distinguish "gone" from "never existed", so deletion is a sentinel
/// here while an unknown id is a [`StoreError::NotFound`] error.
///
/// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The record is live; carries the original URL.
    Active(String),
    /// The record exists but was soft-deleted.
    Deleted,
}

/// The capability contract satisfied by every storage backend.
///
/// Backends differ in durability and uniqueness guarantees:
/// memory and file append without a uniqueness check, the database
/// backend rejects duplicate URLs with `DuplicateUrl`. Memory and file
/// make no cross-operation concurrency guarantee; callers coordinate
/// externally.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Inserts one record.
    async fn put(&self, record: LinkRecord) -> Result<()>;

    /// Resolves a short id to its original URL or the deleted sentinel.
    async fn get(&self, id: &str) -> Result<Resolved>;

    /// Returns all non-deleted records, filtered by owner when given.
    /// An empty result is not an error.
    async fn get_all(&self, owner: Option<&str>) -> Result<Vec<LinkRecord>>;

    /// Inserts many records atomically; on failure no partial insert is
    /// observable. Results are in input order.
    async fn batch_insert(
        &self,
        items: Vec<BatchItem>,
        base_url: &str,
    ) -> Result<Vec<BatchCreated>>;

    /// Marks many records deleted. An empty id list is an `EmptyBatch`
    /// error, rejected before any backend interaction.
    async fn batch_soft_delete(&self, ids: &[String]) -> Result<()>;

    /// Health probe; a real round-trip for the database backend,
    /// trivial elsewhere.
    async fn ping(&self) -> Result<()>;

    /// Releases resources. The file backend serializes its working set
    /// to disk here.
    async fn close(&self) -> Result<()>;
}
