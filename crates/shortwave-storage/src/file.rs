use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use shortwave_core::{
    encode, BatchCreated, BatchItem, LinkRecord, LinkStore, Resolved, Result, StoreError,
};
use tracing::debug;

#[derive(Debug)]
struct Inner {
    /// Held open for the lifetime of the store; released on `close`.
    file: Option<File>,
    links: Vec<LinkRecord>,
}

/// File-backed link store.
///
/// The whole backing file is read once on open and decoded as a JSON
/// array of records; every operation afterwards works purely against the
/// in-memory set. The file is written again only on [`LinkStore::close`],
/// as one truncate-and-rewrite. A crash between opens therefore loses
/// all writes since the last successful close; that durability trade-off
/// is accepted, not a bug.
///
/// Like [`MemoryStore`](crate::MemoryStore), `put` performs no
/// uniqueness check.
#[derive(Debug)]
pub struct FileStore {
    inner: Mutex<Inner>,
}

impl FileStore {
    /// Opens (creating if absent) the backing file and loads its records.
    ///
    /// Ids are not part of the serialized shape; they are recomputed from
    /// each record's original URL, which is lossless because the encoder
    /// is deterministic.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let mut buf = String::new();
        file.read_to_string(&mut buf)?;

        let mut links: Vec<LinkRecord> = if buf.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&buf)
                .map_err(|e| StoreError::Serialization(e.to_string()))?
        };
        for link in &mut links {
            link.id = encode(&link.original_url);
        }

        debug!(records = links.len(), "loaded link file");

        Ok(Self {
            inner: Mutex::new(Inner {
                file: Some(file),
                links,
            }),
        })
    }
}

#[async_trait]
impl LinkStore for FileStore {
    async fn put(&self, record: LinkRecord) -> Result<()> {
        self.inner.lock().links.push(record);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Resolved> {
        let inner = self.inner.lock();
        match inner.links.iter().find(|link| link.id == id) {
            Some(link) if link.deleted => Ok(Resolved::Deleted),
            Some(link) => Ok(Resolved::Active(link.original_url.clone())),
            None => Err(StoreError::NotFound(id.to_owned())),
        }
    }

    async fn get_all(&self, owner: Option<&str>) -> Result<Vec<LinkRecord>> {
        let inner = self.inner.lock();
        Ok(inner
            .links
            .iter()
            .filter(|link| !link.deleted)
            .filter(|link| owner.is_none() || link.owner.as_deref() == owner)
            .cloned()
            .collect())
    }

    async fn batch_insert(
        &self,
        items: Vec<BatchItem>,
        base_url: &str,
    ) -> Result<Vec<BatchCreated>> {
        let mut inner = self.inner.lock();
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let record = LinkRecord::new(item.original_url, base_url, item.owner);
            created.push(BatchCreated {
                correlation_id: item.correlation_id,
                short_url: record.short_url.clone(),
            });
            inner.links.push(record);
        }
        Ok(created)
    }

    async fn batch_soft_delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut inner = self.inner.lock();
        for link in inner.links.iter_mut() {
            if ids.iter().any(|id| *id == link.id) {
                link.deleted = true;
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Serializes the full working set back to the file as one write,
    /// then releases the handle. Calling close twice is a no-op.
    ///
    /// A failed close keeps the handle so a retry can still persist the
    /// working set, and the stale tail is only cut after the new
    /// content has been written.
    async fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.file.is_none() {
            return Ok(());
        }

        let bytes = serde_json::to_vec(&inner.links)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let Some(file) = inner.file.as_mut() else {
            return Ok(());
        };
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)?;
        file.set_len(bytes.len() as u64)?;
        file.flush()?;
        inner.file = None;

        debug!(records = inner.links.len(), "flushed link file");
        Ok(())
    }
}
