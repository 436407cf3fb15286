use async_trait::async_trait;
use parking_lot::Mutex;
use shortwave_core::{
    BatchCreated, BatchItem, LinkRecord, LinkStore, Resolved, Result, StoreError,
};

/// In-memory link store: an ordered sequence with no persistence.
///
/// `put` appends unconditionally; there is no uniqueness check. This is
/// deliberately weaker than the database backend and callers relying on
/// `DuplicateUrl` must not use this store. The mutex only keeps single
/// operations memory safe; no atomicity across calls is promised, and
/// concurrent writers must coordinate externally.
#[derive(Debug, Default)]
pub struct MemoryStore {
    links: Mutex<Vec<LinkRecord>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn put(&self, record: LinkRecord) -> Result<()> {
        self.links.lock().push(record);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Resolved> {
        let links = self.links.lock();
        match links.iter().find(|link| link.id == id) {
            Some(link) if link.deleted => Ok(Resolved::Deleted),
            Some(link) => Ok(Resolved::Active(link.original_url.clone())),
            None => Err(StoreError::NotFound(id.to_owned())),
        }
    }

    async fn get_all(&self, owner: Option<&str>) -> Result<Vec<LinkRecord>> {
        let links = self.links.lock();
        Ok(links
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
        let mut links = self.links.lock();
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let record = LinkRecord::new(item.original_url, base_url, item.owner);
            created.push(BatchCreated {
                correlation_id: item.correlation_id,
                short_url: record.short_url.clone(),
            });
            links.push(record);
        }
        Ok(created)
    }

    async fn batch_soft_delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut links = self.links.lock();
        for link in links.iter_mut() {
            if ids.iter().any(|id| *id == link.id) {
                link.deleted = true;
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.links.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> LinkRecord {
        LinkRecord::new(url, "http://localhost:8080", None)
    }

    #[tokio::test]
    async fn put_and_get_round_trip() {
        let store = MemoryStore::new();
        let link = record("https://google.com");
        let id = link.id.clone();

        store.put(link).await.unwrap();

        let resolved = store.get(&id).await.unwrap();
        assert_eq!(resolved, Resolved::Active("https://google.com".to_owned()));
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = MemoryStore::new();

        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn put_does_not_enforce_uniqueness() {
        let store = MemoryStore::new();

        store.put(record("https://example.com")).await.unwrap();
        store.put(record("https://example.com")).await.unwrap();

        let all = store.get_all(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn get_all_filters_by_owner() {
        let store = MemoryStore::new();
        store
            .put(LinkRecord::new(
                "https://a.example",
                "http://localhost:8080",
                Some("alice".into()),
            ))
            .await
            .unwrap();
        store
            .put(LinkRecord::new(
                "https://b.example",
                "http://localhost:8080",
                Some("bob".into()),
            ))
            .await
            .unwrap();

        let alices = store.get_all(Some("alice")).await.unwrap();
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].original_url, "https://a.example");

        let everyone = store.get_all(None).await.unwrap();
        assert_eq!(everyone.len(), 2);
    }

    #[tokio::test]
    async fn batch_insert_returns_results_in_input_order() {
        let store = MemoryStore::new();
        let items = vec![
            BatchItem {
                correlation_id: "1".into(),
                original_url: "https://one.example".into(),
                owner: None,
            },
            BatchItem {
                correlation_id: "2".into(),
                original_url: "https://two.example".into(),
                owner: None,
            },
        ];

        let created = store
            .batch_insert(items, "http://localhost:8080")
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].correlation_id, "1");
        assert_eq!(created[1].correlation_id, "2");
        assert!(created[0].short_url.starts_with("http://localhost:8080/"));
    }

    #[tokio::test]
    async fn soft_delete_hides_record_from_lookup_and_listing() {
        let store = MemoryStore::new();
        let link = record("https://example.com");
        let id = link.id.clone();
        store.put(link).await.unwrap();

        store.batch_soft_delete(&[id.clone()]).await.unwrap();

        assert_eq!(store.get(&id).await.unwrap(), Resolved::Deleted);
        assert!(store.get_all(None).await.unwrap().is_empty());

        // Idempotent: deleting again keeps the record deleted.
        store.batch_soft_delete(&[id.clone()]).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Resolved::Deleted);
    }

    #[tokio::test]
    async fn empty_batch_delete_is_an_error() {
        let store = MemoryStore::new();

        let err = store.batch_soft_delete(&[]).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyBatch));
    }

    #[tokio::test]
    async fn close_clears_the_sequence() {
        let store = MemoryStore::new();
        store.put(record("https://example.com")).await.unwrap();

        store.close().await.unwrap();

        assert!(store.get_all(None).await.unwrap().is_empty());
    }
}
