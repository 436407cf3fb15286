use std::str::FromStr;

use async_trait::async_trait;
use shortwave_core::{
    encode, short_url, BatchCreated, BatchItem, LinkRecord, LinkStore, Resolved, Result,
    StoreError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::debug;

use crate::batch;

/// Value of the `is_deleted` column for a soft-deleted row. Empty means
/// the row is live.
pub(crate) const DELETED_FLAG: &str = "deleted";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS links (
    hash_url        TEXT NOT NULL,
    original_url    TEXT NOT NULL UNIQUE,
    short_url       TEXT NOT NULL,
    correlation_id  TEXT,
    owner_token     TEXT,
    is_deleted      TEXT NOT NULL DEFAULT ''
)
"#;

const SCHEMA_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_links_hash_url ON links (hash_url)";

/// SQLite implementation of the link store.
///
/// The only backend that enforces URL uniqueness: a unique-constraint
/// violation on insert surfaces as `DuplicateUrl` carrying the offending
/// URL, distinct from other insert failures. Rows are soft-deleted by
/// flagging `is_deleted`, never removed.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store from an existing connection pool. The schema is
    /// assumed to exist; use [`SqliteStore::connect`] otherwise.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool for `dsn` (e.g. `sqlite://links.db` or
    /// `sqlite::memory:`) and creates the schema idempotently.
    ///
    /// The pool is pinned to a single connection: SQLite allows one
    /// writer at a time anyway, and an in-memory DSN gives every pooled
    /// connection a distinct database.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(dsn)
            .map_err(map_sqlx_error)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query(SCHEMA_INDEX)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("links schema ready");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
        _ => StoreError::Query(message),
    }
}

pub(crate) fn map_tx_error(err: sqlx::Error) -> StoreError {
    StoreError::Transaction(err.to_string())
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn put(&self, record: LinkRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (hash_url, original_url, short_url, correlation_id, owner_token, is_deleted)
            VALUES (?, ?, ?, NULL, ?, '')
            "#,
        )
        .bind(&record.id)
        .bind(&record.original_url)
        .bind(&record.short_url)
        .bind(&record.owner)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::DuplicateUrl(record.original_url))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get(&self, id: &str) -> Result<Resolved> {
        let row = sqlx::query(
            r#"
            SELECT original_url, is_deleted
            FROM links
            WHERE hash_url = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Err(StoreError::NotFound(id.to_owned()));
        };

        let is_deleted: String = row.try_get("is_deleted").map_err(map_sqlx_error)?;
        if is_deleted == DELETED_FLAG {
            return Ok(Resolved::Deleted);
        }

        let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
        Ok(Resolved::Active(original_url))
    }

    async fn get_all(&self, owner: Option<&str>) -> Result<Vec<LinkRecord>> {
        let query = match owner {
            Some(owner) => sqlx::query(
                r#"
                SELECT hash_url, original_url, short_url, owner_token
                FROM links
                WHERE is_deleted = '' AND owner_token = ?
                "#,
            )
            .bind(owner),
            None => sqlx::query(
                r#"
                SELECT hash_url, original_url, short_url, owner_token
                FROM links
                WHERE is_deleted = ''
                "#,
            ),
        };

        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(LinkRecord {
                    id: row.try_get("hash_url").map_err(map_sqlx_error)?,
                    original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
                    short_url: row.try_get("short_url").map_err(map_sqlx_error)?,
                    owner: row.try_get("owner_token").map_err(map_sqlx_error)?,
                    deleted: false,
                })
            })
            .collect()
    }

    async fn batch_insert(
        &self,
        items: Vec<BatchItem>,
        base_url: &str,
    ) -> Result<Vec<BatchCreated>> {
        let mut tx = self.pool.begin().await.map_err(map_tx_error)?;
        let mut created = Vec::with_capacity(items.len());

        for BatchItem {
            correlation_id,
            original_url,
            owner,
        } in items
        {
            let id = encode(&original_url);
            let target = short_url(base_url, &id);

            let result = sqlx::query(
                r#"
                INSERT INTO links (hash_url, original_url, short_url, correlation_id, owner_token, is_deleted)
                VALUES (?, ?, ?, ?, ?, '')
                "#,
            )
            .bind(&id)
            .bind(&original_url)
            .bind(&target)
            .bind(&correlation_id)
            .bind(&owner)
            .execute(&mut *tx)
            .await;

            if let Err(err) = result {
                tx.rollback().await.map_err(map_tx_error)?;
                return Err(if is_unique_violation(&err) {
                    StoreError::DuplicateUrl(original_url)
                } else {
                    map_sqlx_error(err)
                });
            }

            created.push(BatchCreated {
                correlation_id,
                short_url: target,
            });
        }

        tx.commit().await.map_err(map_tx_error)?;
        Ok(created)
    }

    async fn batch_soft_delete(&self, ids: &[String]) -> Result<()> {
        batch::soft_delete(&self.pool, ids).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
