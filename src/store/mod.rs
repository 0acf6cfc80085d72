//! Key-value persistence boundary.
//!
//! Every stateful component talks to storage only through [`KvStore`]:
//! `get`, `set`, `delete` and `scan_prefix` over opaque JSON values. The store
//! offers no transactions, so callers serialize read-modify-write sequences
//! through [`KeyLocks`].

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

mod locks;
mod memory;
mod postgres;

pub mod keys;

pub use locks::KeyLocks;
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to decode record {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;
    async fn delete(&self, key: &str) -> StoreResult<()>;
    /// Values of every key starting with `prefix`, in key order.
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<Value>>;
}

/// Typed helpers layered over any [`KvStore`].
#[async_trait]
pub trait StoreExt: KvStore {
    async fn get_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn put_json<T>(&self, key: &str, record: &T) -> StoreResult<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(record).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, value).await
    }

    async fn scan_json<T>(&self, prefix: &str) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.scan_prefix(prefix)
            .await?
            .into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|source| StoreError::Decode {
                    key: prefix.to_string(),
                    source,
                })
            })
            .collect()
    }
}

impl<S: KvStore + ?Sized> StoreExt for S {}
