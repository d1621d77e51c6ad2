//! Storage collaborator for quiz records.
//!
//! Records are flat attribute maps addressed by a `(partition, sort)` key.
//! Backends implement [`QuizStore`]; the handle is injected into the
//! application state rather than held globally.

use std::collections::BTreeMap;

use async_trait::async_trait;

pub mod memory;
#[cfg(feature = "dynamodb")]
pub mod dynamo;

pub use memory::MemoryStore;
#[cfg(feature = "dynamodb")]
pub use dynamo::DynamoStore;

/// Maximum number of write operations accepted by a single `batch_write` call.
pub const MAX_BATCH_SIZE: usize = 25;

/// Listing index definition: records carrying `GSI1PK` are visible through
/// [`QuizStore::query_index`], ordered by `GSI1SK`.
pub const INDEX_NAME: &str = "GSI1";
pub const INDEX_PARTITION_ATTR: &str = "GSI1PK";
pub const INDEX_SORT_ATTR: &str = "GSI1SK";

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub partition: String,
    pub sort: String,
}

impl Key {
    pub fn new(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Key {
            partition: partition.into(),
            sort: sort.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub key: Key,
    pub attributes: Attributes,
}

impl Item {
    pub fn new(key: Key) -> Self {
        Item {
            key,
            attributes: Attributes::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put(Item),
    Delete(Key),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("batch of {0} write operations exceeds the limit of {}", MAX_BATCH_SIZE)]
    BatchTooLarge(usize),

    #[error("{0} write operations were left unprocessed")]
    Unprocessed(usize),

    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Point lookup by full key.
    async fn get(&self, key: &Key) -> Result<Option<Item>, StoreError>;

    /// Every record in `partition` whose sort key starts with `sort_prefix`,
    /// ordered by sort key.
    async fn query_prefix(&self, partition: &str, sort_prefix: &str)
        -> Result<Vec<Item>, StoreError>;

    /// Every record on the listing index under `index_partition`, ordered by
    /// the index sort attribute.
    async fn query_index(&self, index_partition: &str) -> Result<Vec<Item>, StoreError>;

    async fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Applies up to [`MAX_BATCH_SIZE`] mixed operations. Larger batches are
    /// rejected before anything is written.
    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;
}
