use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Attributes, Item, Key, QuizStore, StoreError, WriteOp, INDEX_PARTITION_ATTR,
    INDEX_SORT_ATTR, MAX_BATCH_SIZE,
};

/// Number of accepted batch sizes kept for inspection.
pub const RECENT_BATCHES: usize = 64;

/// In-process store backed by an ordered map.
///
/// Each call takes the lock once, so single operations are atomic but a
/// sequence of calls may interleave with other callers.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<Key, Attributes>>,
    batches: RwLock<VecDeque<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes of the last [`RECENT_BATCHES`] accepted `batch_write` calls,
    /// oldest first.
    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.batches.read().await.iter().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn get(&self, key: &Key) -> Result<Option<Item>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(key).map(|attributes| Item {
            key: key.clone(),
            attributes: attributes.clone(),
        }))
    }

    async fn query_prefix(
        &self,
        partition: &str,
        sort_prefix: &str,
    ) -> Result<Vec<Item>, StoreError> {
        let records = self.records.read().await;
        let start = Key::new(partition, sort_prefix);
        Ok(records
            .range(start..)
            .take_while(|(key, _)| key.partition == partition && key.sort.starts_with(sort_prefix))
            .map(|(key, attributes)| Item {
                key: key.clone(),
                attributes: attributes.clone(),
            })
            .collect())
    }

    async fn query_index(&self, index_partition: &str) -> Result<Vec<Item>, StoreError> {
        let records = self.records.read().await;
        let mut items: Vec<Item> = records
            .iter()
            .filter(|(_, attributes)| {
                attributes.get(INDEX_PARTITION_ATTR).map(String::as_str) == Some(index_partition)
            })
            .map(|(key, attributes)| Item {
                key: key.clone(),
                attributes: attributes.clone(),
            })
            .collect();
        items.sort_by(|a, b| a.attr(INDEX_SORT_ATTR).cmp(&b.attr(INDEX_SORT_ATTR)));
        Ok(items)
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.records.write().await.insert(item.key, item.attributes);
        Ok(())
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        if ops.len() > MAX_BATCH_SIZE {
            return Err(StoreError::BatchTooLarge(ops.len()));
        }

        let size = ops.len();
        let mut records = self.records.write().await;
        for op in ops {
            match op {
                WriteOp::Put(item) => {
                    records.insert(item.key, item.attributes);
                }
                WriteOp::Delete(key) => {
                    records.remove(&key);
                }
            }
        }
        drop(records);

        let mut batches = self.batches.write().await;
        if batches.len() == RECENT_BATCHES {
            batches.pop_front();
        }
        batches.push_back(size);
        Ok(())
    }
}
