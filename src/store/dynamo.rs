use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;

use super::{
    Attributes, Item, Key, QuizStore, StoreError, WriteOp, INDEX_NAME, INDEX_PARTITION_ATTR,
    MAX_BATCH_SIZE,
};

const PARTITION_ATTR: &str = "PK";
const SORT_ATTR: &str = "SK";

type DynamoItem = HashMap<String, AttributeValue>;

/// DynamoDB table with a `PK`/`SK` primary key and a `GSI1` listing index.
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        DynamoStore {
            client,
            table: table.into(),
        }
    }

    /// Builds a client from the ambient AWS configuration (environment,
    /// profile or Lambda execution role).
    pub async fn from_env(table: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config), table)
    }
}

fn backend<E: std::error::Error + 'static>(err: E) -> StoreError {
    StoreError::Backend(DisplayErrorContext(err).to_string())
}

fn key_to_dynamo(key: &Key) -> DynamoItem {
    HashMap::from([
        (PARTITION_ATTR.to_string(), AttributeValue::S(key.partition.clone())),
        (SORT_ATTR.to_string(), AttributeValue::S(key.sort.clone())),
    ])
}

fn item_to_dynamo(item: &Item) -> DynamoItem {
    let mut out = key_to_dynamo(&item.key);
    for (name, value) in &item.attributes {
        out.insert(name.clone(), AttributeValue::S(value.clone()));
    }
    out
}

fn item_from_dynamo(mut raw: DynamoItem) -> Result<Item, StoreError> {
    let mut take_key = |name: &str| match raw.remove(name) {
        Some(AttributeValue::S(s)) => Ok(s),
        _ => Err(StoreError::Backend(format!("record without string `{name}` key"))),
    };
    let key = Key::new(take_key(PARTITION_ATTR)?, take_key(SORT_ATTR)?);

    // Only string attributes are written by this crate; anything else is ignored.
    let attributes: Attributes = raw
        .into_iter()
        .filter_map(|(name, value)| match value {
            AttributeValue::S(s) => Some((name, s)),
            _ => None,
        })
        .collect();

    Ok(Item { key, attributes })
}

#[async_trait]
impl QuizStore for DynamoStore {
    async fn get(&self, key: &Key) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(key_to_dynamo(key)))
            .send()
            .await
            .map_err(backend)?;

        output.item.map(item_from_dynamo).transpose()
    }

    async fn query_prefix(
        &self,
        partition: &str,
        sort_prefix: &str,
    ) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<DynamoItem> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk)")
                .expression_attribute_values(":pk", AttributeValue::S(partition.to_string()))
                .expression_attribute_values(":sk", AttributeValue::S(sort_prefix.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(backend)?;

            for raw in output.items.unwrap_or_default() {
                items.push(item_from_dynamo(raw)?);
            }

            match output.last_evaluated_key {
                Some(next) if !next.is_empty() => start_key = Some(next),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn query_index(&self, index_partition: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<DynamoItem> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(INDEX_NAME)
                .key_condition_expression(format!("{INDEX_PARTITION_ATTR} = :p"))
                .expression_attribute_values(":p", AttributeValue::S(index_partition.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(backend)?;

            for raw in output.items.unwrap_or_default() {
                items.push(item_from_dynamo(raw)?);
            }

            match output.last_evaluated_key {
                Some(next) if !next.is_empty() => start_key = Some(next),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item_to_dynamo(&item)))
            .send()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        if ops.len() > MAX_BATCH_SIZE {
            return Err(StoreError::BatchTooLarge(ops.len()));
        }
        if ops.is_empty() {
            return Ok(());
        }

        let mut requests = Vec::with_capacity(ops.len());
        for op in &ops {
            let request = match op {
                WriteOp::Put(item) => WriteRequest::builder()
                    .put_request(
                        PutRequest::builder()
                            .set_item(Some(item_to_dynamo(item)))
                            .build()
                            .map_err(backend)?,
                    )
                    .build(),
                WriteOp::Delete(key) => WriteRequest::builder()
                    .delete_request(
                        DeleteRequest::builder()
                            .set_key(Some(key_to_dynamo(key)))
                            .build()
                            .map_err(backend)?,
                    )
                    .build(),
            };
            requests.push(request);
        }

        let output = self
            .client
            .batch_write_item()
            .request_items(self.table.clone(), requests)
            .send()
            .await
            .map_err(backend)?;

        let unprocessed: usize = output
            .unprocessed_items
            .unwrap_or_default()
            .values()
            .map(Vec::len)
            .sum();
        if unprocessed > 0 {
            return Err(StoreError::Unprocessed(unprocessed));
        }

        Ok(())
    }
}
