use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::repositories::errors::kv_store_errors::KvStoreError;

/// Byte-valued key-value storage with an atomic compare-and-set.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvStoreError>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvStoreError>;

    /// Writes `value` only if the stored bytes equal `expected`, where `None`
    /// means the key must be absent. Returns whether the write happened.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, KvStoreError>;
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        MemoryKvStore::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvStoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvStoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, KvStoreError> {
        let mut entries = self.entries.lock().await;
        if entries.get(key).map(Vec::as_slice) != expected {
            debug!("Compare-and-set mismatch for key {}", key);
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct KvItem {
    key: String,
    value: String,
}

pub struct DynamoDbKvStore {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbKvStore {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    fn to_text(value: &[u8]) -> Result<String, KvStoreError> {
        String::from_utf8(value.to_vec()).map_err(|e| KvStoreError::Serialization(e.to_string()))
    }

    fn item(key: &str, value: &[u8]) -> Result<HashMap<String, AttributeValue>, KvStoreError> {
        let item = KvItem {
            key: key.to_string(),
            value: Self::to_text(value)?,
        };
        serde_dynamo::to_item(item).map_err(|e| KvStoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl KvStore for DynamoDbKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvStoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("key", AttributeValue::S(key.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| KvStoreError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            let item: KvItem = serde_dynamo::from_item(item)
                .map_err(|e| KvStoreError::Serialization(e.to_string()))?;
            Ok(Some(item.value.into_bytes()))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvStoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::item(key, value)?))
            .send()
            .await
            .map_err(|e| KvStoreError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, KvStoreError> {
        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::item(key, value)?));

        let request = match expected {
            None => request
                .condition_expression("attribute_not_exists(#k)")
                .expression_attribute_names("#k", "key"),
            Some(previous) => request
                .condition_expression("#v = :expected")
                .expression_attribute_names("#v", "value")
                .expression_attribute_values(
                    ":expected",
                    AttributeValue::S(Self::to_text(previous)?),
                ),
        };

        match request.send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let conditional_failed = e
                    .as_service_error()
                    .map(|service_error| service_error.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if conditional_failed {
                    debug!("Conditional put rejected for key {}", key);
                    Ok(false)
                } else {
                    Err(KvStoreError::DynamoDb(e.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_get_missing_key() {
        let store = MemoryKvStore::new();

        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_set_then_get() {
        let store = MemoryKvStore::new();

        store.set("dm-1", b"first").await.unwrap();
        store.set("dm-1", b"second").await.unwrap();

        assert_eq!(store.get("dm-1").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_compare_and_set_on_absent_key() {
        let store = MemoryKvStore::new();

        assert!(store.compare_and_set("dm-1", None, b"v1").await.unwrap());
        assert!(!store.compare_and_set("dm-1", None, b"v2").await.unwrap());
        assert_eq!(store.get("dm-1").await.unwrap(), Some(b"v1".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_compare_and_set_with_stale_value() {
        let store = MemoryKvStore::new();
        store.set("dm-1", b"v1").await.unwrap();

        assert!(store
            .compare_and_set("dm-1", Some(b"v1"), b"v2")
            .await
            .unwrap());
        assert!(!store
            .compare_and_set("dm-1", Some(b"v1"), b"v3")
            .await
            .unwrap());
        assert_eq!(store.get("dm-1").await.unwrap(), Some(b"v2".to_vec()));
    }
}
