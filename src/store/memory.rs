//! In-memory entity store.
//!
//! The default backing for local runs and tests: a `HashMap` behind an
//! async `RwLock`. Reads are shared, writes exclusive.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::merge::Kind;
use crate::store::{EntityStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    entities: RwLock<HashMap<(Kind, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Value>, StoreError> {
        let entities = self.entities.read().await;
        Ok(entities.get(&(kind, id.to_string())).cloned())
    }

    async fn put(&self, kind: Kind, id: &str, record: Value) -> Result<(), StoreError> {
        let mut entities = self.entities.write().await;
        entities.insert((kind, id.to_string()), record);
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &str) -> Result<bool, StoreError> {
        let mut entities = self.entities.write().await;
        Ok(entities.remove(&(kind, id.to_string())).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn round_trip_keyed_by_kind_and_id() {
        let store = MemoryStore::new();
        store
            .put(Kind::User, "u1", json!({"id": "u1"}))
            .await
            .unwrap();

        assert_eq!(
            store.get(Kind::User, "u1").await.unwrap(),
            Some(json!({"id": "u1"}))
        );
        // Same id under another kind is a different entity.
        assert_eq!(store.get(Kind::Room, "u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = MemoryStore::new();
        store.put(Kind::Trip, "t1", json!({})).await.unwrap();

        assert!(store.delete(Kind::Trip, "t1").await.unwrap());
        assert!(!store.delete(Kind::Trip, "t1").await.unwrap());
    }
}
