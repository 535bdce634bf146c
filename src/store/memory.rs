// src/store/memory.rs
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::docstore::{DocumentStore, Filter, FilterOp, Query, SortDirection, StoreError};

/// In-memory `DocumentStore` backing tests, local runs and the dev seed.
/// Not a persistence engine: everything lives in one process and is gone on
/// restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<Uuid, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn into_object(doc: Value) -> Result<Map<String, Value>, StoreError> {
    match doc {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn matches_filter(doc: &Value, filter: &Filter) -> bool {
    let Some(field_value) = doc.get(&filter.field) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => field_value == &filter.value,
        FilterOp::In => match &filter.value {
            Value::Array(candidates) => candidates.contains(field_value),
            _ => false,
        },
    }
}

// RFC 3339 timestamps are compared as instants, not as strings, since the
// serialized subsecond precision varies.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|col| col.get(&id))
            .cloned())
    }

    async fn add(&self, collection: &str, doc: Value) -> Result<Uuid, StoreError> {
        let mut object = into_object(doc)?;
        let id = Uuid::new_v4();
        object.insert("id".to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, Value::Object(object));
        Ok(id)
    }

    async fn set(&self, collection: &str, id: Uuid, doc: Value) -> Result<(), StoreError> {
        let mut object = into_object(doc)?;
        object.insert("id".to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, Value::Object(object));
        Ok(())
    }

    async fn update(&self, collection: &str, id: Uuid, changes: Value) -> Result<(), StoreError> {
        let changes = into_object(changes)?;

        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|col| col.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id,
            })?;

        if let Value::Object(existing) = doc {
            for (key, value) in changes {
                existing.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(col) = collections.get_mut(collection) {
            col.remove(&id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Value> = collections
            .get(collection)
            .map(|col| {
                col.values()
                    .filter(|doc| query.filters.iter().all(|f| matches_filter(doc, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&order.field).unwrap_or(&Value::Null),
                    b.get(&order.field).unwrap_or(&Value::Null),
                );
                match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let docs = docs.into_iter().skip(query.offset.unwrap_or(0));
        let docs = match query.limit {
            Some(limit) => docs.take(limit).collect(),
            None => docs.collect(),
        };
        Ok(docs)
    }

    async fn append_to_array(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|col| col.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id,
            })?;

        if let Value::Object(existing) = doc {
            match existing.get_mut(field) {
                Some(Value::Array(items)) => items.push(value),
                // Absent or non-array fields become a fresh one-element array.
                _ => {
                    existing.insert(field.to_string(), Value::Array(vec![value]));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::docstore::OrderBy;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_generates_id_and_surfaces_it_in_the_document() {
        let store = MemoryStore::new();
        let id = store
            .add("tickets", json!({"title": "printer on fire"}))
            .await
            .unwrap();

        let doc = store.get("tickets", id).await.unwrap().unwrap();
        assert_eq!(doc["id"], json!(id.to_string()));
        assert_eq!(doc["title"], json!("printer on fire"));
    }

    #[tokio::test]
    async fn test_get_unknown_id_returns_none() {
        let store = MemoryStore::new();
        let missing = store.get("tickets", Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_add_rejects_non_object_documents() {
        let store = MemoryStore::new();
        let err = store.add("tickets", json!("just a string")).await;
        assert!(matches!(err, Err(StoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn test_set_is_a_keyed_upsert() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        store
            .set("users", id, json!({"email": "a@example.com"}))
            .await
            .unwrap();
        store
            .set("users", id, json!({"email": "b@example.com"}))
            .await
            .unwrap();

        let doc = store.get("users", id).await.unwrap().unwrap();
        assert_eq!(doc["email"], json!("b@example.com"));
        assert_eq!(doc["id"], json!(id.to_string()));
    }

    #[tokio::test]
    async fn test_update_shallow_merges_and_keeps_other_fields() {
        let store = MemoryStore::new();
        let id = store
            .add("tickets", json!({"title": "a", "status": "open"}))
            .await
            .unwrap();

        store
            .update("tickets", id, json!({"status": "closed"}))
            .await
            .unwrap();

        let doc = store.get("tickets", id).await.unwrap().unwrap();
        assert_eq!(doc["status"], json!("closed"));
        assert_eq!(doc["title"], json!("a"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let store = MemoryStore::new();
        let err = store
            .update("tickets", Uuid::new_v4(), json!({"status": "closed"}))
            .await;
        assert!(matches!(err, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let id = store.add("tickets", json!({"title": "a"})).await.unwrap();

        store.delete("tickets", id).await.unwrap();
        assert!(store.get("tickets", id).await.unwrap().is_none());
        store.delete("tickets", id).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_filters_eq_and_in() {
        let store = MemoryStore::new();
        store
            .add("users", json!({"role": "admin", "is_active": true}))
            .await
            .unwrap();
        store
            .add("users", json!({"role": "employee", "is_active": true}))
            .await
            .unwrap();
        store
            .add("users", json!({"role": "customer", "is_active": true}))
            .await
            .unwrap();
        store
            .add("users", json!({"role": "employee", "is_active": false}))
            .await
            .unwrap();

        let staff = store
            .query(
                "users",
                Query {
                    filters: vec![
                        Filter::is_in("role", vec![json!("employee"), json!("admin")]),
                        Filter::eq("is_active", json!(true)),
                    ],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(staff.len(), 2);
        assert!(staff.iter().all(|doc| doc["is_active"] == json!(true)));
    }

    #[tokio::test]
    async fn test_query_missing_field_never_matches() {
        let store = MemoryStore::new();
        store.add("tickets", json!({"title": "a"})).await.unwrap();

        let hits = store
            .query(
                "tickets",
                Query {
                    filters: vec![Filter::eq("assigned_to", json!("someone"))],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_query_orders_rfc3339_timestamps_as_instants() {
        let store = MemoryStore::new();
        // Mixed subsecond precision sorts wrong under plain string compare.
        store
            .add("t", json!({"n": 1, "created_at": "2026-01-02T10:00:09.500Z"}))
            .await
            .unwrap();
        store
            .add("t", json!({"n": 2, "created_at": "2026-01-02T10:00:09Z"}))
            .await
            .unwrap();
        store
            .add("t", json!({"n": 3, "created_at": "2026-01-02T10:00:10Z"}))
            .await
            .unwrap();

        let docs = store
            .query(
                "t",
                Query {
                    order_by: Some(OrderBy::desc("created_at")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let order: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_query_offset_and_limit_page_results() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store
                .add(
                    "t",
                    json!({"n": n, "created_at": format!("2026-01-0{}T00:00:00Z", n + 1)}),
                )
                .await
                .unwrap();
        }

        let page = store
            .query(
                "t",
                Query {
                    order_by: Some(OrderBy::asc("created_at")),
                    offset: Some(2),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let order: Vec<i64> = page.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_append_to_array_creates_then_preserves_order() {
        let store = MemoryStore::new();
        let id = store.add("tickets", json!({"title": "a"})).await.unwrap();

        store
            .append_to_array("tickets", id, "comments", json!({"n": 1}))
            .await
            .unwrap();
        store
            .append_to_array("tickets", id, "comments", json!({"n": 2}))
            .await
            .unwrap();

        let doc = store.get("tickets", id).await.unwrap().unwrap();
        assert_eq!(doc["comments"], json!([{"n": 1}, {"n": 2}]));

        let err = store
            .append_to_array("tickets", Uuid::new_v4(), "comments", json!({"n": 3}))
            .await;
        assert!(matches!(err, Err(StoreError::NotFound { .. })));
    }
}
