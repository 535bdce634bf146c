// src/store/docstore.rs
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: String, id: Uuid },
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Eq,
    In,
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Filter {
            field: field.into(),
            op: FilterOp::Eq,
            value,
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter {
            field: field.into(),
            op: FilterOp::In,
            value: Value::Array(values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Document persistence contract. Documents are JSON objects; the store keeps
/// the document id inside the document under `id`.
///
/// Semantics implementations must honor:
/// - `get` returns `None` for an unknown id,
/// - `add` generates the id, `set` is a keyed upsert,
/// - `update` shallow-merges top-level fields and fails with `NotFound` for
///   an unknown id, as does `append_to_array`,
/// - `delete` is idempotent,
/// - `query` filters on top-level fields only.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;
    async fn add(&self, collection: &str, doc: Value) -> Result<Uuid, StoreError>;
    async fn set(&self, collection: &str, id: Uuid, doc: Value) -> Result<(), StoreError>;
    async fn update(&self, collection: &str, id: Uuid, changes: Value) -> Result<(), StoreError>;
    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError>;
    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Value>, StoreError>;
    async fn append_to_array(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;
}
