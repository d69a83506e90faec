//! In-process collection store.
//!
//! Keeps documents in insertion-ordered vectors and journals every call that
//! reaches storage, so callers can assert which round-trips a flow issued.

use super::{validate_field_name, Collection, CollectionStore, Document, Fields, OrderBy};
use crate::error::StoreResult;
use crate::scope::OwnerId;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One storage round-trip observed by `MemoryCollectionStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Insert {
        collection: Collection,
    },
    ListOwned {
        collection: Collection,
    },
    QueryByEquality {
        collection: Collection,
        field: String,
    },
    GetByIds {
        collection: Collection,
        ids: Vec<String>,
    },
    GetById {
        collection: Collection,
        id: String,
    },
}

#[derive(Default)]
pub struct MemoryCollectionStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    journal: Mutex<Vec<StoreCall>>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fully formed document as-is, bypassing id generation.
    ///
    /// Used to seed fixtures such as records written by another client.
    pub async fn put_document(&self, collection: Collection, document: Document) {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);
    }

    /// Returns every recorded round-trip in call order.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.journal.lock().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.journal.lock().await.clear();
    }

    async fn record(&self, call: StoreCall) {
        self.journal.lock().await.push(call);
    }
}

#[async_trait]
impl CollectionStore for MemoryCollectionStore {
    async fn insert(
        &self,
        collection: Collection,
        owner: &OwnerId,
        fields: Fields,
    ) -> StoreResult<String> {
        self.record(StoreCall::Insert { collection }).await;
        let id = Uuid::new_v4().to_string();
        let document = Document {
            id: id.clone(),
            owner_id: owner.clone(),
            created_at_ms: chrono::Utc::now().timestamp_millis(),
            fields,
        };
        self.put_document(collection, document).await;
        Ok(id)
    }

    async fn list_owned(
        &self,
        collection: Collection,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        self.record(StoreCall::ListOwned { collection }).await;

        let collections = self.collections.read().await;
        let mut owned: Vec<Document> = collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| &doc.owner_id == owner)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_documents(&mut owned, order_by);
        Ok(owned)
    }

    async fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        validate_field_name(field)?;
        self.record(StoreCall::QueryByEquality {
            collection,
            field: field.to_string(),
        })
        .await;

        let collections = self.collections.read().await;
        let mut matches: Vec<Document> = collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| &doc.owner_id == owner && doc.fields.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        sort_documents(&mut matches, order_by);
        Ok(matches)
    }

    async fn get_by_ids(
        &self,
        collection: Collection,
        ids: &[String],
        owner: &OwnerId,
    ) -> StoreResult<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.record(StoreCall::GetByIds {
            collection,
            ids: ids.to_vec(),
        })
        .await;

        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| &doc.owner_id == owner && wanted.contains(doc.id.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
        owner: &OwnerId,
    ) -> StoreResult<Option<Document>> {
        self.record(StoreCall::GetById {
            collection,
            id: id.to_string(),
        })
        .await;

        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|documents| {
            documents
                .iter()
                .find(|doc| doc.id == id && &doc.owner_id == owner)
                .cloned()
        }))
    }
}

fn sort_documents(documents: &mut [Document], order_by: Option<OrderBy>) {
    let Some(order) = order_by else {
        return;
    };
    // `sort_by` is stable, so ties keep insertion order.
    documents.sort_by(|left, right| {
        let ordering = compare_values(
            left.fields.get(order.field),
            right.fields.get(order.field),
        );
        if order.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Total order over optional JSON scalars: missing < null < bool < number < string.
fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::Array(_)) => 5,
            Some(Value::Object(_)) => 6,
        }
    }

    match (left, right) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}
