//! Collection store adapter.
//!
//! # Responsibility
//! - Define the narrow document-store contract the rest of core depends on.
//! - Offer single-collection primitives only: insert, owner listing,
//!   equality query, batched get-by-ids. Joins are built on top, never inside a store.
//!
//! # Invariants
//! - Every read takes the owner as a mandatory filter.
//! - `get_by_ids` with an empty id set returns an empty result without
//!   reaching storage.
//! - Without `order_by`, results come back in insertion order.
//!
//! # See also
//! - `crate::resolver` for the two-phase joins over this contract.

use crate::error::{StoreError, StoreResult};
use crate::scope::OwnerId;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod memory;
pub mod sqlite;
pub mod timeout;

pub use memory::{MemoryCollectionStore, StoreCall};
pub use sqlite::SqliteCollectionStore;
pub use timeout::TimeoutStore;

/// Persisted owner field name.
pub const OWNER_FIELD: &str = "userId";
/// Persisted server-assigned creation instant (epoch milliseconds).
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Entity fields of one document, keyed by persisted field name.
pub type Fields = Map<String, Value>;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Events,
    People,
    Attendance,
    Relationships,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::People => "people",
            Self::Attendance => "attendance",
            Self::Relationships => "relationships",
        }
    }
}

/// Sort directive for equality queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub owner_id: OwnerId,
    pub created_at_ms: i64,
    /// Entity fields only; `userId`/`createdAt` are lifted into the fields above.
    pub fields: Fields,
}

impl Document {
    /// Reads a required string field.
    pub fn required_str(&self, collection: Collection, name: &str) -> StoreResult<String> {
        match self.fields.get(name) {
            Some(Value::String(value)) => Ok(value.clone()),
            other => Err(StoreError::corrupt(
                collection.name(),
                format!("document `{}` field `{name}` is not a string: {other:?}", self.id),
            )),
        }
    }

    /// Reads an optional string field; absent or null maps to "".
    pub fn optional_str(&self, collection: Collection, name: &str) -> StoreResult<String> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(StoreError::corrupt(
                collection.name(),
                format!("document `{}` field `{name}` is not a string: {other}", self.id),
            )),
        }
    }

    /// Reads a required integer field.
    pub fn required_i64(&self, collection: Collection, name: &str) -> StoreResult<i64> {
        self.fields
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                StoreError::corrupt(
                    collection.name(),
                    format!("document `{}` field `{name}` is not an integer", self.id),
                )
            })
    }
}

/// Narrow contract over an opaque document collection store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Inserts one document and returns its generated id.
    async fn insert(
        &self,
        collection: Collection,
        owner: &OwnerId,
        fields: Fields,
    ) -> StoreResult<String>;

    /// Returns every document of `collection` owned by `owner`.
    async fn list_owned(
        &self,
        collection: Collection,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>>;

    /// Returns owner documents whose `field` equals `value`.
    async fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>>;

    /// Returns owner documents whose id is in `ids`, in insertion order.
    async fn get_by_ids(
        &self,
        collection: Collection,
        ids: &[String],
        owner: &OwnerId,
    ) -> StoreResult<Vec<Document>>;

    /// Returns one owner document by id.
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
        owner: &OwnerId,
    ) -> StoreResult<Option<Document>>;
}

/// Rejects field names that are not plain identifiers.
pub(crate) fn validate_field_name(field: &str) -> StoreResult<()> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidQuery(format!(
            "unsupported field name `{field}`"
        )))
    }
}
