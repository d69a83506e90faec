//! Per-call timeout decorator for any `CollectionStore`.
//!
//! Expiry surfaces as `StoreError::Timeout`, which callers see as a
//! retryable `CoreError::StoreUnavailable`. No retry happens here.
//!
//! Only reads are cut off. Dropping a write future does not stop work the
//! inner store already handed off, so a timed-out insert could still commit
//! and a retry would duplicate it. Inserts pass straight through and rely on
//! the inner store's own deadline (see
//! `SqliteCollectionStore::with_lock_timeout`), which fails before writing.

use super::{Collection, CollectionStore, Document, Fields, OrderBy};
use crate::error::{StoreError, StoreResult};
use crate::scope::OwnerId;
use async_trait::async_trait;
use log::warn;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: CollectionStore> TimeoutStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        collection: Collection,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "event=store_timeout module=store status=error op={operation} collection={} timeout_ms={}",
                    collection.name(),
                    self.timeout.as_millis()
                );
                Err(StoreError::Timeout {
                    operation,
                    timeout_ms: self.timeout.as_millis(),
                })
            }
        }
    }
}

#[async_trait]
impl<S: CollectionStore> CollectionStore for TimeoutStore<S> {
    async fn insert(
        &self,
        collection: Collection,
        owner: &OwnerId,
        fields: Fields,
    ) -> StoreResult<String> {
        self.inner.insert(collection, owner, fields).await
    }

    async fn list_owned(
        &self,
        collection: Collection,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        self.bounded(
            "list_owned",
            collection,
            self.inner.list_owned(collection, owner, order_by),
        )
        .await
    }

    async fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        self.bounded(
            "query_by_equality",
            collection,
            self.inner
                .query_by_equality(collection, field, value, owner, order_by),
        )
        .await
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
        self.bounded(
            "get_by_ids",
            collection,
            self.inner.get_by_ids(collection, ids, owner),
        )
        .await
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
        owner: &OwnerId,
    ) -> StoreResult<Option<Document>> {
        self.bounded(
            "get_by_id",
            collection,
            self.inner.get_by_id(collection, id, owner),
        )
        .await
    }
}
