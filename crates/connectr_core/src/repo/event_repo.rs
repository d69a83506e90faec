//! Event repository.
//!
//! # Invariants
//! - `list` is ordered by `date` descending; equal dates keep insertion order.
//! - A missing `date` on create defaults to the current instant.

use super::{owned_record, owned_records};
use crate::error::{CoreError, CoreResult};
use crate::model::{fields, Event, EventId, NewEvent};
use crate::scope::OwnerScope;
use crate::store::{Collection, CollectionStore, OrderBy};
use chrono::Utc;
use log::info;

pub struct EventRepository<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: CollectionStore + ?Sized> EventRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// # Errors
    /// - `Validation` when `name` is blank after trimming.
    pub async fn create(&self, scope: &OwnerScope, input: NewEvent) -> CoreResult<EventId> {
        let fields = input.into_fields(Utc::now())?;
        let id = self
            .store
            .insert(Collection::Events, scope.owner(), fields)
            .await?;
        info!("event=event_create module=repo status=ok event_id={id}");
        Ok(EventId::new(id))
    }

    pub async fn list(&self, scope: &OwnerScope) -> CoreResult<Vec<Event>> {
        let documents = self
            .store
            .list_owned(
                Collection::Events,
                scope.owner(),
                Some(OrderBy::desc(fields::DATE)),
            )
            .await?;
        owned_records(scope, Collection::Events, documents, Event::from_document)
    }

    pub async fn get(&self, scope: &OwnerScope, id: &EventId) -> CoreResult<Option<Event>> {
        let document = self
            .store
            .get_by_id(Collection::Events, id.as_str(), scope.owner())
            .await?;
        owned_record(scope, Collection::Events, document, Event::from_document)
    }

    /// # Errors
    /// - `NotFound` when no event with `id` exists under the owner.
    pub async fn find_by_id(&self, scope: &OwnerScope, id: &EventId) -> CoreResult<Event> {
        self.get(scope, id)
            .await?
            .ok_or_else(|| CoreError::not_found("event", id))
    }

    /// Batch-fetches events by id in store order. Callers needing date order
    /// sort afterwards; an empty id set issues no store call.
    pub async fn find_many(&self, scope: &OwnerScope, ids: &[EventId]) -> CoreResult<Vec<Event>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let documents = self
            .store
            .get_by_ids(Collection::Events, &raw, scope.owner())
            .await?;
        owned_records(scope, Collection::Events, documents, Event::from_document)
    }
}
