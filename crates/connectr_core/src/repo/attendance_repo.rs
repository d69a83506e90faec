//! Attendance repository.
//!
//! # Invariants
//! - A link is only written when both endpoints exist under the caller's
//!   owner, so no attendance record can join two owners' data.
//! - Duplicate links for the same pair are not prevented.

use super::{owned_records, EventRepository, PersonRepository};
use crate::error::CoreResult;
use crate::model::{fields, Attendance, AttendanceId, EventId, PersonId};
use crate::scope::OwnerScope;
use crate::store::{Collection, CollectionStore};
use log::info;
use serde_json::Value;

pub struct AttendanceRepository<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: CollectionStore + ?Sized> AttendanceRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Links `person_id` to `event_id`.
    ///
    /// # Errors
    /// - `NotFound` when either endpoint is missing under the owner.
    pub async fn create(
        &self,
        scope: &OwnerScope,
        event_id: &EventId,
        person_id: &PersonId,
    ) -> CoreResult<AttendanceId> {
        EventRepository::new(self.store)
            .find_by_id(scope, event_id)
            .await?;
        PersonRepository::new(self.store)
            .find_by_id(scope, person_id)
            .await?;

        let id = self
            .store
            .insert(
                Collection::Attendance,
                scope.owner(),
                Attendance::fields(event_id, person_id),
            )
            .await?;
        info!(
            "event=attendance_create module=repo status=ok attendance_id={id} event_id={event_id} person_id={person_id}"
        );
        Ok(AttendanceId::new(id))
    }

    pub async fn list_for_event(
        &self,
        scope: &OwnerScope,
        event_id: &EventId,
    ) -> CoreResult<Vec<Attendance>> {
        self.list_where(scope, fields::EVENT_ID, event_id.as_str())
            .await
    }

    pub async fn list_for_person(
        &self,
        scope: &OwnerScope,
        person_id: &PersonId,
    ) -> CoreResult<Vec<Attendance>> {
        self.list_where(scope, fields::PERSON_ID, person_id.as_str())
            .await
    }

    async fn list_where(
        &self,
        scope: &OwnerScope,
        field: &str,
        value: &str,
    ) -> CoreResult<Vec<Attendance>> {
        let documents = self
            .store
            .query_by_equality(
                Collection::Attendance,
                field,
                &Value::String(value.to_string()),
                scope.owner(),
                None,
            )
            .await?;
        owned_records(
            scope,
            Collection::Attendance,
            documents,
            Attendance::from_document,
        )
    }
}
