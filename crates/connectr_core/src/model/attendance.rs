//! Attendance: the many-to-many link between a person and an event.

use super::{fields, millis_to_datetime, AttendanceId, EventId, PersonId};
use crate::error::StoreResult;
use crate::scope::OwnerId;
use crate::store::{Collection, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    pub event_id: EventId,
    pub person_id: PersonId,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Attendance {
    pub(crate) fn from_document(document: Document) -> StoreResult<Self> {
        let collection = Collection::Attendance;
        Ok(Self {
            event_id: EventId::new(document.required_str(collection, fields::EVENT_ID)?),
            person_id: PersonId::new(document.required_str(collection, fields::PERSON_ID)?),
            created_at: millis_to_datetime(collection, "createdAt", document.created_at_ms)?,
            owner_id: document.owner_id,
            id: AttendanceId::new(document.id),
        })
    }

    pub(crate) fn fields(event_id: &EventId, person_id: &PersonId) -> Fields {
        let mut map = Fields::new();
        map.insert(
            fields::PERSON_ID.into(),
            Value::String(person_id.as_str().to_string()),
        );
        map.insert(
            fields::EVENT_ID.into(),
            Value::String(event_id.as_str().to_string()),
        );
        map
    }
}
