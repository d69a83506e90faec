//! Event record and creation input.
//!
//! `date` is persisted as epoch milliseconds and converted at this boundary.

use super::{fields, millis_to_datetime, normalize_optional, normalize_required, EventId};
use crate::error::{CoreResult, StoreResult};
use crate::scope::OwnerId;
use crate::store::{Collection, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Ordering key for timelines (descending).
    pub date: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub(crate) fn from_document(document: Document) -> StoreResult<Self> {
        let collection = Collection::Events;
        let date_ms = document.required_i64(collection, fields::DATE)?;
        Ok(Self {
            name: document.required_str(collection, fields::NAME)?,
            date: millis_to_datetime(collection, fields::DATE, date_ms)?,
            location: document.optional_str(collection, fields::LOCATION)?,
            description: document.optional_str(collection, fields::DESCRIPTION)?,
            created_at: millis_to_datetime(collection, "createdAt", document.created_at_ms)?,
            owner_id: document.owner_id,
            id: EventId::new(document.id),
        })
    }
}

/// Caller input for creating an event. `date` defaults to now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl NewEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    /// # Errors
    /// - `Validation` when `name` is empty after trimming.
    pub(crate) fn into_fields(self, now: DateTime<Utc>) -> CoreResult<Fields> {
        let name = normalize_required(fields::NAME, &self.name)?;
        let date = self.date.unwrap_or(now);

        let mut map = Fields::new();
        map.insert(fields::NAME.into(), Value::String(name));
        map.insert(fields::DATE.into(), Value::from(date.timestamp_millis()));
        map.insert(
            fields::LOCATION.into(),
            Value::String(normalize_optional(self.location.as_deref())),
        );
        map.insert(
            fields::DESCRIPTION.into(),
            Value::String(normalize_optional(self.description.as_deref())),
        );
        Ok(map)
    }
}
