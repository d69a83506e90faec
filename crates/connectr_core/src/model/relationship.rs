//! Relationship: a typed, logically undirected edge between two people.
//!
//! One record is stored per edge with a directional A/B pair. Readers query
//! both endpoint fields instead of writers storing a mirrored second record,
//! which keeps writes single-document at the cost of two read queries.

use super::{fields, millis_to_datetime, PersonId, RelationshipId};
use crate::error::{StoreError, StoreResult};
use crate::scope::OwnerId;
use crate::store::{Collection, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    Partner,
    Child,
    Parent,
    Sibling,
    Colleague,
    Friend,
    Other,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 7] = [
        RelationshipType::Partner,
        RelationshipType::Child,
        RelationshipType::Parent,
        RelationshipType::Sibling,
        RelationshipType::Colleague,
        RelationshipType::Friend,
        RelationshipType::Other,
    ];

    /// Persisted display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Partner => "Partner",
            Self::Child => "Child",
            Self::Parent => "Parent",
            Self::Sibling => "Sibling",
            Self::Colleague => "Colleague",
            Self::Friend => "Friend",
            Self::Other => "Other",
        }
    }
}

impl Display for RelationshipType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown relationship type `{wanted}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub person_a_id: PersonId,
    pub person_b_id: PersonId,
    pub kind: RelationshipType,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    /// Returns the endpoint opposite `person`, or `None` when `person` is not
    /// on this edge.
    pub fn other_endpoint(&self, person: &PersonId) -> Option<&PersonId> {
        if &self.person_a_id == person {
            Some(&self.person_b_id)
        } else if &self.person_b_id == person {
            Some(&self.person_a_id)
        } else {
            None
        }
    }

    pub(crate) fn from_document(document: Document) -> StoreResult<Self> {
        let collection = Collection::Relationships;
        let type_text = document.required_str(collection, fields::TYPE)?;
        let kind = type_text
            .parse::<RelationshipType>()
            .map_err(|message| StoreError::corrupt(collection.name(), message))?;
        Ok(Self {
            person_a_id: PersonId::new(document.required_str(collection, fields::PERSON_A_ID)?),
            person_b_id: PersonId::new(document.required_str(collection, fields::PERSON_B_ID)?),
            kind,
            created_at: millis_to_datetime(collection, "createdAt", document.created_at_ms)?,
            owner_id: document.owner_id,
            id: RelationshipId::new(document.id),
        })
    }

    pub(crate) fn fields(
        person_a_id: &PersonId,
        person_b_id: &PersonId,
        kind: RelationshipType,
    ) -> Fields {
        let mut map = Fields::new();
        map.insert(
            fields::PERSON_A_ID.into(),
            Value::String(person_a_id.as_str().to_string()),
        );
        map.insert(
            fields::PERSON_B_ID.into(),
            Value::String(person_b_id.as_str().to_string()),
        );
        map.insert(fields::TYPE.into(), Value::String(kind.as_str().to_string()));
        map
    }
}
