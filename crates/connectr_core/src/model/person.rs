//! Person record and creation input.

use super::{fields, millis_to_datetime, normalize_optional, normalize_required, PersonId};
use crate::error::{CoreResult, StoreResult};
use crate::scope::OwnerId;
use crate::store::{Collection, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A person tracked by one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub contact_info: String,
    pub notes: String,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Person {
    /// "First Last", used by listings and search.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive substring match over names and organization.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.organization.as_str(),
        ]
        .iter()
        .any(|value| value.to_lowercase().contains(&needle))
            || self.display_name().to_lowercase().contains(&needle)
    }

    pub(crate) fn from_document(document: Document) -> StoreResult<Self> {
        let collection = Collection::People;
        Ok(Self {
            first_name: document.required_str(collection, fields::FIRST_NAME)?,
            last_name: document.required_str(collection, fields::LAST_NAME)?,
            organization: document.optional_str(collection, fields::ORGANIZATION)?,
            contact_info: document.optional_str(collection, fields::CONTACT_INFO)?,
            notes: document.optional_str(collection, fields::NOTES)?,
            created_at: millis_to_datetime(collection, "createdAt", document.created_at_ms)?,
            owner_id: document.owner_id,
            id: PersonId::new(document.id),
        })
    }
}

/// Caller input for creating a person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub organization: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

impl NewPerson {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    pub fn organization(mut self, value: impl Into<String>) -> Self {
        self.organization = Some(value.into());
        self
    }

    pub fn contact_info(mut self, value: impl Into<String>) -> Self {
        self.contact_info = Some(value.into());
        self
    }

    pub fn notes(mut self, value: impl Into<String>) -> Self {
        self.notes = Some(value.into());
        self
    }

    /// Trims every field and builds the persisted field map.
    ///
    /// # Errors
    /// - `Validation` when first or last name is empty after trimming.
    pub(crate) fn into_fields(self) -> CoreResult<Fields> {
        let first_name = normalize_required(fields::FIRST_NAME, &self.first_name)?;
        let last_name = normalize_required(fields::LAST_NAME, &self.last_name)?;

        let mut map = Fields::new();
        map.insert(fields::FIRST_NAME.into(), Value::String(first_name));
        map.insert(fields::LAST_NAME.into(), Value::String(last_name));
        map.insert(
            fields::ORGANIZATION.into(),
            Value::String(normalize_optional(self.organization.as_deref())),
        );
        map.insert(
            fields::CONTACT_INFO.into(),
            Value::String(normalize_optional(self.contact_info.as_deref())),
        );
        map.insert(
            fields::NOTES.into(),
            Value::String(normalize_optional(self.notes.as_deref())),
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::NewPerson;
    use crate::error::CoreError;
    use serde_json::json;

    #[test]
    fn into_fields_trims_and_defaults() {
        let fields = NewPerson::new("  Ada ", "Lovelace\n")
            .organization(" Analytical ")
            .into_fields()
            .unwrap();
        assert_eq!(fields["firstName"], json!("Ada"));
        assert_eq!(fields["lastName"], json!("Lovelace"));
        assert_eq!(fields["organization"], json!("Analytical"));
        assert_eq!(fields["contactInfo"], json!(""));
        assert_eq!(fields["notes"], json!(""));
    }

    #[test]
    fn blank_last_name_is_rejected() {
        let err = NewPerson::new("Ada", "   ").into_fields().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation {
                field: "lastName",
                ..
            }
        ));
    }
}
