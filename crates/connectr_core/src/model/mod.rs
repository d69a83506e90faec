//! Domain model for people, events and the links between them.
//!
//! # Responsibility
//! - Define the typed records repositories return.
//! - Own the mapping between records and persisted document fields.
//!
//! # Invariants
//! - Every record carries the `OwnerId` it was created under.
//! - Optional text fields are stored and returned as "" when absent.
//! - Records are immutable once written.

pub mod attendance;
pub mod event;
mod ids;
pub mod person;
pub mod relationship;

pub use attendance::Attendance;
pub use event::{Event, NewEvent};
pub use ids::{AttendanceId, EventId, PersonId, RelationshipId};
pub use person::{NewPerson, Person};
pub use relationship::{Relationship, RelationshipType};

use crate::error::{StoreError, StoreResult};
use crate::store::Collection;
use chrono::{DateTime, Utc};

/// Persisted field names, shared by writers and the resolver's filters.
pub(crate) mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const ORGANIZATION: &str = "organization";
    pub const CONTACT_INFO: &str = "contactInfo";
    pub const NOTES: &str = "notes";

    pub const NAME: &str = "name";
    pub const DATE: &str = "date";
    pub const LOCATION: &str = "location";
    pub const DESCRIPTION: &str = "description";

    pub const EVENT_ID: &str = "eventID";
    pub const PERSON_ID: &str = "personID";

    pub const PERSON_A_ID: &str = "personA_ID";
    pub const PERSON_B_ID: &str = "personB_ID";
    pub const TYPE: &str = "type";
}

/// Trims optional input, mapping `None` to "".
pub(crate) fn normalize_optional(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Trims required input, failing when nothing is left.
pub(crate) fn normalize_required(
    field: &'static str,
    value: &str,
) -> crate::error::CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::error::CoreError::validation(
            field,
            "must not be empty",
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn millis_to_datetime(
    collection: Collection,
    field: &str,
    millis: i64,
) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        StoreError::corrupt(
            collection.name(),
            format!("field `{field}` holds out-of-range timestamp {millis}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional, normalize_required};

    #[test]
    fn optional_values_are_trimmed_and_default_to_empty() {
        assert_eq!(normalize_optional(None), "");
        assert_eq!(normalize_optional(Some("  Acme ")), "Acme");
    }

    #[test]
    fn required_values_reject_whitespace_only() {
        assert!(normalize_required("firstName", " \t ").is_err());
        assert_eq!(normalize_required("firstName", " Ada ").unwrap(), "Ada");
    }
}
