//! Result assembly: pure shaping of resolver output.
//!
//! # Invariants
//! - No I/O.
//! - Ordering is stable: equal keys keep their input order, so repeated
//!   calls over unchanged data return identical sequences.

use crate::model::{Event, Person, RelationshipId, RelationshipType};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::hash::Hash;

/// The other endpoint of a relationship edge, seen from one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPerson {
    pub person: Person,
    pub kind: RelationshipType,
    pub relationship_id: RelationshipId,
}

/// One event with its resolved attendees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    pub event: Event,
    pub attendees: Vec<Person>,
}

/// One person with attended events (date descending) and relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetail {
    pub person: Person,
    pub events: Vec<Event>,
    pub relationships: Vec<RelatedPerson>,
}

/// Stable sort by a key, descending.
pub fn order_by_key_desc<T, K, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by_key(|item| Reverse(key(item)));
    items
}

/// Events ordered by `date` descending.
pub fn order_events_by_date_desc(events: Vec<Event>) -> Vec<Event> {
    order_by_key_desc(events, |event| event.date)
}

/// Drops repeated keys, keeping the first occurrence and input order.
pub fn dedup_preserving_order<T: Clone + Eq + Hash>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
