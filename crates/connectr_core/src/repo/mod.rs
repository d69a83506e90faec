//! Entity repositories over the collection store.
//!
//! # Responsibility
//! - Provide typed create/list/find operations per entity kind.
//! - Stamp the owner on every write and filter by it on every read.
//!
//! # Invariants
//! - Writes validate input before any store call.
//! - Reads re-check the owner of every returned document; a mismatch is
//!   dropped, never returned.
//! - Store failures propagate unchanged as `CoreError::StoreUnavailable`.

pub mod attendance_repo;
pub mod event_repo;
pub mod person_repo;
pub mod relationship_repo;

pub use attendance_repo::AttendanceRepository;
pub use event_repo::EventRepository;
pub use person_repo::PersonRepository;
pub use relationship_repo::RelationshipRepository;

use crate::error::{CoreResult, StoreResult};
use crate::scope::OwnerScope;
use crate::store::{Collection, Document};
use log::warn;

/// Parses owner-checked documents into records, preserving store order.
pub(crate) fn owned_records<T>(
    scope: &OwnerScope,
    collection: Collection,
    documents: Vec<Document>,
    parse: impl Fn(Document) -> StoreResult<T>,
) -> CoreResult<Vec<T>> {
    let mut records = Vec::with_capacity(documents.len());
    for document in documents {
        if !scope.owns(&document.owner_id) {
            warn!(
                "event=owner_mismatch module=repo status=error collection={} doc_id={}",
                collection.name(),
                document.id
            );
            continue;
        }
        records.push(parse(document)?);
    }
    Ok(records)
}

/// Owner-checked single document parse.
pub(crate) fn owned_record<T>(
    scope: &OwnerScope,
    collection: Collection,
    document: Option<Document>,
    parse: impl Fn(Document) -> StoreResult<T>,
) -> CoreResult<Option<T>> {
    let documents = document.into_iter().collect();
    Ok(owned_records(scope, collection, documents, parse)?.pop())
}
