//! Association resolver: joins emulated on a store without native joins.
//!
//! # Responsibility
//! - Resolve attendance links into people-for-event and events-for-person.
//! - Resolve directional relationship records into an undirected view from
//!   any endpoint.
//!
//! # Invariants
//! - Every join is two explicit phases: a primary single-field query, then a
//!   secondary lookup by id. The secondary phase starts only after the
//!   primary result is in hand and is skipped when that result is empty.
//! - Phases run sequentially; nothing is fanned out.
//! - Store errors fail the whole call, except a missing "other person" in
//!   `relationships_for_person`, which is skipped.

use crate::assemble::{dedup_preserving_order, order_events_by_date_desc, RelatedPerson};
use crate::error::CoreResult;
use crate::model::{Event, EventId, Person, PersonId};
use crate::repo::{AttendanceRepository, EventRepository, PersonRepository, RelationshipRepository};
use crate::scope::OwnerScope;
use crate::store::CollectionStore;
use log::debug;

pub struct AssociationResolver<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: CollectionStore + ?Sized> AssociationResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// People linked to `event_id` through attendance, in store order.
    pub async fn attendees_for_event(
        &self,
        scope: &OwnerScope,
        event_id: &EventId,
    ) -> CoreResult<Vec<Person>> {
        let links = AttendanceRepository::new(self.store)
            .list_for_event(scope, event_id)
            .await?;
        let person_ids = dedup_preserving_order(links.into_iter().map(|link| link.person_id));
        if person_ids.is_empty() {
            debug!("event=resolve_attendees module=resolver status=ok short_circuit=true");
            return Ok(Vec::new());
        }

        let people = PersonRepository::new(self.store)
            .find_many(scope, &person_ids)
            .await?;
        debug!(
            "event=resolve_attendees module=resolver status=ok links={} resolved={}",
            person_ids.len(),
            people.len()
        );
        Ok(people)
    }

    /// Events `person_id` attended, ordered by date descending.
    ///
    /// The store cannot combine an id-set filter with its own ordering, so
    /// ordering is applied after the batch fetch.
    pub async fn events_for_person(
        &self,
        scope: &OwnerScope,
        person_id: &PersonId,
    ) -> CoreResult<Vec<Event>> {
        let links = AttendanceRepository::new(self.store)
            .list_for_person(scope, person_id)
            .await?;
        let event_ids = dedup_preserving_order(links.into_iter().map(|link| link.event_id));
        if event_ids.is_empty() {
            debug!("event=resolve_events module=resolver status=ok short_circuit=true");
            return Ok(Vec::new());
        }

        let events = EventRepository::new(self.store)
            .find_many(scope, &event_ids)
            .await?;
        debug!(
            "event=resolve_events module=resolver status=ok links={} resolved={}",
            event_ids.len(),
            events.len()
        );
        Ok(order_events_by_date_desc(events))
    }

    /// Every relationship touching `person_id`, paired with the other person.
    ///
    /// Edges stored with `person_id` as A come first, then edges stored with
    /// it as B. Both directions are concatenated without de-duplication, so a
    /// pair stored as both (A,B) and (B,A) is reported twice. Each other
    /// person is fetched individually; a miss is skipped.
    pub async fn relationships_for_person(
        &self,
        scope: &OwnerScope,
        person_id: &PersonId,
    ) -> CoreResult<Vec<RelatedPerson>> {
        let relationships = RelationshipRepository::new(self.store);
        let as_subject = relationships.list_by_person_a(scope, person_id).await?;
        let as_object = relationships.list_by_person_b(scope, person_id).await?;

        let people = PersonRepository::new(self.store);
        let mut related = Vec::new();
        for edge in as_subject.into_iter().chain(as_object) {
            let Some(other_id) = edge.other_endpoint(person_id) else {
                continue;
            };
            match people.get(scope, other_id).await? {
                Some(person) => related.push(RelatedPerson {
                    person,
                    kind: edge.kind,
                    relationship_id: edge.id,
                }),
                None => debug!(
                    "event=resolve_relationships module=resolver status=skipped relationship_id={} reason=other_person_missing",
                    edge.id
                ),
            }
        }
        Ok(related)
    }
}

#[cfg(test)]
mod tests {
    use super::AssociationResolver;
    use crate::error::{CoreError, StoreError};
    use crate::model::{EventId, PersonId};
    use crate::scope::{OwnerId, OwnerScope};
    use crate::store::{Collection, Document, MockCollectionStore};
    use serde_json::{json, Value};

    fn scope() -> OwnerScope {
        OwnerScope::new(OwnerId::parse("u1").unwrap())
    }

    fn doc(id: &str, fields: Value) -> Document {
        Document {
            id: id.to_string(),
            owner_id: OwnerId::parse("u1").unwrap(),
            created_at_ms: 1_700_000_000_000,
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    fn person_doc(id: &str, first: &str) -> Document {
        doc(id, json!({"firstName": first, "lastName": "Test"}))
    }

    #[tokio::test]
    async fn empty_attendance_skips_batch_fetch() {
        let mut store = MockCollectionStore::new();
        store
            .expect_query_by_equality()
            .withf(|collection, field, value, _, order_by| {
                *collection == Collection::Attendance
                    && field.to_string() == "eventID"
                    && value.as_str() == Some("e1")
                    && order_by.is_none()
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok(Vec::new()));
        store.expect_get_by_ids().times(0);

        let resolver = AssociationResolver::new(&store);
        let attendees = resolver
            .attendees_for_event(&scope(), &EventId::new("e1"))
            .await
            .unwrap();
        assert!(attendees.is_empty());
    }

    #[tokio::test]
    async fn events_are_ordered_after_the_batch_fetch() {
        let mut store = MockCollectionStore::new();
        store
            .expect_query_by_equality()
            .withf(|collection, field, _, _, order_by| {
                *collection == Collection::Attendance
                    && field.to_string() == "personID"
                    && order_by.is_none()
            })
            .returning(|_, _, _, _, _| {
                Ok(vec![
                    doc("a1", json!({"eventID": "old", "personID": "p1"})),
                    doc("a2", json!({"eventID": "new", "personID": "p1"})),
                    doc("a3", json!({"eventID": "old", "personID": "p1"})),
                ])
            });
        store
            .expect_get_by_ids()
            .withf(|collection, ids, _| {
                *collection == Collection::Events && ids.to_vec() == vec!["old", "new"]
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![
                    doc("old", json!({"name": "Old", "date": 1_000})),
                    doc("new", json!({"name": "New", "date": 2_000})),
                ])
            });

        let resolver = AssociationResolver::new(&store);
        let events = resolver
            .events_for_person(&scope(), &PersonId::new("p1"))
            .await
            .unwrap();
        let names: Vec<_> = events.iter().map(|event| event.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn missing_other_person_is_skipped() {
        let mut store = MockCollectionStore::new();
        store
            .expect_query_by_equality()
            .returning(|_, field, _, _, _| {
                if field.to_string() == "personA_ID" {
                    Ok(vec![
                        doc(
                            "r1",
                            json!({"personA_ID": "p1", "personB_ID": "gone", "type": "Friend"}),
                        ),
                        doc(
                            "r2",
                            json!({"personA_ID": "p1", "personB_ID": "p2", "type": "Sibling"}),
                        ),
                    ])
                } else {
                    Ok(Vec::new())
                }
            });
        store.expect_get_by_id().returning(|_, id, _| {
            if id.to_string() == "p2" {
                Ok(Some(person_doc("p2", "Bea")))
            } else {
                Ok(None)
            }
        });

        let resolver = AssociationResolver::new(&store);
        let related = resolver
            .relationships_for_person(&scope(), &PersonId::new("p1"))
            .await
            .unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].person.first_name, "Bea");
        assert_eq!(related[0].relationship_id.as_str(), "r2");
    }

    #[tokio::test]
    async fn store_failure_in_primary_phase_propagates() {
        let mut store = MockCollectionStore::new();
        store
            .expect_query_by_equality()
            .returning(|_, _, _, _, _| Err(StoreError::Poisoned));
        store.expect_get_by_ids().times(0);

        let resolver = AssociationResolver::new(&store);
        let err = resolver
            .attendees_for_event(&scope(), &EventId::new("e1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::StoreUnavailable(StoreError::Poisoned)));
    }

    #[tokio::test]
    async fn other_person_lookup_failure_is_not_swallowed() {
        let mut store = MockCollectionStore::new();
        store
            .expect_query_by_equality()
            .returning(|_, field, _, _, _| {
                if field.to_string() == "personB_ID" {
                    Ok(vec![doc(
                        "r1",
                        json!({"personA_ID": "p9", "personB_ID": "p1", "type": "Parent"}),
                    )])
                } else {
                    Ok(Vec::new())
                }
            });
        store.expect_get_by_id().returning(|_, _, _| {
            Err(StoreError::Timeout {
                operation: "get_by_id",
                timeout_ms: 5,
            })
        });

        let resolver = AssociationResolver::new(&store);
        let err = resolver
            .relationships_for_person(&scope(), &PersonId::new("p1"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
