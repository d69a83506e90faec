//! Connectr use-case service.
//!
//! # Responsibility
//! - Expose the timeline, person and event detail flows over repositories
//!   and the association resolver.
//! - Resolve the owner from the identity provider before any store access.
//!
//! # Invariants
//! - Every method fails with `Unauthenticated` and touches no storage when no
//!   owner is active.
//! - The service holds no per-call state; concurrent calls share only the
//!   store.

use crate::assemble::{EventDetail, PersonDetail, RelatedPerson};
use crate::error::CoreResult;
use crate::model::{
    AttendanceId, Event, EventId, NewEvent, NewPerson, Person, PersonId, RelationshipId,
    RelationshipType,
};
use crate::repo::{AttendanceRepository, EventRepository, PersonRepository, RelationshipRepository};
use crate::resolver::AssociationResolver;
use crate::scope::{IdentityProvider, OwnerScope};
use crate::store::CollectionStore;

/// Use-case facade over one store and one identity source.
pub struct ConnectrService<S, I> {
    store: S,
    identity: I,
}

impl<S: CollectionStore, I: IdentityProvider> ConnectrService<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self { store, identity }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn scope(&self) -> CoreResult<OwnerScope> {
        OwnerScope::resolve(&self.identity)
    }

    pub async fn create_event(&self, input: NewEvent) -> CoreResult<EventId> {
        let scope = self.scope()?;
        EventRepository::new(&self.store).create(&scope, input).await
    }

    /// All events of the owner, newest first.
    pub async fn timeline(&self) -> CoreResult<Vec<Event>> {
        let scope = self.scope()?;
        EventRepository::new(&self.store).list(&scope).await
    }

    pub async fn event(&self, id: &EventId) -> CoreResult<Event> {
        let scope = self.scope()?;
        EventRepository::new(&self.store)
            .find_by_id(&scope, id)
            .await
    }

    pub async fn create_person(&self, input: NewPerson) -> CoreResult<PersonId> {
        let scope = self.scope()?;
        PersonRepository::new(&self.store)
            .create(&scope, input)
            .await
    }

    pub async fn people(&self) -> CoreResult<Vec<Person>> {
        let scope = self.scope()?;
        PersonRepository::new(&self.store).list(&scope).await
    }

    pub async fn person(&self, id: &PersonId) -> CoreResult<Person> {
        let scope = self.scope()?;
        PersonRepository::new(&self.store)
            .find_by_id(&scope, id)
            .await
    }

    /// People whose first name, last name, full name or organization contains
    /// `query` (case-insensitive). A blank query returns everyone.
    pub async fn search_people(&self, query: &str) -> CoreResult<Vec<Person>> {
        let scope = self.scope()?;
        let people = PersonRepository::new(&self.store).list(&scope).await?;
        Ok(people
            .into_iter()
            .filter(|person| person.matches(query))
            .collect())
    }

    pub async fn link_person_to_event(
        &self,
        person_id: &PersonId,
        event_id: &EventId,
    ) -> CoreResult<AttendanceId> {
        let scope = self.scope()?;
        AttendanceRepository::new(&self.store)
            .create(&scope, event_id, person_id)
            .await
    }

    /// Creates a person and links them to `event_id`.
    ///
    /// The event is checked first so a missing event creates no person. The
    /// two writes are not atomic: a store failure on the link leaves the
    /// person in place.
    pub async fn add_new_attendee(
        &self,
        event_id: &EventId,
        input: NewPerson,
    ) -> CoreResult<Person> {
        let scope = self.scope()?;
        EventRepository::new(&self.store)
            .find_by_id(&scope, event_id)
            .await?;

        let people = PersonRepository::new(&self.store);
        let person_id = people.create(&scope, input).await?;
        AttendanceRepository::new(&self.store)
            .create(&scope, event_id, &person_id)
            .await?;
        people.find_by_id(&scope, &person_id).await
    }

    pub async fn create_relationship(
        &self,
        person_a_id: &PersonId,
        person_b_id: &PersonId,
        kind: RelationshipType,
    ) -> CoreResult<RelationshipId> {
        let scope = self.scope()?;
        RelationshipRepository::new(&self.store)
            .create(&scope, person_a_id, person_b_id, kind)
            .await
    }

    pub async fn attendees_for_event(&self, event_id: &EventId) -> CoreResult<Vec<Person>> {
        let scope = self.scope()?;
        AssociationResolver::new(&self.store)
            .attendees_for_event(&scope, event_id)
            .await
    }

    pub async fn events_for_person(&self, person_id: &PersonId) -> CoreResult<Vec<Event>> {
        let scope = self.scope()?;
        AssociationResolver::new(&self.store)
            .events_for_person(&scope, person_id)
            .await
    }

    pub async fn relationships_for_person(
        &self,
        person_id: &PersonId,
    ) -> CoreResult<Vec<RelatedPerson>> {
        let scope = self.scope()?;
        AssociationResolver::new(&self.store)
            .relationships_for_person(&scope, person_id)
            .await
    }

    /// Event plus attendees. `NotFound` when the event is not the owner's.
    pub async fn event_detail(&self, event_id: &EventId) -> CoreResult<EventDetail> {
        let scope = self.scope()?;
        let event = EventRepository::new(&self.store)
            .find_by_id(&scope, event_id)
            .await?;
        let attendees = AssociationResolver::new(&self.store)
            .attendees_for_event(&scope, event_id)
            .await?;
        Ok(EventDetail { event, attendees })
    }

    /// Person plus attended events and relationships. `NotFound` when the
    /// person is not the owner's.
    pub async fn person_detail(&self, person_id: &PersonId) -> CoreResult<PersonDetail> {
        let scope = self.scope()?;
        let person = PersonRepository::new(&self.store)
            .find_by_id(&scope, person_id)
            .await?;
        let resolver = AssociationResolver::new(&self.store);
        let events = resolver.events_for_person(&scope, person_id).await?;
        let relationships = resolver.relationships_for_person(&scope, person_id).await?;
        Ok(PersonDetail {
            person,
            events,
            relationships,
        })
    }
}
