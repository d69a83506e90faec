//! Relationship repository.
//!
//! Edges are stored once with a directional A/B pair. The two list
//! operations expose each direction as its own single-field query; the
//! resolver merges them into the undirected view.

use super::{owned_records, PersonRepository};
use crate::error::{CoreError, CoreResult};
use crate::model::{fields, PersonId, Relationship, RelationshipId, RelationshipType};
use crate::scope::OwnerScope;
use crate::store::{Collection, CollectionStore};
use log::info;
use serde_json::Value;

pub struct RelationshipRepository<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: CollectionStore + ?Sized> RelationshipRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Stores the edge `person_a_id -> person_b_id`.
    ///
    /// # Errors
    /// - `Validation` when both endpoints are the same person.
    /// - `NotFound` when either endpoint is missing under the owner.
    pub async fn create(
        &self,
        scope: &OwnerScope,
        person_a_id: &PersonId,
        person_b_id: &PersonId,
        kind: RelationshipType,
    ) -> CoreResult<RelationshipId> {
        if person_a_id == person_b_id {
            return Err(CoreError::validation(
                fields::PERSON_B_ID,
                "a person cannot be related to themselves",
            ));
        }
        let people = PersonRepository::new(self.store);
        people.find_by_id(scope, person_a_id).await?;
        people.find_by_id(scope, person_b_id).await?;

        let id = self
            .store
            .insert(
                Collection::Relationships,
                scope.owner(),
                Relationship::fields(person_a_id, person_b_id, kind),
            )
            .await?;
        info!(
            "event=relationship_create module=repo status=ok relationship_id={id} type={kind}"
        );
        Ok(RelationshipId::new(id))
    }

    /// Edges stored with `person_id` on the A side.
    pub async fn list_by_person_a(
        &self,
        scope: &OwnerScope,
        person_id: &PersonId,
    ) -> CoreResult<Vec<Relationship>> {
        self.list_where(scope, fields::PERSON_A_ID, person_id).await
    }

    /// Edges stored with `person_id` on the B side.
    pub async fn list_by_person_b(
        &self,
        scope: &OwnerScope,
        person_id: &PersonId,
    ) -> CoreResult<Vec<Relationship>> {
        self.list_where(scope, fields::PERSON_B_ID, person_id).await
    }

    async fn list_where(
        &self,
        scope: &OwnerScope,
        field: &str,
        person_id: &PersonId,
    ) -> CoreResult<Vec<Relationship>> {
        let documents = self
            .store
            .query_by_equality(
                Collection::Relationships,
                field,
                &Value::String(person_id.as_str().to_string()),
                scope.owner(),
                None,
            )
            .await?;
        owned_records(
            scope,
            Collection::Relationships,
            documents,
            Relationship::from_document,
        )
    }
}
