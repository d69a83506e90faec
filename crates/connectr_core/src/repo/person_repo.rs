//! Person repository.

use super::{owned_record, owned_records};
use crate::error::{CoreError, CoreResult};
use crate::model::{NewPerson, Person, PersonId};
use crate::scope::OwnerScope;
use crate::store::{Collection, CollectionStore};
use log::info;

pub struct PersonRepository<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: CollectionStore + ?Sized> PersonRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Validates, stamps the owner and persists one person.
    ///
    /// # Errors
    /// - `Validation` when first or last name is blank after trimming.
    pub async fn create(&self, scope: &OwnerScope, input: NewPerson) -> CoreResult<PersonId> {
        let fields = input.into_fields()?;
        let id = self
            .store
            .insert(Collection::People, scope.owner(), fields)
            .await?;
        info!("event=person_create module=repo status=ok person_id={id}");
        Ok(PersonId::new(id))
    }

    /// Lists the owner's people in insertion order.
    pub async fn list(&self, scope: &OwnerScope) -> CoreResult<Vec<Person>> {
        let documents = self
            .store
            .list_owned(Collection::People, scope.owner(), None)
            .await?;
        owned_records(scope, Collection::People, documents, Person::from_document)
    }

    pub async fn get(&self, scope: &OwnerScope, id: &PersonId) -> CoreResult<Option<Person>> {
        let document = self
            .store
            .get_by_id(Collection::People, id.as_str(), scope.owner())
            .await?;
        owned_record(scope, Collection::People, document, Person::from_document)
    }

    /// # Errors
    /// - `NotFound` when no person with `id` exists under the owner.
    pub async fn find_by_id(&self, scope: &OwnerScope, id: &PersonId) -> CoreResult<Person> {
        self.get(scope, id)
            .await?
            .ok_or_else(|| CoreError::not_found("person", id))
    }

    /// Batch-fetches people by id. Missing ids are omitted; an empty id set
    /// issues no store call.
    pub async fn find_many(&self, scope: &OwnerScope, ids: &[PersonId]) -> CoreResult<Vec<Person>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let documents = self
            .store
            .get_by_ids(Collection::People, &raw, scope.owner())
            .await?;
        owned_records(scope, Collection::People, documents, Person::from_document)
    }
}
