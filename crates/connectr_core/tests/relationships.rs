mod common;

use common::{memory_service, owner, sqlite_service};
use connectr_core::{Collection, CoreError, Document, NewPerson, PersonId, RelationshipType};
use serde_json::json;

#[tokio::test]
async fn relationship_is_visible_from_both_endpoints_with_the_same_type() {
    let service = sqlite_service("u1");
    let ada = service
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    let byron = service
        .create_person(NewPerson::new("George", "Byron"))
        .await
        .unwrap();
    let edge = service
        .create_relationship(&ada, &byron, RelationshipType::Child)
        .await
        .unwrap();

    let from_ada = service.relationships_for_person(&ada).await.unwrap();
    let from_byron = service.relationships_for_person(&byron).await.unwrap();

    assert_eq!(from_ada.len(), 1);
    assert_eq!(from_ada[0].person.id, byron);
    assert_eq!(from_ada[0].kind, RelationshipType::Child);
    assert_eq!(from_ada[0].relationship_id, edge);

    assert_eq!(from_byron.len(), 1);
    assert_eq!(from_byron[0].person.id, ada);
    assert_eq!(from_byron[0].kind, RelationshipType::Child);
    assert_eq!(from_byron[0].relationship_id, edge);
}

#[tokio::test]
async fn subject_edges_come_before_object_edges() {
    let service = sqlite_service("u1");
    let ada = service
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    let charles = service
        .create_person(NewPerson::new("Charles", "Babbage"))
        .await
        .unwrap();
    let mary = service
        .create_person(NewPerson::new("Mary", "Somerville"))
        .await
        .unwrap();
    service
        .create_relationship(&mary, &ada, RelationshipType::Friend)
        .await
        .unwrap();
    service
        .create_relationship(&ada, &charles, RelationshipType::Colleague)
        .await
        .unwrap();

    let related = service.relationships_for_person(&ada).await.unwrap();
    let others: Vec<_> = related.iter().map(|edge| edge.person.id.clone()).collect();
    assert_eq!(others, vec![charles, mary]);
}

#[tokio::test]
async fn pair_stored_in_both_directions_is_reported_twice() {
    let service = sqlite_service("u1");
    let ada = service
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    let charles = service
        .create_person(NewPerson::new("Charles", "Babbage"))
        .await
        .unwrap();
    service
        .create_relationship(&ada, &charles, RelationshipType::Friend)
        .await
        .unwrap();
    service
        .create_relationship(&charles, &ada, RelationshipType::Friend)
        .await
        .unwrap();

    let related = service.relationships_for_person(&ada).await.unwrap();
    assert_eq!(related.len(), 2);
    assert!(related.iter().all(|edge| edge.person.id == charles));
    assert_ne!(related[0].relationship_id, related[1].relationship_id);
}

#[tokio::test]
async fn self_relationship_is_rejected() {
    let service = sqlite_service("u1");
    let ada = service
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();

    let err = service
        .create_relationship(&ada, &ada, RelationshipType::Other)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation { .. }));
    assert!(service.relationships_for_person(&ada).await.unwrap().is_empty());
}

#[tokio::test]
async fn relationship_to_missing_person_is_not_found() {
    let service = sqlite_service("u1");
    let ada = service
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();

    let err = service
        .create_relationship(&ada, &PersonId::new("ghost"), RelationshipType::Friend)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn dangling_edges_are_skipped() {
    let service = memory_service("u1");
    let ada = service
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    let charles = service
        .create_person(NewPerson::new("Charles", "Babbage"))
        .await
        .unwrap();
    service
        .create_relationship(&ada, &charles, RelationshipType::Colleague)
        .await
        .unwrap();
    // Written by another client whose person was later removed.
    service
        .store()
        .put_document(
            Collection::Relationships,
            Document {
                id: "r-dangling".to_string(),
                owner_id: owner("u1"),
                created_at_ms: 1_700_000_000_000,
                fields: json!({
                    "personA_ID": "removed",
                    "personB_ID": ada.as_str(),
                    "type": "Sibling",
                })
                .as_object()
                .cloned()
                .unwrap(),
            },
        )
        .await;

    let related = service.relationships_for_person(&ada).await.unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].person.id, charles);
}

#[test]
fn relationship_type_parses_case_insensitively() {
    assert_eq!(
        "partner".parse::<RelationshipType>().unwrap(),
        RelationshipType::Partner
    );
    assert!("nemesis".parse::<RelationshipType>().is_err());
}
