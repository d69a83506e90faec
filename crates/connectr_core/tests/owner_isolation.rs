mod common;

use common::{owner, sqlite_service_on};
use connectr_core::repo::PersonRepository;
use connectr_core::{
    CoreError, MemoryCollectionStore, NewEvent, NewPerson, OwnerScope, RelationshipType,
    SqliteCollectionStore,
};

#[tokio::test]
async fn owners_never_see_each_others_records() {
    let store = SqliteCollectionStore::open_in_memory().unwrap();
    let alice = sqlite_service_on(store.clone(), "alice");
    let bob = sqlite_service_on(store, "bob");

    let event_id = alice.create_event(NewEvent::new("Private")).await.unwrap();
    let ada = alice
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    alice.link_person_to_event(&ada, &event_id).await.unwrap();

    assert!(bob.timeline().await.unwrap().is_empty());
    assert!(bob.people().await.unwrap().is_empty());
    assert!(bob.search_people("ada").await.unwrap().is_empty());
    assert_eq!(alice.timeline().await.unwrap().len(), 1);
}

#[tokio::test]
async fn guessed_ids_from_another_owner_are_not_found() {
    let store = SqliteCollectionStore::open_in_memory().unwrap();
    let alice = sqlite_service_on(store.clone(), "alice");
    let bob = sqlite_service_on(store, "bob");

    let event_id = alice.create_event(NewEvent::new("Private")).await.unwrap();
    let ada = alice
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    alice.link_person_to_event(&ada, &event_id).await.unwrap();
    let charles = alice
        .create_person(NewPerson::new("Charles", "Babbage"))
        .await
        .unwrap();
    alice
        .create_relationship(&ada, &charles, RelationshipType::Colleague)
        .await
        .unwrap();

    assert!(bob.person(&ada).await.unwrap_err().is_not_found());
    assert!(bob.event(&event_id).await.unwrap_err().is_not_found());
    assert!(bob.event_detail(&event_id).await.unwrap_err().is_not_found());
    assert!(bob.attendees_for_event(&event_id).await.unwrap().is_empty());
    assert!(bob.events_for_person(&ada).await.unwrap().is_empty());
    assert!(bob.relationships_for_person(&ada).await.unwrap().is_empty());
    assert!(bob.relationships_for_person(&charles).await.unwrap().is_empty());
    assert!(bob.person_detail(&ada).await.unwrap_err().is_not_found());
    assert_eq!(alice.relationships_for_person(&ada).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_calls_from_two_owners_stay_independent() {
    let store = SqliteCollectionStore::open_in_memory().unwrap();
    let alice = sqlite_service_on(store.clone(), "alice");
    let bob = sqlite_service_on(store, "bob");

    alice.create_event(NewEvent::new("Alice event")).await.unwrap();
    alice
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    bob.create_person(NewPerson::new("Grace", "Hopper"))
        .await
        .unwrap();
    bob.create_person(NewPerson::new("Alan", "Turing"))
        .await
        .unwrap();

    let (alice_timeline, alice_people, bob_timeline, bob_people) = tokio::join!(
        alice.timeline(),
        alice.people(),
        bob.timeline(),
        bob.people()
    );

    assert_eq!(alice_timeline.unwrap().len(), 1);
    assert_eq!(alice_people.unwrap().len(), 1);
    assert!(bob_timeline.unwrap().is_empty());
    let bob_people = bob_people.unwrap();
    assert_eq!(bob_people.len(), 2);
    assert!(bob_people
        .iter()
        .all(|person| person.owner_id.as_str() == "bob"));
}

#[tokio::test]
async fn links_cannot_cross_owners() {
    let store = SqliteCollectionStore::open_in_memory().unwrap();
    let alice = sqlite_service_on(store.clone(), "alice");
    let bob = sqlite_service_on(store, "bob");

    let alice_event = alice.create_event(NewEvent::new("Private")).await.unwrap();
    let alice_person = alice
        .create_person(NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    let bob_person = bob
        .create_person(NewPerson::new("Grace", "Hopper"))
        .await
        .unwrap();

    let err = bob
        .link_person_to_event(&bob_person, &alice_event)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { kind: "event", .. }));

    let err = bob
        .create_relationship(&bob_person, &alice_person, RelationshipType::Friend)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert!(alice
        .relationships_for_person(&alice_person)
        .await
        .unwrap()
        .is_empty());
    assert!(alice
        .attendees_for_event(&alice_event)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn batch_fetch_drops_ids_owned_by_someone_else() {
    let store = MemoryCollectionStore::new();
    let alice = OwnerScope::new(owner("alice"));
    let bob = OwnerScope::new(owner("bob"));
    let people = PersonRepository::new(&store);

    let mine = people
        .create(&alice, NewPerson::new("Ada", "Lovelace"))
        .await
        .unwrap();
    let theirs = people
        .create(&bob, NewPerson::new("Grace", "Hopper"))
        .await
        .unwrap();

    let found = people
        .find_many(&alice, &[mine.clone(), theirs])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, mine);
}
