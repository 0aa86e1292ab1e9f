#![allow(dead_code)]

use std::sync::Arc;

use kinship_core::{
    GuardConfig, MemoryStore, Person, PersonDraft, PersonId, PersonRegistry, PersonStore,
};

pub fn create_test_registry() -> (PersonRegistry, Arc<MemoryStore>) {
    create_registry_with(GuardConfig::default())
}

pub fn create_registry_with(guard: GuardConfig) -> (PersonRegistry, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let registry = PersonRegistry::new(store.clone(), guard);
    (registry, store)
}

pub async fn person(registry: &PersonRegistry, name: &str) -> PersonId {
    registry.create(PersonDraft::named(name)).await.unwrap().id
}

/// Builds the chain `a -> b -> c` and returns the ids in that order.
pub async fn chain(registry: &PersonRegistry) -> (PersonId, PersonId, PersonId) {
    let a = person(registry, "A").await;
    let b = person(registry, "B").await;
    let c = person(registry, "C").await;
    registry.add_edge(&a, &b).await.unwrap();
    registry.add_edge(&b, &c).await.unwrap();
    (a, b, c)
}

pub async fn order_of(store: &MemoryStore, id: &PersonId) -> u32 {
    store.find_by_id(id).await.unwrap().unwrap().order
}

/// Writes a record straight into the store, bypassing the engine.
pub async fn raw_person(
    store: &MemoryStore,
    name: &str,
    parents: &[PersonId],
    children: &[PersonId],
) -> PersonId {
    let mut person = Person::new(Some(name.to_string()));
    person.parents = parents.iter().copied().collect();
    person.children = children.iter().copied().collect();
    store.insert(&person).await.unwrap();
    person.id
}

pub async fn assert_symmetric(store: &MemoryStore) {
    let all = store.find_where(&[]).await.unwrap();
    for person in &all {
        for child in &person.children {
            let child = store.find_by_id(child).await.unwrap().unwrap();
            assert!(
                child.parents.contains(&person.id),
                "{} lists {} as child but not vice versa",
                person.id,
                child.id
            );
        }
        for parent in &person.parents {
            let parent = store.find_by_id(parent).await.unwrap().unwrap();
            assert!(
                parent.children.contains(&person.id),
                "{} lists {} as parent but not vice versa",
                person.id,
                parent.id
            );
        }
    }
}

pub async fn assert_monotonic(store: &MemoryStore) {
    for person in store.find_where(&[]).await.unwrap() {
        for child in &person.children {
            let child = store.find_by_id(child).await.unwrap().unwrap();
            assert!(
                person.order > child.order,
                "order({}) = {} is not above order({}) = {}",
                person.id,
                person.order,
                child.id,
                child.order
            );
        }
    }
}
