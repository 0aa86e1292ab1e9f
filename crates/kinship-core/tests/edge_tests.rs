mod common;

use common::*;
use kinship_core::{ErrorKind, GuardConfig, PersonId, PersonStore};

#[tokio::test]
async fn test_add_edge_is_symmetric() {
    let (registry, store) = create_test_registry();
    let (a, b, c) = chain(&registry).await;

    let a_rec = registry.get(&a).await.unwrap();
    let b_rec = registry.get(&b).await.unwrap();
    let c_rec = registry.get(&c).await.unwrap();

    assert!(a_rec.children.contains(&b));
    assert!(b_rec.parents.contains(&a));
    assert!(b_rec.children.contains(&c));
    assert!(c_rec.parents.contains(&b));
    assert_symmetric(&store).await;
}

#[tokio::test]
async fn test_self_edge_is_rejected_without_changes() {
    let (registry, store) = create_test_registry();
    let a = person(&registry, "A").await;
    let before = registry.get(&a).await.unwrap();

    let err = registry.add_edge(&a, &a).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SameIdentifier);

    assert_eq!(registry.get(&a).await.unwrap(), before);
    assert_symmetric(&store).await;
}

#[tokio::test]
async fn test_missing_endpoint_is_not_found() {
    let (registry, _store) = create_test_registry();
    let a = person(&registry, "A").await;
    let ghost = PersonId::generate();

    assert_eq!(
        registry.add_edge(&a, &ghost).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        registry.add_edge(&ghost, &a).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(registry.get(&a).await.unwrap().children.is_empty());
}

#[tokio::test]
async fn test_duplicate_edge_is_rejected() {
    let (registry, _store) = create_test_registry();
    let a = person(&registry, "A").await;
    let b = person(&registry, "B").await;
    registry.add_edge(&a, &b).await.unwrap();

    let err = registry.add_edge(&a, &b).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEdge);
    assert_eq!(registry.get(&a).await.unwrap().children.len(), 1);
}

#[tokio::test]
async fn test_half_present_edge_counts_as_duplicate() {
    let (registry, store) = create_test_registry();
    let b = raw_person(&store, "B", &[], &[]).await;
    let a = raw_person(&store, "A", &[], &[b]).await;

    let err = registry.add_edge(&a, &b).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEdge);
}

#[tokio::test]
async fn test_positioned_parent_below_child_is_order_violation() {
    let (registry, store) = create_test_registry();
    let (a, _b, _c) = chain(&registry).await;
    let x = person(&registry, "X").await;
    let y = person(&registry, "Y").await;
    registry.add_edge(&x, &y).await.unwrap();

    assert_eq!(order_of(&store, &y).await, 1);
    assert_eq!(order_of(&store, &a).await, 3);

    let err = registry.add_edge(&y, &a).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OrderViolation);
    assert!(!registry.get(&y).await.unwrap().children.contains(&a));
}

#[tokio::test]
async fn test_unconnected_parent_is_always_allowed() {
    let (registry, store) = create_test_registry();
    let (a, _b, _c) = chain(&registry).await;
    let z = person(&registry, "Z").await;

    assert!(order_of(&store, &z).await < order_of(&store, &a).await);
    registry.add_edge(&z, &a).await.unwrap();

    assert_eq!(order_of(&store, &z).await, 4);
    assert_monotonic(&store).await;
}

#[tokio::test]
async fn test_cycle_among_unordered_nodes_is_detected() {
    let (registry, store) = create_test_registry();
    // a -> b written out of band, ordering never computed
    let b = raw_person(&store, "B", &[], &[]).await;
    let a = raw_person(&store, "A", &[], &[b]).await;
    let mut b_rec = store.find_by_id(&b).await.unwrap().unwrap();
    b_rec.parents.insert(a);
    store.update_by_id(&b, &b_rec).await.unwrap();

    let err = registry.add_edge(&b, &a).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OrderViolation);
    assert!(!registry.get(&b).await.unwrap().children.contains(&a));
}

#[tokio::test]
async fn test_cycle_detection_walks_several_generations() {
    let (registry, store) = create_test_registry();
    let d = raw_person(&store, "D", &[], &[]).await;
    let c = raw_person(&store, "C", &[], &[d]).await;
    let b = raw_person(&store, "B", &[], &[c]).await;
    let a = raw_person(&store, "A", &[], &[b]).await;
    for (child, parent) in [(b, a), (c, b), (d, c)] {
        let mut rec = store.find_by_id(&child).await.unwrap().unwrap();
        rec.parents.insert(parent);
        store.update_by_id(&child, &rec).await.unwrap();
    }

    let err = registry.add_edge(&d, &a).await.unwrap_err();
    assert!(matches!(err, kinship_core::Error::CycleDetected { .. }));
}

#[tokio::test]
async fn test_heuristic_only_guard_misses_unordered_cycle() {
    let (registry, store) = create_registry_with(GuardConfig {
        detect_cycles: false,
    });
    let b = raw_person(&store, "B", &[], &[]).await;
    let a = raw_person(&store, "A", &[], &[b]).await;
    let mut b_rec = store.find_by_id(&b).await.unwrap().unwrap();
    b_rec.parents.insert(a);
    store.update_by_id(&b, &b_rec).await.unwrap();

    // Both at order 0: the order comparison cannot see the loop.
    registry.add_edge(&b, &a).await.unwrap();
    assert!(registry.get(&b).await.unwrap().children.contains(&a));
}

#[tokio::test]
async fn test_remove_edge_is_symmetric_and_reorders() {
    let (registry, store) = create_test_registry();
    let (a, b, c) = chain(&registry).await;

    registry.remove_edge(&b, &c).await.unwrap();

    assert!(!registry.get(&b).await.unwrap().children.contains(&c));
    assert!(!registry.get(&c).await.unwrap().parents.contains(&b));
    assert_eq!(order_of(&store, &c).await, 1);
    assert_eq!(order_of(&store, &b).await, 1);
    assert_eq!(order_of(&store, &a).await, 2);
    assert_symmetric(&store).await;
}

#[tokio::test]
async fn test_remove_absent_edge_is_ok_and_changes_nothing() {
    let (registry, store) = create_test_registry();
    let (a, _b, c) = chain(&registry).await;
    let before = store.find_where(&[]).await.unwrap();

    registry.remove_edge(&a, &c).await.unwrap();
    registry.remove_edge(&a, &c).await.unwrap();

    assert_eq!(store.find_where(&[]).await.unwrap(), before);
}

#[tokio::test]
async fn test_remove_edge_with_missing_record_is_not_found() {
    let (registry, _store) = create_test_registry();
    let a = person(&registry, "A").await;

    let err = registry.remove_edge(&a, &PersonId::generate()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = registry.remove_edge(&a, &a).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SameIdentifier);
}

#[tokio::test]
async fn test_symmetry_holds_across_mixed_mutations() {
    let (registry, store) = create_test_registry();
    let mut ids = Vec::new();
    for name in ["g1", "g2", "p1", "p2", "k1", "k2", "k3"] {
        ids.push(person(&registry, name).await);
    }
    let edges = [(0, 2), (1, 2), (0, 3), (2, 4), (2, 5), (3, 5), (3, 6)];
    for (p, c) in edges {
        registry.add_edge(&ids[p], &ids[c]).await.unwrap();
        assert_symmetric(&store).await;
    }

    registry.remove_edge(&ids[2], &ids[5]).await.unwrap();
    assert_symmetric(&store).await;
    registry.delete(&ids[3]).await.unwrap();
    assert_symmetric(&store).await;
    assert_monotonic(&store).await;
}

#[tokio::test]
async fn test_concurrent_edge_additions_are_serialized() {
    let (registry, store) = create_test_registry();
    let registry = std::sync::Arc::new(registry);
    let root = person(&registry, "root").await;

    let mut kids = Vec::new();
    for i in 0..8 {
        kids.push(person(&registry, &format!("kid{}", i)).await);
    }

    let handles: Vec<_> = kids
        .iter()
        .map(|kid| {
            let registry = std::sync::Arc::clone(&registry);
            let kid = *kid;
            tokio::spawn(async move { registry.add_edge(&root, &kid).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(registry.get(&root).await.unwrap().children.len(), 8);
    assert_eq!(order_of(&store, &root).await, 2);
    assert_symmetric(&store).await;
}

#[tokio::test]
async fn test_failed_child_write_leaves_no_half_edge() {
    let (registry, store) = create_test_registry();
    let a = person(&registry, "A").await;
    let b = person(&registry, "B").await;

    store.reject_updates_of(b, true).await;
    let err = registry.add_edge(&a, &b).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    assert!(!registry.get(&a).await.unwrap().children.contains(&b));
    assert!(!registry.get(&b).await.unwrap().parents.contains(&a));
    assert_symmetric(&store).await;

    // once the store recovers the same edge can be added
    store.reject_updates_of(b, false).await;
    registry.add_edge(&a, &b).await.unwrap();
    assert!(registry.get(&b).await.unwrap().parents.contains(&a));
    assert_symmetric(&store).await;
}
