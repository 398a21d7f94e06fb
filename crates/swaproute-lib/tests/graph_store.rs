use std::sync::Arc;

use swaproute_lib::{best_route, BuildError, Edge, GraphStore, Token, TokenId};

mod common;

use common::{abc_edges, abc_tokens};

fn route_ids(store: &GraphStore, from: &str, to: &str) -> Vec<String> {
    best_route(&store.current(), from, to)
        .tokens
        .into_iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

#[test]
fn two_hop_route_sums_weights() {
    let store = GraphStore::new();
    store.refresh(abc_tokens(), abc_edges()).expect("refresh");

    let route = best_route(&store.current(), "a", "c");
    assert_eq!(
        route.tokens,
        vec![TokenId::from("a"), TokenId::from("b"), TokenId::from("c")]
    );
    assert!((route.total_weight - 0.3).abs() < 1e-9);
}

#[test]
fn removing_an_edge_disconnects_the_route() {
    let store = GraphStore::new();
    store.refresh(abc_tokens(), abc_edges()).expect("refresh");
    store
        .refresh(abc_tokens(), vec![Edge::new("a", "b", 0.1)])
        .expect("refresh without b -> c");

    assert!(route_ids(&store, "a", "c").is_empty());
    assert_eq!(store.version(), 2);
}

#[test]
fn dangling_edge_keeps_previous_version_and_content() {
    let store = GraphStore::new();
    let before = store.refresh(abc_tokens(), abc_edges()).expect("refresh");

    let mut edges = abc_edges();
    edges.push(Edge::new("d", "a", 0.5));
    let error = store.refresh(abc_tokens(), edges).expect_err("d is unknown");
    assert!(matches!(
        error,
        BuildError::DanglingEdge { ref missing, .. } if missing.as_str() == "d"
    ));

    let after = store.current();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.version(), 1);
    assert_eq!(route_ids(&store, "a", "c"), vec!["a", "b", "c"]);
}

#[test]
fn versions_count_only_successful_refreshes() {
    let store = GraphStore::new();
    for expected in 1..=3 {
        store.refresh(abc_tokens(), abc_edges()).expect("refresh");
        assert_eq!(store.version(), expected);
        let _ = store.refresh(abc_tokens(), vec![Edge::new("a", "zz", 1.0)]);
        assert_eq!(store.version(), expected);
    }
}

#[test]
fn list_tokens_reflects_latest_refresh() {
    let store = GraphStore::new();
    assert!(store.list_tokens().is_empty());

    store.refresh(abc_tokens(), abc_edges()).expect("refresh");
    let mut ids = store.list_tokens();
    ids.sort();
    assert_eq!(
        ids,
        vec![TokenId::from("a"), TokenId::from("b"), TokenId::from("c")]
    );

    store
        .refresh(vec![Token::new("z", "Zeta", "Z")], Vec::new())
        .expect("refresh");
    assert_eq!(store.list_tokens(), vec![TokenId::from("z")]);
}

#[test]
fn self_route_and_absent_tokens() {
    let store = GraphStore::new();
    assert!(route_ids(&store, "a", "a").is_empty());

    store.refresh(abc_tokens(), abc_edges()).expect("refresh");
    assert_eq!(route_ids(&store, "b", "b"), vec!["b"]);
    assert!(route_ids(&store, "a", "nope").is_empty());
    assert!(route_ids(&store, "c", "a").is_empty());
}

#[test]
fn tied_routes_are_deterministic() {
    let tokens: Vec<Token> = ["s", "x", "y", "t"]
        .into_iter()
        .map(|id| Token::new(id, id, id))
        .collect();
    // Same edges, two insertion orders.
    let forward = vec![
        Edge::new("s", "x", 1.0),
        Edge::new("s", "y", 1.0),
        Edge::new("x", "t", 1.0),
        Edge::new("y", "t", 1.0),
    ];
    let mut backward = forward.clone();
    backward.reverse();

    let store = GraphStore::new();
    store.refresh(tokens.clone(), forward).expect("refresh");
    let first = route_ids(&store, "s", "t");
    for _ in 0..10 {
        assert_eq!(route_ids(&store, "s", "t"), first);
    }

    store.refresh(tokens, backward).expect("refresh");
    assert_eq!(route_ids(&store, "s", "t"), first);
    assert_eq!(first, vec!["s", "x", "t"]);
}
