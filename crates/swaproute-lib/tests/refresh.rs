use std::sync::Arc;

use swaproute_lib::{
    best_route, default_token_ids, parse_token_ids, plan_route, BuildError, EdgeFile, Error,
    FileProvider, GraphStore, RouteRequest, Refresher, TokenId,
};

mod common;

use common::fixtures_dir;

fn fixture_refresher(ids: Vec<TokenId>, edges_file: &str) -> Refresher {
    Refresher::new(
        Box::new(FileProvider::new(fixtures_dir().join("market_tokens.json"))),
        Box::new(EdgeFile::new(fixtures_dir().join(edges_file))),
        ids,
        Arc::new(GraphStore::new()),
    )
}

#[test]
fn fixture_refresh_publishes_default_tokens() {
    let refresher = fixture_refresher(default_token_ids(), "edges.json");
    let outcome = refresher.refresh_now().expect("refresh succeeds");

    assert_eq!(outcome.version, 1);
    assert_eq!(outcome.tokens, 3);
    assert_eq!(outcome.edges, 3);

    let snapshot = refresher.store().current();
    assert!(!snapshot.contains("dogecoin"));

    let route = best_route(&snapshot, "bitcoin", "litecoin");
    let ids: Vec<&str> = route.tokens.iter().map(TokenId::as_str).collect();
    assert_eq!(ids, vec!["bitcoin", "ethereum", "litecoin"]);
    assert!((route.total_weight - 0.3).abs() < 1e-9);
}

#[test]
fn repeated_refresh_bumps_version() {
    let refresher = fixture_refresher(default_token_ids(), "edges.json");
    for expected in 1..=3 {
        let outcome = refresher.refresh_now().expect("refresh succeeds");
        assert_eq!(outcome.version, expected);
    }
    assert_eq!(refresher.store().version(), 3);
}

#[test]
fn dangling_edge_file_keeps_last_good_snapshot() {
    let store = Arc::new(GraphStore::new());
    let good = Refresher::new(
        Box::new(FileProvider::new(fixtures_dir().join("market_tokens.json"))),
        Box::new(EdgeFile::new(fixtures_dir().join("edges.json"))),
        default_token_ids(),
        Arc::clone(&store),
    );
    good.refresh_now().expect("refresh succeeds");

    let bad = Refresher::new(
        Box::new(FileProvider::new(fixtures_dir().join("market_tokens.json"))),
        Box::new(EdgeFile::new(fixtures_dir().join("edges_dangling.json"))),
        default_token_ids(),
        Arc::clone(&store),
    );
    let error = bad.refresh_now().expect_err("solana is not tracked");
    assert!(matches!(
        error,
        Error::Build(BuildError::DanglingEdge { ref missing, .. }) if missing.as_str() == "solana"
    ));

    assert_eq!(store.version(), 1);
    assert_eq!(store.current().edge_count(), 3);
}

#[test]
fn isolated_token_has_no_route() {
    let refresher = fixture_refresher(
        parse_token_ids("bitcoin,ethereum,litecoin,dogecoin"),
        "edges.json",
    );
    refresher.refresh_now().expect("refresh succeeds");
    let snapshot = refresher.store().current();

    assert!(best_route(&snapshot, "bitcoin", "dogecoin").is_empty());
    let error = plan_route(&snapshot, &RouteRequest::new("bitcoin", "dogecoin"))
        .expect_err("dogecoin has no pools");
    assert!(matches!(error, Error::RouteNotFound { .. }));
    assert_eq!(
        refresher.latest_quotes()[&TokenId::from("dogecoin")].symbol,
        "doge"
    );
}
