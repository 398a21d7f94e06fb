use std::path::PathBuf;

use swaproute_lib::{Edge, Token};

#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Tokens `a`, `b` and `c` with upper-case names and symbols.
#[allow(dead_code)]
pub fn abc_tokens() -> Vec<Token> {
    ["a", "b", "c"]
        .into_iter()
        .map(|id| Token::new(id, id.to_uppercase(), id.to_uppercase()))
        .collect()
}

/// The `a -> b -> c` chain used by most end-to-end checks.
#[allow(dead_code)]
pub fn abc_edges() -> Vec<Edge> {
    vec![Edge::new("a", "b", 0.1), Edge::new("b", "c", 0.2)]
}
