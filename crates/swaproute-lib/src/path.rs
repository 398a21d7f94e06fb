use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;

use crate::graph::GraphSnapshot;
use crate::token::TokenId;

/// Ordered swap path from source to target inclusive.
///
/// An empty route means "no route found"; a single-token route is the trivial
/// self-route.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Route {
    pub tokens: Vec<TokenId>,
    pub total_weight: f64,
}

impl Route {
    /// The "no route" outcome.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of trades in the route.
    pub fn hop_count(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }
}

/// Find the minimum total-weight route from `source` to `target`.
///
/// Unknown tokens and unreachable targets both yield [`Route::empty`]. The
/// search always expands the cheapest unvisited token, breaking cost ties by
/// lexicographic token id, and only relaxes an edge on a strictly lower cost.
/// Repeated calls on the same snapshot therefore return the same route even
/// when several paths share the minimum weight.
pub fn best_route(snapshot: &GraphSnapshot, source: &str, target: &str) -> Route {
    let (Some(start), Some(goal)) = (snapshot.token(source), snapshot.token(target)) else {
        return Route::empty();
    };
    let start = start.id.as_str();
    let goal = goal.id.as_str();

    if start == goal {
        return Route {
            tokens: vec![TokenId::from(start)],
            total_weight: 0.0,
        };
    }

    let mut distances: HashMap<&str, f64> = HashMap::new();
    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut finalized: HashSet<&str> = HashSet::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        if !finalized.insert(entry.token) {
            continue;
        }

        if entry.token == goal {
            return Route {
                tokens: reconstruct_path(&parents, start, goal),
                total_weight: entry.cost.0,
            };
        }

        for edge in snapshot.neighbours(entry.token) {
            let next = edge.target.as_str();
            if finalized.contains(next) {
                continue;
            }

            // Sums of large finite weights may saturate to infinity; a token
            // with no recorded distance is still relaxed so it stays reachable.
            let next_cost = entry.cost.0 + edge.weight;
            let improves = distances.get(next).is_none_or(|&known| next_cost < known);
            if improves {
                distances.insert(next, next_cost);
                parents.insert(next, entry.token);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    Route::empty()
}

fn reconstruct_path(parents: &HashMap<&str, &str>, start: &str, goal: &str) -> Vec<TokenId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(token) = current {
        path.push(TokenId::from(token));
        if token == start {
            break;
        }
        current = parents.get(token).copied();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry<'a> {
    token: &'a str,
    cost: FloatOrd,
}

impl<'a> QueueEntry<'a> {
    fn new(token: &'a str, cost: f64) -> Self {
        Self {
            token,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap pops the lowest cost, then the
        // lexicographically smallest token id.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.token.cmp(self.token))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::token::Token;

    fn snapshot(ids: &[&str], edges: Vec<Edge>) -> GraphSnapshot {
        let tokens = ids
            .iter()
            .map(|id| Token::new(*id, id.to_uppercase(), *id));
        GraphSnapshot::build(1, tokens, edges).expect("valid snapshot")
    }

    fn ids(route: &Route) -> Vec<&str> {
        route.tokens.iter().map(TokenId::as_str).collect()
    }

    #[test]
    fn queue_pops_lowest_cost_then_smallest_id() {
        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry::new("c", 1.0));
        queue.push(QueueEntry::new("b", 1.0));
        queue.push(QueueEntry::new("a", 2.0));

        let order: Vec<&str> = std::iter::from_fn(|| queue.pop().map(|e| e.token)).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn saturating_weights_keep_target_reachable() {
        let graph = snapshot(
            &["a", "b", "c"],
            vec![
                Edge::new("a", "b", f64::MAX),
                Edge::new("b", "c", f64::MAX),
            ],
        );

        let route = best_route(&graph, "a", "c");
        assert_eq!(ids(&route), vec!["a", "b", "c"]);
        assert_eq!(route.total_weight, f64::INFINITY);
    }

    #[test]
    fn cheaper_longer_path_beats_direct_edge() {
        let graph = snapshot(
            &["a", "b", "c"],
            vec![
                Edge::new("a", "c", 1.0),
                Edge::new("a", "b", 0.2),
                Edge::new("b", "c", 0.3),
            ],
        );

        let route = best_route(&graph, "a", "c");
        assert_eq!(ids(&route), vec!["a", "b", "c"]);
        assert!((route.total_weight - 0.5).abs() < 1e-12);
        assert_eq!(route.hop_count(), 2);
    }

    #[test]
    fn edges_are_directed() {
        let graph = snapshot(&["a", "b"], vec![Edge::new("a", "b", 0.1)]);
        assert!(best_route(&graph, "b", "a").is_empty());
    }

    #[test]
    fn equal_weight_tie_prefers_lexicographically_smaller_hop() {
        let graph = snapshot(
            &["src", "mid-b", "mid-a", "dst"],
            vec![
                Edge::new("src", "mid-b", 1.0),
                Edge::new("src", "mid-a", 1.0),
                Edge::new("mid-b", "dst", 1.0),
                Edge::new("mid-a", "dst", 1.0),
            ],
        );

        let route = best_route(&graph, "src", "dst");
        assert_eq!(ids(&route), vec!["src", "mid-a", "dst"]);
    }

    #[test]
    fn zero_weight_cycle_terminates() {
        let graph = snapshot(
            &["a", "b", "c"],
            vec![
                Edge::new("a", "b", 0.0),
                Edge::new("b", "a", 0.0),
                Edge::new("b", "c", 0.0),
            ],
        );

        let route = best_route(&graph, "a", "c");
        assert_eq!(ids(&route), vec!["a", "b", "c"]);
        assert_eq!(route.total_weight, 0.0);
    }

    #[test]
    fn self_route_is_single_token() {
        let graph = snapshot(&["a"], vec![]);
        let route = best_route(&graph, "a", "a");
        assert_eq!(ids(&route), vec!["a"]);
        assert_eq!(route.hop_count(), 0);
    }

    #[test]
    fn unknown_endpoints_yield_empty_route() {
        let graph = snapshot(&["a", "b"], vec![Edge::new("a", "b", 0.1)]);
        assert!(best_route(&graph, "x", "b").is_empty());
        assert!(best_route(&graph, "a", "x").is_empty());
        assert!(best_route(&graph, "x", "x").is_empty());
    }
}
