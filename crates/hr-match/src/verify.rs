use std::collections::{BTreeMap, BTreeSet};

use hr_core::VertexId;
use hr_graph::BipartiteGraph;

use crate::matching::Matching;

/// Pairs `(proposer, receiver)` that would both rather be matched together.
///
/// `(a, b)` blocks when `a` prefers `b` to its partner (or is unmatched) and
/// `b` either has spare capacity or prefers `a` to its worst occupant.
/// Pairs come out in proposer declaration order, then in `a`'s list order.
pub fn blocking_pairs(graph: &BipartiteGraph, matching: &Matching) -> Vec<(VertexId, VertexId)> {
    // rank of the worst occupant of every full receiver, None while spare
    let mut worst: BTreeMap<&VertexId, Option<usize>> = BTreeMap::new();
    for b in graph.receivers() {
        let upper = graph.upper_quota(b).unwrap_or(0);
        let entry = if matching.occupancy(b) < upper {
            None
        } else {
            Some(
                matching
                    .occupants(b)
                    .filter_map(|a| graph.rank(b, a))
                    .max()
                    .unwrap_or(0),
            )
        };
        worst.insert(b, entry);
    }

    let mut pairs = Vec::new();
    for a in graph.proposers() {
        let list = graph.preferences(a);
        let cutoff = matching
            .partner(a)
            .and_then(|partner| graph.rank(a, partner))
            .unwrap_or(list.len());
        for b in &list[..cutoff] {
            let blocks = match worst.get(b).copied().flatten() {
                None => true,
                Some(worst_rank) => graph.rank(b, a).map_or(false, |rank| rank < worst_rank),
            };
            if blocks {
                pairs.push((a.clone(), b.clone()));
            }
        }
    }
    tracing::debug!(blocking = pairs.len(), "verified matching");
    pairs
}

/// Returns whether `matching` admits no blocking pair in `graph`.
pub fn is_stable(graph: &BipartiteGraph, matching: &Matching) -> bool {
    blocking_pairs(graph, matching).is_empty()
}

/// Distinct proposers taking part in at least one blocking pair.
pub fn blocking_residents(pairs: &[(VertexId, VertexId)]) -> BTreeSet<VertexId> {
    pairs.iter().map(|(a, _)| a.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_core::Quota;
    use hr_graph::GraphBuilder;

    fn graph() -> BipartiteGraph {
        GraphBuilder::new()
            .proposer("a1", Quota::unit())
            .proposer("a2", Quota::unit())
            .receiver("b1", Quota::unit())
            .receiver("b2", Quota::unit())
            .preferences("a1", ["b1", "b2"])
            .preferences("a2", ["b1"])
            .preferences("b1", ["a1", "a2"])
            .preferences("b2", ["a1"])
            .build()
            .unwrap()
    }

    #[test]
    fn popular_matching_of_scenario_is_blocked_once() {
        let graph = graph();
        let matching = Matching::from_pairs(
            &graph,
            [("a1".into(), "b2".into()), ("a2".into(), "b1".into())],
        )
        .unwrap();
        let pairs = blocking_pairs(&graph, &matching);
        assert_eq!(pairs, vec![(VertexId::from("a1"), VertexId::from("b1"))]);
        assert!(!is_stable(&graph, &matching));
        assert_eq!(blocking_residents(&pairs).len(), 1);
    }

    #[test]
    fn empty_matching_is_blocked_by_every_edge() {
        let graph = graph();
        let pairs = blocking_pairs(&graph, &Matching::new());
        assert_eq!(pairs.len(), graph.edge_count());
        assert_eq!(blocking_residents(&pairs).len(), 2);
    }
}
