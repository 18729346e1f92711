use hr_core::VertexId;
use hr_graph::BipartiteGraph;

use crate::matching::Matching;

/// Greedily extends `matching` without creating justified envy.
///
/// An unmatched proposer `r` takes a receiver `h` from its list when `h` has
/// spare capacity and [`has_envy`] finds no complaint against the move.
/// Proposers already holding a receiver are never moved: a proposer holds at
/// most one receiver, so only unmatched proposers acquire edges. Proposers are
/// visited in declaration order and each list from best to worst; passes
/// repeat until one adds nothing, so saturating twice changes nothing.
///
/// If `matching` has no justified envy, neither has the result.
pub fn saturate(graph: &BipartiteGraph, matching: &Matching) -> Matching {
    let mut result = matching.clone();
    let mut passes = 0usize;
    loop {
        passes += 1;
        let mut added = 0usize;
        for r in graph.proposers() {
            if result.is_matched(r) {
                continue;
            }
            let choice = graph.preferences(r).iter().find(|h| {
                let upper = graph.upper_quota(h).unwrap_or(0);
                result.occupancy(h) < upper && !has_envy(graph, &result, r, h)
            });
            if let Some(h) = choice {
                tracing::trace!(proposer = %r, receiver = %h, "saturated edge");
                result.assign(r.clone(), h.clone());
                added += 1;
            }
        }
        if added == 0 {
            break;
        }
    }
    tracing::debug!(
        passes,
        added = result.len() - matching.len(),
        "envy-free saturation finished"
    );
    result
}

/// Returns whether matching `r` to `h` gives some `r'` a justified complaint:
/// `h` ranks `r'` strictly above `r`, and `r'` is unmatched or prefers `h` to
/// its partner.
pub fn has_envy(graph: &BipartiteGraph, matching: &Matching, r: &VertexId, h: &VertexId) -> bool {
    let Some(rank) = graph.rank(h, r) else {
        return false;
    };
    graph.preferences(h)[..rank]
        .iter()
        .any(|other| graph.prefers(other, Some(h), matching.partner(other)))
}
