//! Popular matchings through the two-level augmentation.
//!
//! Every proposer `r` gets a level-1 and a level-0 copy plus a private dummy
//! receiver `d(r)`. The level-1 copy ranks `d(r)` first, the level-0 copy
//! ranks it last, and real receivers prefer every level-1 copy to every level-0
//! copy. The proposer-optimal stable matching of that instance, restricted to
//! real receivers, is a maximum-cardinality popular matching of the original.

use std::fmt;

use hr_core::errors::{internal_error, HrError};
use hr_core::VertexId;
use hr_graph::{BipartiteGraph, WorkingGraph};

use crate::matching::Matching;
use crate::stable::{run_deferred_acceptance, Assignment};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AugmentedVertex {
    Original(VertexId),
    Leveled(VertexId, u8),
    Dummy(VertexId),
}

impl AugmentedVertex {
    fn original(&self) -> &VertexId {
        match self {
            AugmentedVertex::Original(id)
            | AugmentedVertex::Leveled(id, _)
            | AugmentedVertex::Dummy(id) => id,
        }
    }
}

impl fmt::Display for AugmentedVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AugmentedVertex::Original(id) => write!(f, "{id}"),
            AugmentedVertex::Leveled(id, level) => write!(f, "{id}^{level}"),
            AugmentedVertex::Dummy(id) => write!(f, "d({id})"),
        }
    }
}

/// Stable-matching instance equivalent to a popular-matching instance.
///
/// Proposer `i < n` is the level-1 copy of original proposer `i`, proposer
/// `n + i` its level-0 copy. Receivers keep their original indices and the
/// dummy of proposer `i` sits at index `m + i`.
#[derive(Debug, Clone)]
pub struct AugmentedGraph {
    working: WorkingGraph,
    proposers: Vec<AugmentedVertex>,
    receivers: Vec<AugmentedVertex>,
    originals: usize,
}

impl AugmentedGraph {
    /// Fresh arena for one engine run.
    pub fn working_copy(&self) -> WorkingGraph {
        self.working.clone()
    }

    /// Number of proposer copies.
    pub fn proposer_count(&self) -> usize {
        self.proposers.len()
    }

    /// Number of real plus dummy receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }

    /// Printable name of augmented proposer `idx`, such as `r1^0`.
    pub fn proposer_label(&self, idx: usize) -> Option<String> {
        self.proposers.get(idx).map(ToString::to_string)
    }

    /// Printable name of augmented receiver `idx`, such as `d(r1)`.
    pub fn receiver_label(&self, idx: usize) -> Option<String> {
        self.receivers.get(idx).map(ToString::to_string)
    }

    /// Preference labels of augmented receiver `idx` before any run.
    pub fn receiver_preferences(&self, idx: usize) -> Vec<String> {
        self.working
            .active_preferences(idx)
            .iter()
            .map(|&a| self.proposers[a].to_string())
            .collect()
    }

    /// Preference labels of augmented proposer `idx` before any run.
    pub fn proposer_preferences(&self, idx: usize) -> Vec<String> {
        self.working
            .remaining(idx)
            .into_iter()
            .map(|b| self.receivers[b].to_string())
            .collect()
    }

    fn is_dummy(&self, b: usize) -> bool {
        matches!(self.receivers.get(b), Some(AugmentedVertex::Dummy(_)))
    }
}

/// Builds the two-level augmentation of `graph`.
pub fn augment(graph: &BipartiteGraph) -> Result<AugmentedGraph, HrError> {
    let base = graph.working_copy();
    let n = base.proposer_count();
    let m = base.receiver_count();

    let mut proposer_lists = vec![Vec::new(); 2 * n];
    for a in 0..n {
        let real = base.remaining(a);
        let mut upper = Vec::with_capacity(real.len() + 1);
        upper.push(m + a);
        upper.extend_from_slice(&real);
        let mut lower = real;
        lower.push(m + a);
        proposer_lists[a] = upper;
        proposer_lists[n + a] = lower;
    }

    let mut receiver_lists = Vec::with_capacity(m + n);
    let mut capacities = Vec::with_capacity(m + n);
    for b in 0..m {
        let list = base.active_preferences(b);
        let mut leveled: Vec<usize> = list.to_vec();
        leveled.extend(list.iter().map(|&a| n + a));
        receiver_lists.push(leveled);
        capacities.push(base.capacity(b));
    }
    for a in 0..n {
        receiver_lists.push(vec![n + a, a]);
        capacities.push(1);
    }

    let working = WorkingGraph::from_lists(proposer_lists, receiver_lists, capacities)?;
    let proposers = (0..2 * n)
        .map(|idx| {
            let level = if idx < n { 1 } else { 0 };
            AugmentedVertex::Leveled(graph.proposers()[idx % n].clone(), level)
        })
        .collect();
    let receivers = graph
        .receivers()
        .iter()
        .cloned()
        .map(AugmentedVertex::Original)
        .chain(graph.proposers().iter().cloned().map(AugmentedVertex::Dummy))
        .collect();
    tracing::debug!(
        proposers = 2 * n,
        receivers = m + n,
        "built two-level augmentation"
    );
    Ok(AugmentedGraph {
        working,
        proposers,
        receivers,
        originals: n,
    })
}

/// Computes the proposer-optimal popular matching of `graph`.
///
/// Among popular matchings it has maximum cardinality. Run it on
/// [`BipartiteGraph::transpose`] for the receiver-proposing variant.
pub fn popular_match(graph: &BipartiteGraph) -> Result<Matching, HrError> {
    let augmented = augment(graph)?;
    let mut working = augmented.working_copy();
    let assignment = run_deferred_acceptance(&mut working)?;
    project(&augmented, &assignment, graph)
}

fn project(
    augmented: &AugmentedGraph,
    assignment: &Assignment,
    graph: &BipartiteGraph,
) -> Result<Matching, HrError> {
    let n = augmented.originals;
    let mut matching = Matching::new();
    for a in 0..n {
        let real: Vec<usize> = [assignment.partner(a), assignment.partner(n + a)]
            .into_iter()
            .flatten()
            .filter(|&b| !augmented.is_dummy(b))
            .collect();
        match real.as_slice() {
            [] => {}
            [b] => {
                let proposer = augmented.proposers[a].original().clone();
                let receiver = augmented.receivers[*b].original().clone();
                matching.assign(proposer, receiver);
            }
            _ => {
                return Err(internal_error(
                    "double-projection",
                    "both copies of a proposer hold real receivers",
                )
                .with_context("proposer", augmented.proposers[a].original()));
            }
        }
    }
    matching.check_capacities(graph).map_err(|err| {
        internal_error("over-capacity", "projected matching exceeds a quota")
            .with_context("cause", err)
    })?;
    Ok(matching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_core::Quota;
    use hr_graph::GraphBuilder;

    fn scenario() -> BipartiteGraph {
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
    fn augmentation_layout() {
        let augmented = augment(&scenario()).unwrap();
        assert_eq!(augmented.proposer_count(), 4);
        assert_eq!(augmented.receiver_count(), 4);
        assert_eq!(augmented.proposer_preferences(0), ["d(a1)", "b1", "b2"]);
        assert_eq!(augmented.proposer_preferences(2), ["b1", "b2", "d(a1)"]);
        assert_eq!(
            augmented.receiver_preferences(0),
            ["a1^1", "a2^1", "a1^0", "a2^0"]
        );
        assert_eq!(augmented.receiver_preferences(3), ["a2^0", "a2^1"]);
        assert_eq!(augmented.receiver_label(2).as_deref(), Some("d(a1)"));
        assert_eq!(augmented.proposer_label(3).as_deref(), Some("a2^0"));
        assert_eq!(augmented.proposer_label(4), None);
    }

    #[test]
    fn popular_matching_beats_the_stable_size() {
        let matching = popular_match(&scenario()).unwrap();
        assert_eq!(matching.partner(&"a1".into()), Some(&"b2".into()));
        assert_eq!(matching.partner(&"a2".into()), Some(&"b1".into()));
    }
}
