//! Summary statistics over a graph and one or two matchings.

use std::collections::{BTreeMap, BTreeSet};

use hr_core::errors::{ErrorInfo, HrError};
use hr_core::VertexId;
use hr_graph::BipartiteGraph;
use serde::{Deserialize, Serialize};

use crate::matching::Matching;
use crate::verify::{blocking_pairs, blocking_residents};

/// Number of matched proposers.
pub fn size(matching: &Matching) -> usize {
    matching.len()
}

/// Rank profile: 1-based rank to the number of proposers matched at that rank.
pub fn signature(graph: &BipartiteGraph, matching: &Matching) -> BTreeMap<usize, usize> {
    let mut profile = BTreeMap::new();
    for (proposer, receiver) in matching.pairs() {
        if let Some(rank) = graph.rank(proposer, receiver) {
            *profile.entry(rank + 1).or_insert(0) += 1;
        }
    }
    profile
}

/// Proposers matched to their first choice.
pub fn rank_one_count(graph: &BipartiteGraph, matching: &Matching) -> usize {
    signature(graph, matching).get(&1).copied().unwrap_or(0)
}

/// Sum over receivers of the shortfall below their lower quota.
pub fn total_deficiency(graph: &BipartiteGraph, matching: &Matching) -> usize {
    graph
        .receivers()
        .iter()
        .map(|b| {
            let lower = graph.lower_quota(b).unwrap_or(0);
            lower.saturating_sub(matching.occupancy(b))
        })
        .sum()
}

/// Votes cast by all vertices when comparing two matchings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Proposers preferring the first matching.
    pub proposers_first: usize,
    /// Proposers preferring the second matching.
    pub proposers_second: usize,
    /// Receiver votes for the first matching.
    pub receivers_first: usize,
    /// Receiver votes for the second matching.
    pub receivers_second: usize,
}

impl VoteTally {
    /// Total votes for the first matching.
    pub fn first(&self) -> usize {
        self.proposers_first + self.receivers_first
    }

    /// Total votes for the second matching.
    pub fn second(&self) -> usize {
        self.proposers_second + self.receivers_second
    }
}

/// Compares `first` against `second` by majority vote.
///
/// A proposer votes for the matching giving it the better partner. A receiver
/// casts one vote per slot: the occupants only one matching gives it are sorted
/// by its preference and compared pairwise, a partner beating an empty slot.
pub fn compare_matchings(graph: &BipartiteGraph, first: &Matching, second: &Matching) -> VoteTally {
    let mut tally = VoteTally::default();
    for a in graph.proposers() {
        let (x, y) = (first.partner(a), second.partner(a));
        if graph.prefers(a, x, y) {
            tally.proposers_first += 1;
        } else if graph.prefers(a, y, x) {
            tally.proposers_second += 1;
        }
    }
    for b in graph.receivers() {
        let x: BTreeSet<&VertexId> = first.occupants(b).collect();
        let y: BTreeSet<&VertexId> = second.occupants(b).collect();
        let only_x = ordered_by_rank(graph, b, x.difference(&y).copied());
        let only_y = ordered_by_rank(graph, b, y.difference(&x).copied());
        for slot in 0..only_x.len().max(only_y.len()) {
            let (u, v) = (only_x.get(slot).copied(), only_y.get(slot).copied());
            if graph.prefers(b, u, v) {
                tally.receivers_first += 1;
            } else if graph.prefers(b, v, u) {
                tally.receivers_second += 1;
            }
        }
    }
    tally
}

fn ordered_by_rank<'a>(
    graph: &BipartiteGraph,
    receiver: &VertexId,
    occupants: impl Iterator<Item = &'a VertexId>,
) -> Vec<&'a VertexId> {
    let mut list: Vec<&VertexId> = occupants.collect();
    list.sort_by_key(|a| graph.rank(receiver, a).unwrap_or(usize::MAX));
    list
}

/// Headline numbers for one matching of one graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingReport {
    /// Matched proposers.
    pub size: usize,
    /// Blocking pairs.
    pub blocking_pairs: usize,
    /// Proposers in some blocking pair.
    pub blocking_residents: usize,
    /// Proposers holding their first choice.
    pub rank_one: usize,
    /// Total lower-quota shortfall.
    pub deficiency: usize,
    /// Rank profile, keyed by 1-based rank.
    pub signature: BTreeMap<usize, usize>,
}

impl MatchingReport {
    /// Collects the report for `matching` in `graph`.
    pub fn new(graph: &BipartiteGraph, matching: &Matching) -> Self {
        let pairs = blocking_pairs(graph, matching);
        Self {
            size: size(matching),
            blocking_pairs: pairs.len(),
            blocking_residents: blocking_residents(&pairs).len(),
            rank_one: rank_one_count(graph, matching),
            deficiency: total_deficiency(graph, matching),
            signature: signature(graph, matching),
        }
    }

    /// Pretty printed JSON form of the report.
    pub fn to_json(&self) -> Result<String, HrError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| HrError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
    }
}
