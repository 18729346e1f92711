use std::collections::HashMap;

use hr_core::errors::{graph_error, HrError};

/// Index arena owned by a single algorithm run.
///
/// Proposers and receivers are plain indices. Every receiver keeps an active
/// prefix of its preference list; [`WorkingGraph::truncate_on_accept`] only
/// ever shrinks that prefix. Proposer lists are never rewritten: a receiver is
/// skipped by [`WorkingGraph::next_candidate`] once its active prefix no longer
/// contains the proposer, which removes it from the proposer's list at the same
/// total cost.
#[derive(Debug, Clone)]
pub struct WorkingGraph {
    proposer_lists: Vec<Vec<usize>>,
    // back_ranks[a][k]: rank of `a` in the list of receiver proposer_lists[a][k]
    back_ranks: Vec<Vec<usize>>,
    receiver_lists: Vec<Vec<usize>>,
    capacities: Vec<usize>,
    active: Vec<usize>,
    cursors: Vec<usize>,
}

impl WorkingGraph {
    /// Builds an arena from raw index lists, checking symmetry and bounds.
    pub fn from_lists(
        proposer_lists: Vec<Vec<usize>>,
        receiver_lists: Vec<Vec<usize>>,
        capacities: Vec<usize>,
    ) -> Result<Self, HrError> {
        if capacities.len() != receiver_lists.len() {
            return Err(graph_error(
                "capacity-mismatch",
                "one capacity is required per receiver",
            )
            .with_context("receivers", receiver_lists.len())
            .with_context("capacities", capacities.len()));
        }
        let mut positions: Vec<HashMap<usize, usize>> = Vec::with_capacity(receiver_lists.len());
        for (b, list) in receiver_lists.iter().enumerate() {
            let mut ranks = HashMap::with_capacity(list.len());
            for (rank, &a) in list.iter().enumerate() {
                if a >= proposer_lists.len() {
                    return Err(graph_error("dangling-reference", "proposer index out of range")
                        .with_context("receiver", b)
                        .with_context("entry", a));
                }
                if ranks.insert(a, rank).is_some() {
                    return Err(graph_error(
                        "duplicate-preference",
                        "proposer listed twice by a receiver",
                    )
                    .with_context("receiver", b)
                    .with_context("entry", a));
                }
            }
            positions.push(ranks);
        }
        let mut edges = 0usize;
        for (a, list) in proposer_lists.iter().enumerate() {
            for &b in list {
                let known = positions.get(b).map(|ranks| ranks.contains_key(&a));
                if known != Some(true) {
                    return Err(graph_error(
                        "asymmetric-edge",
                        "proposer lists a receiver that does not list it back",
                    )
                    .with_context("proposer", a)
                    .with_context("receiver", b));
                }
                edges += 1;
            }
        }
        let listed: usize = receiver_lists.iter().map(Vec::len).sum();
        if listed != edges {
            return Err(graph_error(
                "asymmetric-edge",
                "receiver lists a proposer that does not list it back",
            ));
        }
        Ok(Self::build(proposer_lists, receiver_lists, capacities, &positions))
    }

    /// Builds an arena from lists already known to be symmetric.
    pub(crate) fn from_validated(
        proposer_lists: Vec<Vec<usize>>,
        receiver_lists: Vec<Vec<usize>>,
        capacities: Vec<usize>,
    ) -> Self {
        let positions: Vec<HashMap<usize, usize>> = receiver_lists
            .iter()
            .map(|list| list.iter().enumerate().map(|(rank, &a)| (a, rank)).collect())
            .collect();
        Self::build(proposer_lists, receiver_lists, capacities, &positions)
    }

    fn build(
        proposer_lists: Vec<Vec<usize>>,
        receiver_lists: Vec<Vec<usize>>,
        capacities: Vec<usize>,
        positions: &[HashMap<usize, usize>],
    ) -> Self {
        let back_ranks = proposer_lists
            .iter()
            .enumerate()
            .map(|(a, list)| list.iter().map(|&b| positions[b][&a]).collect())
            .collect();
        let active = receiver_lists
            .iter()
            .zip(&capacities)
            .map(|(list, &cap)| if cap == 0 { 0 } else { list.len() })
            .collect();
        let cursors = vec![0; proposer_lists.len()];
        Self {
            proposer_lists,
            back_ranks,
            receiver_lists,
            capacities,
            active,
            cursors,
        }
    }

    /// Number of proposers in the arena.
    pub fn proposer_count(&self) -> usize {
        self.proposer_lists.len()
    }

    /// Number of receivers in the arena.
    pub fn receiver_count(&self) -> usize {
        self.receiver_lists.len()
    }

    /// Upper quota of receiver `b`.
    pub fn capacity(&self, b: usize) -> usize {
        self.capacities[b]
    }

    /// The still active prefix of receiver `b`'s preference list.
    pub fn active_preferences(&self, b: usize) -> &[usize] {
        &self.receiver_lists[b][..self.active[b]]
    }

    /// Receivers still acceptable to proposer `a`, most preferred first.
    pub fn remaining(&self, a: usize) -> Vec<usize> {
        let start = self.cursors[a];
        self.proposer_lists[a][start..]
            .iter()
            .zip(&self.back_ranks[a][start..])
            .filter(|&(&b, &rank)| rank < self.active[b])
            .map(|(&b, _)| b)
            .collect()
    }

    /// Most preferred receiver still acceptable to `a`, with `a`'s rank there.
    ///
    /// Receivers that truncated `a` away are consumed from `a`'s list. The
    /// returned receiver stays at the head until it truncates `a` as well.
    pub fn next_candidate(&mut self, a: usize) -> Option<(usize, usize)> {
        let list = &self.proposer_lists[a];
        let ranks = &self.back_ranks[a];
        let mut cursor = self.cursors[a];
        while cursor < list.len() {
            let b = list[cursor];
            let rank = ranks[cursor];
            if rank < self.active[b] {
                self.cursors[a] = cursor;
                return Some((b, rank));
            }
            cursor += 1;
        }
        self.cursors[a] = cursor;
        None
    }

    /// Drops every proposer ranked strictly below `a` from `b`'s list.
    ///
    /// `b` disappears from the lists of the dropped proposers. Returns how many
    /// proposers were dropped by this call.
    pub fn truncate_on_accept(&mut self, a: usize, b: usize) -> Result<usize, HrError> {
        let rank = self
            .receiver_lists
            .get(b)
            .and_then(|list| list.iter().position(|&entry| entry == a))
            .ok_or_else(|| {
                graph_error("unknown-pair", "proposer is not on the receiver's list")
                    .with_context("proposer", a)
                    .with_context("receiver", b)
            })?;
        Ok(self.truncate_below_rank(b, rank))
    }

    /// Truncation keyed by the accepted proposer's rank at `b`.
    pub fn truncate_below_rank(&mut self, b: usize, rank: usize) -> usize {
        let keep = (rank + 1).min(self.active[b]);
        let dropped = self.active[b] - keep;
        self.active[b] = keep;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> WorkingGraph {
        // a0: [b0, b1], a1: [b0], a2: [b0, b1]; b0: [a2, a0, a1], b1: [a0, a2]
        WorkingGraph::from_lists(
            vec![vec![0, 1], vec![0], vec![0, 1]],
            vec![vec![2, 0, 1], vec![0, 2]],
            vec![1, 2],
        )
        .unwrap()
    }

    #[test]
    fn truncation_removes_lower_ranked_proposers_on_both_sides() {
        let mut graph = arena();
        assert_eq!(graph.truncate_on_accept(2, 0).unwrap(), 2);
        assert_eq!(graph.active_preferences(0), &[2]);
        assert_eq!(graph.remaining(0), vec![1]);
        assert!(graph.remaining(1).is_empty());
        assert_eq!(graph.remaining(2), vec![0, 1]);
        assert_eq!(graph.next_candidate(0), Some((1, 0)));
        assert_eq!(graph.next_candidate(1), None);
    }

    #[test]
    fn truncation_never_grows_the_active_prefix() {
        let mut graph = arena();
        graph.truncate_on_accept(2, 0).unwrap();
        assert_eq!(graph.truncate_on_accept(1, 0).unwrap(), 0);
        assert_eq!(graph.active_preferences(0), &[2]);
    }

    #[test]
    fn asymmetric_lists_are_rejected() {
        let err = WorkingGraph::from_lists(vec![vec![0]], vec![vec![]], vec![1]).unwrap_err();
        assert_eq!(err.code(), "asymmetric-edge");
        let err = WorkingGraph::from_lists(vec![vec![]], vec![vec![0]], vec![1]).unwrap_err();
        assert_eq!(err.code(), "asymmetric-edge");
    }

    #[test]
    fn zero_capacity_receivers_start_truncated() {
        let mut graph =
            WorkingGraph::from_lists(vec![vec![0]], vec![vec![0]], vec![0]).unwrap();
        assert!(graph.active_preferences(0).is_empty());
        assert_eq!(graph.next_candidate(0), None);
    }
}
