use std::collections::{BTreeMap, BTreeSet};

use hr_core::errors::{graph_error, HrError};
use hr_core::{Quota, Side, VertexId};

use crate::working::WorkingGraph;

/// Validated bipartite preference graph.
///
/// Partition A holds the proposers, partition B the receivers. Both keep their
/// declaration order, which is the iteration order used by every algorithm.
/// Preference lists are strict: index 0 is the most preferred partner.
///
/// A value of this type always satisfies: symmetric edges, no dangling
/// references, a quota for every vertex, no duplicates inside a list and
/// disjoint partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BipartiteGraph {
    proposers: Vec<VertexId>,
    receivers: Vec<VertexId>,
    sides: BTreeMap<VertexId, Side>,
    preferences: BTreeMap<VertexId, Vec<VertexId>>,
    quotas: BTreeMap<VertexId, Quota>,
}

impl BipartiteGraph {
    /// Validates the provided partitions and preference lists.
    ///
    /// Vertices missing from `preferences` get an empty list.
    pub fn new(
        proposers: Vec<(VertexId, Quota)>,
        receivers: Vec<(VertexId, Quota)>,
        mut preferences: BTreeMap<VertexId, Vec<VertexId>>,
    ) -> Result<Self, HrError> {
        let mut sides = BTreeMap::new();
        let mut quotas = BTreeMap::new();
        for (side, partition) in [(Side::Proposer, &proposers), (Side::Receiver, &receivers)] {
            for (id, quota) in partition.iter() {
                if let Some(previous) = sides.insert(id.clone(), side) {
                    let err = if previous == side {
                        graph_error("duplicate-vertex", "vertex declared twice in a partition")
                    } else {
                        graph_error(
                            "overlapping-partitions",
                            "vertex declared in both partitions",
                        )
                    };
                    return Err(err.with_context("vertex", id));
                }
                quotas.insert(id.clone(), *quota);
            }
        }

        if let Some(unknown) = preferences.keys().find(|id| !sides.contains_key(*id)) {
            return Err(graph_error(
                "unknown-vertex",
                "preference list given for an undeclared vertex",
            )
            .with_context("vertex", unknown));
        }
        for id in sides.keys() {
            preferences.entry(id.clone()).or_default();
        }

        let graph = Self {
            proposers: proposers.into_iter().map(|(id, _)| id).collect(),
            receivers: receivers.into_iter().map(|(id, _)| id).collect(),
            sides,
            preferences,
            quotas,
        };
        graph.validate_lists()?;
        graph.validate_symmetry()?;
        tracing::debug!(
            proposers = graph.proposers.len(),
            receivers = graph.receivers.len(),
            edges = graph.edge_count(),
            "validated bipartite graph"
        );
        Ok(graph)
    }

    fn validate_lists(&self) -> Result<(), HrError> {
        for id in self.proposers.iter().chain(self.receivers.iter()) {
            let side = self.sides[id];
            let mut seen = BTreeSet::new();
            for entry in self.preferences(id) {
                match self.sides.get(entry) {
                    Some(other) if *other == side.opposite() => {}
                    _ => {
                        return Err(graph_error(
                            "dangling-reference",
                            "preference list entry is not in the opposite partition",
                        )
                        .with_context("vertex", id)
                        .with_context("entry", entry));
                    }
                }
                if !seen.insert(entry) {
                    return Err(graph_error(
                        "duplicate-preference",
                        "vertex listed twice in one preference list",
                    )
                    .with_context("vertex", id)
                    .with_context("entry", entry));
                }
            }
        }
        Ok(())
    }

    fn validate_symmetry(&self) -> Result<(), HrError> {
        let mut forward: BTreeSet<(&VertexId, &VertexId)> = BTreeSet::new();
        for a in &self.proposers {
            for b in self.preferences(a) {
                forward.insert((a, b));
            }
        }
        let mut backward_count = 0usize;
        for b in &self.receivers {
            for a in self.preferences(b) {
                if !forward.contains(&(a, b)) {
                    return Err(asymmetric(b, a));
                }
                backward_count += 1;
            }
        }
        if backward_count != forward.len() {
            // some proposer lists a receiver that does not list it back
            for (a, b) in &forward {
                if !self.preferences(b).contains(a) {
                    return Err(asymmetric(a, b));
                }
            }
        }
        Ok(())
    }

    /// Proposers (partition A) in declaration order.
    pub fn proposers(&self) -> &[VertexId] {
        &self.proposers
    }

    /// Receivers (partition B) in declaration order.
    pub fn receivers(&self) -> &[VertexId] {
        &self.receivers
    }

    /// Returns the partition of `vertex`, if it belongs to the graph.
    pub fn side(&self, vertex: &VertexId) -> Option<Side> {
        self.sides.get(vertex).copied()
    }

    /// Returns whether `vertex` is declared in either partition.
    pub fn contains(&self, vertex: &VertexId) -> bool {
        self.sides.contains_key(vertex)
    }

    /// Preference list of `vertex`, most preferred first.
    ///
    /// Unknown vertices have an empty list.
    pub fn preferences(&self, vertex: &VertexId) -> &[VertexId] {
        self.preferences
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Position of `other` in `vertex`'s preference list.
    pub fn rank(&self, vertex: &VertexId, other: &VertexId) -> Option<usize> {
        self.preferences(vertex).iter().position(|entry| entry == other)
    }

    /// Returns whether `vertex` strictly prefers `first` to `second`.
    ///
    /// A listed partner is preferred to an absent one (`None`).
    pub fn prefers(
        &self,
        vertex: &VertexId,
        first: Option<&VertexId>,
        second: Option<&VertexId>,
    ) -> bool {
        match (first, second) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(first), Some(second)) => {
                match (self.rank(vertex, first), self.rank(vertex, second)) {
                    (Some(first), Some(second)) => first < second,
                    (Some(_), None) => true,
                    _ => false,
                }
            }
        }
    }

    /// Quota of `vertex`.
    pub fn quota(&self, vertex: &VertexId) -> Result<Quota, HrError> {
        self.quotas.get(vertex).copied().ok_or_else(|| {
            graph_error("unknown-vertex", "vertex does not exist").with_context("vertex", vertex)
        })
    }

    /// Lower quota of `vertex`.
    pub fn lower_quota(&self, vertex: &VertexId) -> Result<usize, HrError> {
        Ok(self.quota(vertex)?.lower())
    }

    /// Upper quota of `vertex`.
    pub fn upper_quota(&self, vertex: &VertexId) -> Result<usize, HrError> {
        Ok(self.quota(vertex)?.upper())
    }

    /// Number of edges, counted once per proposer-receiver pair.
    pub fn edge_count(&self) -> usize {
        self.proposers
            .iter()
            .map(|a| self.preferences(a).len())
            .sum()
    }

    /// Deep copy of partitions, preference lists and quotas.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Creates the index arena an algorithm run may truncate freely.
    ///
    /// Proposer `i` of the arena is `self.proposers()[i]`, receiver `j` is
    /// `self.receivers()[j]`.
    pub fn working_copy(&self) -> WorkingGraph {
        let proposer_index: BTreeMap<&VertexId, usize> = self
            .proposers
            .iter()
            .enumerate()
            .map(|(idx, id)| (id, idx))
            .collect();
        let receiver_index: BTreeMap<&VertexId, usize> = self
            .receivers
            .iter()
            .enumerate()
            .map(|(idx, id)| (id, idx))
            .collect();
        let proposer_lists = self
            .proposers
            .iter()
            .map(|a| self.preferences(a).iter().map(|b| receiver_index[b]).collect())
            .collect();
        let receiver_lists = self
            .receivers
            .iter()
            .map(|b| self.preferences(b).iter().map(|a| proposer_index[a]).collect())
            .collect();
        let capacities = self
            .receivers
            .iter()
            .map(|b| self.quotas[b].upper())
            .collect();
        WorkingGraph::from_validated(proposer_lists, receiver_lists, capacities)
    }

    /// Swaps the roles of the two partitions.
    pub fn transpose(&self) -> Self {
        let mut sides = BTreeMap::new();
        for (id, side) in &self.sides {
            sides.insert(id.clone(), side.opposite());
        }
        Self {
            proposers: self.receivers.clone(),
            receivers: self.proposers.clone(),
            sides,
            preferences: self.preferences.clone(),
            quotas: self.quotas.clone(),
        }
    }

    /// Restricts the instance to receivers with a positive lower quota.
    ///
    /// Kept receivers get the quota `(0, lower)`; every other receiver is
    /// dropped, together with its edges.
    pub fn lower_quota_restriction(&self) -> Self {
        let kept: BTreeSet<&VertexId> = self
            .receivers
            .iter()
            .filter(|b| self.quotas[*b].lower() > 0)
            .collect();
        let mut graph = self.clone();
        graph.receivers.retain(|b| kept.contains(b));
        for b in &self.receivers {
            if kept.contains(b) {
                let lower = self.quotas[b].lower();
                graph.quotas.insert(b.clone(), Quota::upper_only(lower));
            } else {
                graph.sides.remove(b);
                graph.quotas.remove(b);
                graph.preferences.remove(b);
            }
        }
        for a in &self.proposers {
            if let Some(list) = graph.preferences.get_mut(a) {
                list.retain(|b| kept.contains(b));
            }
        }
        graph
    }
}

fn asymmetric(vertex: &VertexId, entry: &VertexId) -> HrError {
    graph_error(
        "asymmetric-edge",
        "preference lists are not symmetric",
    )
    .with_context("vertex", vertex)
    .with_context("entry", entry)
    .with_hint("every listed partner must list the vertex back")
}

/// Incremental constructor for [`BipartiteGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    proposers: Vec<(VertexId, Quota)>,
    receivers: Vec<(VertexId, Quota)>,
    preferences: BTreeMap<VertexId, Vec<VertexId>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a proposer.
    pub fn proposer(mut self, id: impl Into<VertexId>, quota: Quota) -> Self {
        self.proposers.push((id.into(), quota));
        self
    }

    /// Declares a receiver.
    pub fn receiver(mut self, id: impl Into<VertexId>, quota: Quota) -> Self {
        self.receivers.push((id.into(), quota));
        self
    }

    /// Sets the preference list of `id`, most preferred first.
    pub fn preferences<I, S>(mut self, id: impl Into<VertexId>, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<VertexId>,
    {
        self.preferences
            .insert(id.into(), list.into_iter().map(Into::into).collect());
        self
    }

    /// Validates and builds the graph.
    pub fn build(self) -> Result<BipartiteGraph, HrError> {
        BipartiteGraph::new(self.proposers, self.receivers, self.preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> BipartiteGraph {
        GraphBuilder::new()
            .proposer("a1", Quota::unit())
            .proposer("a2", Quota::unit())
            .receiver("b1", Quota::unit())
            .receiver("b2", Quota::new(1, 2).unwrap())
            .preferences("a1", ["b1", "b2"])
            .preferences("a2", ["b1"])
            .preferences("b1", ["a1", "a2"])
            .preferences("b2", ["a1"])
            .build()
            .unwrap()
    }

    #[test]
    fn accessors_report_quotas_and_ranks() {
        let graph = scenario();
        let b2 = VertexId::from("b2");
        assert_eq!(graph.lower_quota(&b2).unwrap(), 1);
        assert_eq!(graph.upper_quota(&b2).unwrap(), 2);
        assert_eq!(graph.rank(&"a1".into(), &b2), Some(1));
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.side(&"a2".into()), Some(Side::Proposer));
        assert!(graph.prefers(&"b1".into(), Some(&"a1".into()), Some(&"a2".into())));
        assert!(graph.prefers(&"a2".into(), Some(&"b1".into()), None));
        assert!(!graph.prefers(&"a2".into(), None, Some(&"b1".into())));
    }

    #[test]
    fn unknown_vertex_quota_is_an_error() {
        let graph = scenario();
        let err = graph.upper_quota(&"zz".into()).unwrap_err();
        assert_eq!(err.code(), "unknown-vertex");
    }

    #[test]
    fn transpose_swaps_partitions() {
        let graph = scenario();
        let transposed = graph.transpose();
        assert_eq!(transposed.proposers(), graph.receivers());
        assert_eq!(transposed.side(&"b1".into()), Some(Side::Proposer));
        assert_eq!(transposed.transpose(), graph);
    }

    #[test]
    fn lower_quota_restriction_drops_unconstrained_receivers() {
        let restricted = scenario().lower_quota_restriction();
        assert_eq!(restricted.receivers(), &[VertexId::from("b2")]);
        assert_eq!(restricted.quota(&"b2".into()).unwrap(), Quota::upper_only(1));
        assert_eq!(restricted.preferences(&"a1".into()), &[VertexId::from("b2")]);
        assert!(restricted.preferences(&"a2".into()).is_empty());
        assert!(!restricted.contains(&"b1".into()));
    }
}
