use std::collections::{BTreeMap, BTreeSet};

use hr_core::errors::{ErrorInfo, HrError};
use hr_core::{Side, VertexId};
use hr_graph::BipartiteGraph;
use serde::{Deserialize, Serialize};

/// Many-to-one assignment of proposers to receivers.
///
/// Every proposer holds at most one receiver; every receiver holds a set of
/// proposers. Both directions are kept in sync by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matching {
    partners: BTreeMap<VertexId, VertexId>,
    occupants: BTreeMap<VertexId, BTreeSet<VertexId>>,
}

impl Matching {
    /// Creates an empty matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a matching from `(proposer, receiver)` pairs, checked against `graph`.
    ///
    /// Every pair must be an edge of the graph, no proposer may appear twice
    /// and no receiver may exceed its upper quota.
    pub fn from_pairs<I>(graph: &BipartiteGraph, pairs: I) -> Result<Self, HrError>
    where
        I: IntoIterator<Item = (VertexId, VertexId)>,
    {
        let mut matching = Self::new();
        for (proposer, receiver) in pairs {
            if graph.side(&proposer) != Some(Side::Proposer)
                || graph.side(&receiver) != Some(Side::Receiver)
                || graph.rank(&proposer, &receiver).is_none()
            {
                return Err(matching_error("unknown-pair", "pair is not an edge of the graph")
                    .with_context("proposer", &proposer)
                    .with_context("receiver", &receiver));
            }
            if let Some(existing) = matching.partner(&proposer) {
                return Err(matching_error("unknown-pair", "proposer matched twice")
                    .with_context("proposer", &proposer)
                    .with_context("receiver", existing));
            }
            matching.assign(proposer, receiver);
        }
        matching.check_capacities(graph)?;
        Ok(matching)
    }

    /// Records that `proposer` holds `receiver`, releasing any previous partner.
    pub(crate) fn assign(&mut self, proposer: VertexId, receiver: VertexId) {
        if let Some(previous) = self.partners.insert(proposer.clone(), receiver.clone()) {
            if let Some(set) = self.occupants.get_mut(&previous) {
                set.remove(&proposer);
                if set.is_empty() {
                    self.occupants.remove(&previous);
                }
            }
        }
        self.occupants.entry(receiver).or_default().insert(proposer);
    }

    /// Verifies that no receiver holds more proposers than its upper quota.
    pub fn check_capacities(&self, graph: &BipartiteGraph) -> Result<(), HrError> {
        for (receiver, set) in &self.occupants {
            let upper = graph.upper_quota(receiver)?;
            if set.len() > upper {
                return Err(matching_error("over-capacity", "receiver exceeds its upper quota")
                    .with_context("receiver", receiver)
                    .with_context("occupants", set.len())
                    .with_context("upper", upper));
            }
        }
        Ok(())
    }

    /// Receiver held by `proposer`, if any.
    pub fn partner(&self, proposer: &VertexId) -> Option<&VertexId> {
        self.partners.get(proposer)
    }

    /// Returns whether `proposer` holds a receiver.
    pub fn is_matched(&self, proposer: &VertexId) -> bool {
        self.partners.contains_key(proposer)
    }

    /// Proposers held by `receiver`, in identifier order.
    pub fn occupants(&self, receiver: &VertexId) -> impl Iterator<Item = &VertexId> + '_ {
        self.occupants.get(receiver).into_iter().flatten()
    }

    /// Number of proposers held by `receiver`.
    pub fn occupancy(&self, receiver: &VertexId) -> usize {
        self.occupants.get(receiver).map_or(0, BTreeSet::len)
    }

    /// Returns whether `receiver` holds `proposer`.
    pub fn contains(&self, proposer: &VertexId, receiver: &VertexId) -> bool {
        self.partner(proposer) == Some(receiver)
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    /// Returns whether no pair is matched.
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// All pairs, in proposer identifier order.
    pub fn pairs(&self) -> impl Iterator<Item = (&VertexId, &VertexId)> + '_ {
        self.partners.iter()
    }

    /// Pairs in proposer declaration order of `graph`.
    pub fn pairs_in_order<'a>(
        &'a self,
        graph: &'a BipartiteGraph,
    ) -> impl Iterator<Item = (&'a VertexId, &'a VertexId)> + 'a {
        graph
            .proposers()
            .iter()
            .filter_map(move |proposer| self.partner(proposer).map(|receiver| (proposer, receiver)))
    }
}

pub(crate) fn matching_error(code: &str, message: &str) -> HrError {
    HrError::Matching(ErrorInfo::new(code, message))
}
