//! Capacitated deferred acceptance with eviction.

use std::collections::BinaryHeap;

use hr_core::errors::{internal_error, HrError};
use hr_graph::{BipartiteGraph, WorkingGraph};

use crate::matching::Matching;

/// Index-level outcome of a deferred acceptance run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    partners: Vec<Option<usize>>,
    occupants: Vec<Vec<usize>>,
}

impl Assignment {
    /// Receiver index held by proposer `a`.
    pub fn partner(&self, a: usize) -> Option<usize> {
        self.partners[a]
    }

    /// Proposers held by receiver `b`, best ranked first.
    pub fn occupants(&self, b: usize) -> &[usize] {
        &self.occupants[b]
    }

    /// Number of matched proposers.
    pub fn len(&self) -> usize {
        self.partners.iter().flatten().count()
    }

    /// Returns whether nobody is matched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes the proposer-optimal stable matching of `graph`.
///
/// The graph is left untouched; the run truncates its own working copy.
pub fn stable_match(graph: &BipartiteGraph) -> Result<Matching, HrError> {
    let mut working = graph.working_copy();
    let assignment = run_deferred_acceptance(&mut working)?;
    let mut matching = Matching::new();
    for (a, proposer) in graph.proposers().iter().enumerate() {
        if let Some(b) = assignment.partner(a) {
            matching.assign(proposer.clone(), graph.receivers()[b].clone());
        }
    }
    Ok(matching)
}

/// Runs deferred acceptance on an arena the caller owns.
///
/// Free proposers are kept on a stack seeded in index order, so the highest
/// index proposes first. The result does not depend on that order.
pub fn run_deferred_acceptance(working: &mut WorkingGraph) -> Result<Assignment, HrError> {
    let proposers = working.proposer_count();
    let receivers = working.receiver_count();
    let mut free: Vec<usize> = (0..proposers).collect();
    let mut partners: Vec<Option<usize>> = vec![None; proposers];
    // (rank at b, proposer): the max-heap keeps b's worst occupant on top
    let mut held: Vec<BinaryHeap<(usize, usize)>> = vec![BinaryHeap::new(); receivers];
    let mut proposals = 0usize;
    let mut evictions = 0usize;

    while let Some(a) = free.pop() {
        let Some((b, rank)) = working.next_candidate(a) else {
            tracing::trace!(proposer = a, "preference list exhausted");
            continue;
        };
        proposals += 1;
        let capacity = working.capacity(b);
        if held[b].len() >= capacity {
            let (_, evicted) = held[b].pop().ok_or_else(|| {
                internal_error("empty-eviction", "full receiver holds no occupant")
                    .with_context("receiver", b)
            })?;
            partners[evicted] = None;
            free.push(evicted);
            evictions += 1;
            tracing::trace!(receiver = b, evicted, "evicted worst occupant");
        }
        held[b].push((rank, a));
        partners[a] = Some(b);
        tracing::trace!(proposer = a, receiver = b, rank, "accepted proposal");

        if held[b].len() > capacity {
            return Err(internal_error("over-capacity", "receiver exceeds its capacity")
                .with_context("receiver", b)
                .with_context("occupants", held[b].len())
                .with_context("capacity", capacity));
        }
        if held[b].len() == capacity {
            if let Some(&(worst_rank, _)) = held[b].peek() {
                working.truncate_below_rank(b, worst_rank);
            }
        }
    }

    let occupants: Vec<Vec<usize>> = held
        .into_iter()
        .map(|heap| heap.into_sorted_vec().into_iter().map(|(_, a)| a).collect())
        .collect();
    let assignment = Assignment {
        partners,
        occupants,
    };
    tracing::debug!(
        proposers,
        receivers,
        proposals,
        evictions,
        matched = assignment.len(),
        "deferred acceptance finished"
    );
    Ok(assignment)
}
