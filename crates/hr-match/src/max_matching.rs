//! Maximum bipartite matching for unit-capacity instances.

use std::collections::VecDeque;

/// Unit-capacity maximum bipartite matching primitive.
///
/// `adjacency[u]` lists the right-hand vertices of left vertex `u`; right
/// vertices are `0..right`. The result maps every left vertex to its partner.
pub trait MaximumMatcher {
    /// Computes a maximum matching.
    fn maximum_matching(&self, adjacency: &[Vec<usize>], right: usize) -> Vec<Option<usize>>;
}

/// Hopcroft-Karp: shortest augmenting paths in phases, `O(E * sqrt(V))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HopcroftKarp;

const UNREACHED: usize = usize::MAX;

impl MaximumMatcher for HopcroftKarp {
    fn maximum_matching(&self, adjacency: &[Vec<usize>], right: usize) -> Vec<Option<usize>> {
        let left = adjacency.len();
        let mut pair_left: Vec<Option<usize>> = vec![None; left];
        let mut pair_right: Vec<Option<usize>> = vec![None; right];
        let mut dist = vec![UNREACHED; left];
        let mut phases = 0usize;

        while bfs(adjacency, &pair_left, &pair_right, &mut dist) {
            phases += 1;
            let mut cursor = vec![0usize; left];
            let mut path = Vec::new();
            for u in 0..left {
                if pair_left[u].is_none() {
                    augment(
                        u,
                        adjacency,
                        &mut pair_left,
                        &mut pair_right,
                        &mut dist,
                        &mut cursor,
                        &mut path,
                    );
                }
            }
        }
        tracing::debug!(
            left,
            right,
            phases,
            matched = pair_left.iter().flatten().count(),
            "hopcroft-karp finished"
        );
        pair_left
    }
}

// Layers free left vertices at distance 0; true when a free right vertex is reachable.
fn bfs(
    adjacency: &[Vec<usize>],
    pair_left: &[Option<usize>],
    pair_right: &[Option<usize>],
    dist: &mut [usize],
) -> bool {
    let mut queue = VecDeque::new();
    for (u, partner) in pair_left.iter().enumerate() {
        if partner.is_none() {
            dist[u] = 0;
            queue.push_back(u);
        } else {
            dist[u] = UNREACHED;
        }
    }
    let mut found = false;
    while let Some(u) = queue.pop_front() {
        for &v in &adjacency[u] {
            match pair_right[v] {
                None => found = true,
                Some(next) if dist[next] == UNREACHED => {
                    dist[next] = dist[u] + 1;
                    queue.push_back(next);
                }
                Some(_) => {}
            }
        }
    }
    found
}

// Depth-first search along the layering with an explicit stack of left
// vertices; `cursor[u]` is the next edge of `u` to try in this phase.
fn augment(
    root: usize,
    adjacency: &[Vec<usize>],
    pair_left: &mut [Option<usize>],
    pair_right: &mut [Option<usize>],
    dist: &mut [usize],
    cursor: &mut [usize],
    path: &mut Vec<usize>,
) -> bool {
    path.clear();
    path.push(root);
    while let Some(&u) = path.last() {
        let Some(&v) = adjacency[u].get(cursor[u]) else {
            dist[u] = UNREACHED;
            path.pop();
            continue;
        };
        match pair_right[v] {
            None => {
                for &w in path.iter() {
                    let v = adjacency[w][cursor[w]];
                    pair_left[w] = Some(v);
                    pair_right[v] = Some(w);
                }
                return true;
            }
            Some(next) if dist[next] == dist[u] + 1 => path.push(next),
            Some(_) => cursor[u] += 1,
        }
    }
    false
}
