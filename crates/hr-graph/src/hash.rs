use sha2::{Digest, Sha256};

use crate::bipartite::BipartiteGraph;
use hr_core::VertexId;

/// Computes the canonical structural hash for the provided graph.
///
/// Vertices are hashed in identifier order, so two graphs that differ only
/// in declaration order share a hash. Preference order is significant.
pub fn canonical_hash(graph: &BipartiteGraph) -> String {
    let mut hasher = Sha256::new();
    encode_partition(b"partition:a", graph, graph.proposers(), &mut hasher);
    encode_partition(b"partition:b", graph, graph.receivers(), &mut hasher);
    format!("{:x}", hasher.finalize())
}

fn encode_partition(label: &[u8], graph: &BipartiteGraph, ids: &[VertexId], hasher: &mut Sha256) {
    let mut sorted: Vec<&VertexId> = ids.iter().collect();
    sorted.sort();
    hasher.update(label);
    hasher.update((sorted.len() as u64).to_le_bytes());
    for id in sorted {
        update_str(id.as_str(), hasher);
        let quota = graph.quota(id).unwrap_or_default();
        hasher.update((quota.lower() as u64).to_le_bytes());
        hasher.update((quota.upper() as u64).to_le_bytes());
        let list = graph.preferences(id);
        hasher.update((list.len() as u64).to_le_bytes());
        for entry in list {
            update_str(entry.as_str(), hasher);
        }
    }
}

fn update_str(value: &str, hasher: &mut Sha256) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
