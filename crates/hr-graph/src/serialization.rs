use hr_core::errors::{ErrorInfo, HrError};
use hr_core::{Quota, VertexId};
use serde::{Deserialize, Serialize};

use crate::bipartite::BipartiteGraph;

const SCHEMA_VERSION: u32 = 1;

/// Serializes the graph to a compact binary representation using `bincode`.
pub fn graph_to_bytes(graph: &BipartiteGraph) -> Result<Vec<u8>, HrError> {
    let serializable = SerializableGraph::from_graph(graph);
    bincode::serialize(&serializable)
        .map_err(|err| HrError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores and revalidates a graph from its binary representation.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<BipartiteGraph, HrError> {
    let serializable: SerializableGraph = bincode::deserialize(bytes)
        .map_err(|err| HrError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    serializable.into_graph()
}

/// Serializes the graph to a pretty printed JSON string.
pub fn graph_to_json(graph: &BipartiteGraph) -> Result<String, HrError> {
    let serializable = SerializableGraph::from_graph(graph);
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| HrError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores and revalidates a graph from a JSON string.
pub fn graph_from_json(json: &str) -> Result<BipartiteGraph, HrError> {
    let serializable: SerializableGraph = serde_json::from_str(json)
        .map_err(|err| HrError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_graph()
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableGraph {
    schema_version: u32,
    proposers: Vec<SerializableVertex>,
    receivers: Vec<SerializableVertex>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableVertex {
    id: VertexId,
    lower: usize,
    upper: usize,
    preferences: Vec<VertexId>,
}

impl SerializableGraph {
    fn from_graph(graph: &BipartiteGraph) -> Self {
        let vertex = |id: &VertexId| {
            let quota = graph.quota(id).unwrap_or_default();
            SerializableVertex {
                id: id.clone(),
                lower: quota.lower(),
                upper: quota.upper(),
                preferences: graph.preferences(id).to_vec(),
            }
        };
        Self {
            schema_version: SCHEMA_VERSION,
            proposers: graph.proposers().iter().map(vertex).collect(),
            receivers: graph.receivers().iter().map(vertex).collect(),
        }
    }

    fn into_graph(self) -> Result<BipartiteGraph, HrError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(HrError::Serde(
                ErrorInfo::new("schema-version", "unsupported graph schema version")
                    .with_context("found", self.schema_version.to_string())
                    .with_context("expected", SCHEMA_VERSION.to_string()),
            ));
        }
        let mut preferences = std::collections::BTreeMap::new();
        let mut split = |vertices: Vec<SerializableVertex>| -> Result<Vec<(VertexId, Quota)>, HrError> {
            vertices
                .into_iter()
                .map(|vertex| {
                    let quota = Quota::new(vertex.lower, vertex.upper)
                        .map_err(|err| err.with_context("vertex", &vertex.id))?;
                    preferences.insert(vertex.id.clone(), vertex.preferences);
                    Ok((vertex.id, quota))
                })
                .collect()
        };
        let proposers = split(self.proposers)?;
        let receivers = split(self.receivers)?;
        BipartiteGraph::new(proposers, receivers, preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bipartite::GraphBuilder;

    fn graph() -> BipartiteGraph {
        GraphBuilder::new()
            .proposer("r1", Quota::unit())
            .proposer("r2", Quota::unit())
            .receiver("h1", Quota::new(1, 2).unwrap())
            .preferences("r1", ["h1"])
            .preferences("r2", ["h1"])
            .preferences("h1", ["r2", "r1"])
            .build()
            .unwrap()
    }

    #[test]
    fn json_and_bytes_restore_the_same_graph() {
        let graph = graph();
        let json = graph_to_json(&graph).unwrap();
        assert_eq!(graph_from_json(&json).unwrap(), graph);
        let bytes = graph_to_bytes(&graph).unwrap();
        assert_eq!(graph_from_bytes(&bytes).unwrap(), graph);
    }

    #[test]
    fn schema_mismatch_is_reported() {
        let json = graph_to_json(&graph()).unwrap().replace(
            "\"schema_version\": 1",
            "\"schema_version\": 9",
        );
        let err = graph_from_json(&json).unwrap_err();
        assert!(matches!(err, HrError::Serde(_)));
        assert_eq!(err.code(), "schema-version");
    }

    #[test]
    fn tampered_payloads_fail_validation() {
        let json = graph_to_json(&graph())
            .unwrap()
            .replace("\"lower\": 1", "\"lower\": 5");
        let err = graph_from_json(&json).unwrap_err();
        assert_eq!(err.code(), "invalid-quota");
    }
}
