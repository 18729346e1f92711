//! Capacity blow-up: reduce a capacitated instance to unit capacities.

use std::collections::BTreeMap;

use hr_core::errors::HrError;
use hr_core::{Quota, Side, VertexId};
use hr_graph::BipartiteGraph;

use crate::matching::Matching;
use crate::max_matching::{HopcroftKarp, MaximumMatcher};

/// Unit-capacity instance together with its clone map.
#[derive(Debug, Clone)]
pub struct BlownUpGraph {
    /// Instance in which every vertex has quota `(0,1)`.
    pub graph: BipartiteGraph,
    /// Clone id to original receiver id.
    pub reverse: BTreeMap<VertexId, VertexId>,
}

/// Replaces every receiver `h` of upper quota `c` with clones `h@0..h@(c-1)`.
///
/// Each clone copies `h`'s list; proposers list all clones of `h` where they
/// listed `h`. Receivers of upper quota 0 disappear. A clone name already
/// taken by a proposer gets `'` appended until it is free.
pub fn blow_up(graph: &BipartiteGraph) -> Result<BlownUpGraph, HrError> {
    let mut clones: BTreeMap<&VertexId, Vec<VertexId>> = BTreeMap::new();
    let mut reverse = BTreeMap::new();
    let mut receivers = Vec::new();
    let mut preferences = BTreeMap::new();
    for h in graph.receivers() {
        let upper = graph.upper_quota(h)?;
        let ids: Vec<VertexId> = (0..upper).map(|idx| clone_id(graph, h, idx)).collect();
        for clone in &ids {
            reverse.insert(clone.clone(), h.clone());
            receivers.push((clone.clone(), Quota::unit()));
            preferences.insert(clone.clone(), graph.preferences(h).to_vec());
        }
        clones.insert(h, ids);
    }
    let proposers = graph
        .proposers()
        .iter()
        .map(|r| {
            let list = graph
                .preferences(r)
                .iter()
                .flat_map(|h| clones.get(h).into_iter().flatten().cloned())
                .collect();
            preferences.insert(r.clone(), list);
            (r.clone(), Quota::unit())
        })
        .collect();
    let graph = BipartiteGraph::new(proposers, receivers, preferences)?;
    Ok(BlownUpGraph { graph, reverse })
}

// `h@idx` never repeats across receivers since `idx` holds no `@`; only
// proposers can clash.
fn clone_id(graph: &BipartiteGraph, receiver: &VertexId, idx: usize) -> VertexId {
    let mut name = format!("{receiver}@{idx}");
    while graph.side(&VertexId::new(name.as_str())) == Some(Side::Proposer) {
        name.push('\'');
    }
    VertexId::new(name)
}

/// Collapses a matching of the blown-up instance onto original receivers.
pub fn project_max_cardinality(
    matching: &Matching,
    reverse: &BTreeMap<VertexId, VertexId>,
) -> Matching {
    let mut projected = Matching::new();
    for (proposer, clone) in matching.pairs() {
        let receiver = reverse.get(clone).unwrap_or(clone);
        projected.assign(proposer.clone(), receiver.clone());
    }
    projected
}

/// Maximum-cardinality matching of `graph` respecting upper quotas.
pub fn max_cardinality_match(graph: &BipartiteGraph) -> Result<Matching, HrError> {
    max_cardinality_match_with(graph, &HopcroftKarp)
}

/// [`max_cardinality_match`] with an explicit matching primitive.
pub fn max_cardinality_match_with<M: MaximumMatcher + ?Sized>(
    graph: &BipartiteGraph,
    matcher: &M,
) -> Result<Matching, HrError> {
    let blown = blow_up(graph)?;
    let unit = &blown.graph;
    let index: BTreeMap<&VertexId, usize> = unit
        .receivers()
        .iter()
        .enumerate()
        .map(|(idx, id)| (id, idx))
        .collect();
    let adjacency: Vec<Vec<usize>> = unit
        .proposers()
        .iter()
        .map(|r| unit.preferences(r).iter().map(|h| index[h]).collect())
        .collect();
    let pairs = matcher.maximum_matching(&adjacency, unit.receivers().len());

    let unit_matching = Matching::from_pairs(
        unit,
        unit.proposers()
            .iter()
            .zip(pairs)
            .filter_map(|(r, partner)| {
                partner.map(|idx| (r.clone(), unit.receivers()[idx].clone()))
            }),
    )?;
    let matching = project_max_cardinality(&unit_matching, &blown.reverse);
    matching.check_capacities(graph)?;
    Ok(matching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_graph::GraphBuilder;

    #[test]
    fn clones_follow_the_upper_quota() {
        let graph = GraphBuilder::new()
            .proposer("r1", Quota::unit())
            .receiver("h", Quota::new(1, 3).unwrap())
            .receiver("z", Quota::upper_only(0))
            .preferences("r1", ["z", "h"])
            .preferences("h", ["r1"])
            .preferences("z", ["r1"])
            .build()
            .unwrap();
        let blown = blow_up(&graph).unwrap();
        assert_eq!(blown.graph.receivers().len(), 3);
        assert_eq!(
            blown.graph.preferences(&"r1".into()),
            &[VertexId::from("h@0"), VertexId::from("h@1"), VertexId::from("h@2")]
        );
        assert_eq!(blown.reverse[&VertexId::from("h@2")], VertexId::from("h"));
    }

    #[test]
    fn clone_names_step_around_proposers() {
        let graph = GraphBuilder::new()
            .proposer("h@0", Quota::unit())
            .proposer("h@0'", Quota::unit())
            .receiver("h", Quota::upper_only(2))
            .preferences("h@0", ["h"])
            .preferences("h@0'", ["h"])
            .preferences("h", ["h@0", "h@0'"])
            .build()
            .unwrap();
        let blown = blow_up(&graph).unwrap();
        assert_eq!(
            blown.graph.receivers(),
            &[VertexId::from("h@0''"), VertexId::from("h@1")]
        );
        let matching = max_cardinality_match(&graph).unwrap();
        assert_eq!(matching.occupancy(&"h".into()), 2);
    }
}
