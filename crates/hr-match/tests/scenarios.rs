use hr_core::{Quota, VertexId};
use hr_graph::{BipartiteGraph, GraphBuilder};
use hr_match::{
    blocking_pairs, has_envy, is_stable, max_cardinality_match, popular_match, saturate,
    stable_match, Matching,
};

fn scenario_ab() -> BipartiteGraph {
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

fn id(raw: &str) -> VertexId {
    VertexId::from(raw)
}

#[test]
fn scenario_a_stable_matching() {
    let graph = scenario_ab();
    let matching = stable_match(&graph).unwrap();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching.partner(&id("a1")), Some(&id("b1")));
    assert!(!matching.is_matched(&id("a2")));
    assert_eq!(matching.occupancy(&id("b2")), 0);
    assert!(is_stable(&graph, &matching));
}

#[test]
fn scenario_b_popular_matching() {
    let graph = scenario_ab();
    let matching = popular_match(&graph).unwrap();
    assert_eq!(matching.len(), 2);
    assert_eq!(matching.partner(&id("a1")), Some(&id("b2")));
    assert_eq!(matching.partner(&id("a2")), Some(&id("b1")));
    assert_eq!(
        blocking_pairs(&graph, &matching),
        vec![(id("a1"), id("b1"))]
    );
}

#[test]
fn scenario_c_blow_up_fills_the_receiver() {
    let graph = GraphBuilder::new()
        .proposer("r1", Quota::unit())
        .proposer("r2", Quota::unit())
        .proposer("r3", Quota::unit())
        .receiver("h", Quota::upper_only(2))
        .preferences("r1", ["h"])
        .preferences("r2", ["h"])
        .preferences("r3", ["h"])
        .preferences("h", ["r1", "r2", "r3"])
        .build()
        .unwrap();
    let blown = hr_match::blow_up(&graph).unwrap();
    assert_eq!(blown.graph.receivers(), &[id("h@0"), id("h@1")]);
    let matching = max_cardinality_match(&graph).unwrap();
    assert_eq!(matching.len(), 2);
    assert_eq!(matching.occupancy(&id("h")), 2);
}

#[test]
fn capacitated_receiver_keeps_its_best_applicants() {
    let graph = GraphBuilder::new()
        .proposer("r1", Quota::unit())
        .proposer("r2", Quota::unit())
        .proposer("r3", Quota::unit())
        .receiver("h1", Quota::upper_only(2))
        .receiver("h2", Quota::unit())
        .preferences("r1", ["h1", "h2"])
        .preferences("r2", ["h1", "h2"])
        .preferences("r3", ["h1", "h2"])
        .preferences("h1", ["r3", "r1", "r2"])
        .preferences("h2", ["r2", "r1", "r3"])
        .build()
        .unwrap();
    let matching = stable_match(&graph).unwrap();
    assert_eq!(matching.partner(&id("r3")), Some(&id("h1")));
    assert_eq!(matching.partner(&id("r1")), Some(&id("h1")));
    assert_eq!(matching.partner(&id("r2")), Some(&id("h2")));
    assert!(is_stable(&graph, &matching));
}

#[test]
fn zero_capacity_receivers_take_nobody() {
    let graph = GraphBuilder::new()
        .proposer("r1", Quota::unit())
        .receiver("h0", Quota::upper_only(0))
        .receiver("h1", Quota::unit())
        .preferences("r1", ["h0", "h1"])
        .preferences("h0", ["r1"])
        .preferences("h1", ["r1"])
        .build()
        .unwrap();
    for matching in [
        stable_match(&graph).unwrap(),
        popular_match(&graph).unwrap(),
        max_cardinality_match(&graph).unwrap(),
    ] {
        assert_eq!(matching.partner(&id("r1")), Some(&id("h1")));
    }
}

#[test]
fn empty_graph_yields_empty_matchings() {
    let graph = GraphBuilder::new().build().unwrap();
    assert!(stable_match(&graph).unwrap().is_empty());
    assert!(popular_match(&graph).unwrap().is_empty());
    assert!(max_cardinality_match(&graph).unwrap().is_empty());
}

#[test]
fn saturation_never_seats_a_worse_ranked_proposer_first() {
    // h1 has one seat and ranks r1 first; r2 is declared first
    let graph = GraphBuilder::new()
        .proposer("r2", Quota::unit())
        .proposer("r1", Quota::unit())
        .receiver("h1", Quota::unit())
        .preferences("r1", ["h1"])
        .preferences("r2", ["h1"])
        .preferences("h1", ["r1", "r2"])
        .build()
        .unwrap();
    let result = saturate(&graph, &Matching::new());
    assert_eq!(result.partner(&id("r1")), Some(&id("h1")));
    assert!(!result.is_matched(&id("r2")));
    assert!(!has_envy(&graph, &result, &id("r1"), &id("h1")));
}

#[test]
fn saturation_revisits_proposers_held_back_by_envy() {
    // r2 is declared first but must wait until r1, ranked above it, is seated
    let graph = GraphBuilder::new()
        .proposer("r2", Quota::unit())
        .proposer("r1", Quota::unit())
        .proposer("r3", Quota::unit())
        .receiver("h1", Quota::unit())
        .receiver("h2", Quota::upper_only(2))
        .preferences("r1", ["h2", "h1"])
        .preferences("r2", ["h2"])
        .preferences("r3", ["h1"])
        .preferences("h1", ["r3", "r1"])
        .preferences("h2", ["r1", "r2"])
        .build()
        .unwrap();
    let base = Matching::from_pairs(&graph, [(id("r3"), id("h1"))]).unwrap();
    assert!(has_envy(&graph, &base, &id("r2"), &id("h2")));
    let result = saturate(&graph, &base);
    assert_eq!(result.partner(&id("r1")), Some(&id("h2")));
    assert_eq!(result.partner(&id("r2")), Some(&id("h2")));
    assert_eq!(result.partner(&id("r3")), Some(&id("h1")));
}

#[test]
fn blow_up_avoids_proposer_names() {
    let graph = GraphBuilder::new()
        .proposer("h@0", Quota::unit())
        .receiver("h", Quota::unit())
        .preferences("h@0", ["h"])
        .preferences("h", ["h@0"])
        .build()
        .unwrap();
    let matching = max_cardinality_match(&graph).unwrap();
    assert_eq!(matching.partner(&id("h@0")), Some(&id("h")));
}

#[test]
fn transposed_graph_gives_the_receiver_side_view() {
    let graph = scenario_ab();
    let reverse = stable_match(&graph.transpose()).unwrap();
    assert_eq!(reverse.partner(&id("b1")), Some(&id("a1")));
    assert_eq!(reverse.len(), 1);
}
