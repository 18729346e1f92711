use hr_graph::{generate, BipartiteGraph, GeneratorConfig, GeneratorModel};
use hr_match::{
    blocking_pairs, has_envy, max_cardinality_match, popular_match, saturate, stable_match,
    Matching,
};
use proptest::prelude::*;

fn instance() -> impl Strategy<Value = BipartiteGraph> {
    (
        any::<u64>(),
        prop_oneof![
            Just(GeneratorModel::Uniform),
            Just(GeneratorModel::MasterList { geometric_p: 0.1 })
        ],
        1usize..24,
        1usize..8,
        1usize..5,
        1usize..4,
    )
        .prop_map(|(seed, model, proposers, receivers, list_length, capacity)| {
            let config = GeneratorConfig {
                model,
                proposers,
                receivers,
                list_length,
                capacity,
                lower_quota_fraction: 0.5,
                lower_quota: 1,
                seed,
            };
            generate(&config).unwrap()
        })
}

fn within_quotas(graph: &BipartiteGraph, matching: &Matching) -> bool {
    matching.check_capacities(graph).is_ok()
        && matching
            .pairs()
            .all(|(a, b)| graph.rank(a, b).is_some() && graph.rank(b, a).is_some())
}

proptest! {
    #[test]
    fn stable_matchings_are_stable_and_deterministic(graph in instance()) {
        let snapshot = graph.copy();
        let first = stable_match(&graph).unwrap();
        let second = stable_match(&graph.copy()).unwrap();
        prop_assert!(blocking_pairs(&graph, &first).is_empty());
        prop_assert_eq!(&first, &second);
        prop_assert!(within_quotas(&graph, &first));
        prop_assert_eq!(&graph, &snapshot);
    }

    #[test]
    fn popular_matchings_are_clean_and_at_least_stable_size(graph in instance()) {
        let snapshot = graph.copy();
        let stable = stable_match(&graph).unwrap();
        let popular = popular_match(&graph).unwrap();
        prop_assert!(within_quotas(&graph, &popular));
        prop_assert!(popular.len() >= stable.len());
        for (a, b) in popular.pairs() {
            prop_assert!(graph.proposers().contains(a));
            prop_assert!(graph.receivers().contains(b));
        }
        prop_assert_eq!(&graph, &snapshot);
    }

    #[test]
    fn maximum_cardinality_dominates(graph in instance()) {
        let maximum = max_cardinality_match(&graph).unwrap();
        let popular = popular_match(&graph).unwrap();
        prop_assert!(within_quotas(&graph, &maximum));
        prop_assert!(maximum.len() >= popular.len());
    }

    #[test]
    fn saturation_is_idempotent_and_monotone(graph in instance()) {
        let base = stable_match(&graph.lower_quota_restriction()).unwrap();
        let once = saturate(&graph, &base);
        let twice = saturate(&graph, &once);
        prop_assert_eq!(&once, &twice);
        prop_assert!(within_quotas(&graph, &once));
        for (a, b) in base.pairs() {
            prop_assert_eq!(once.partner(a), Some(b));
        }
    }

    #[test]
    fn saturation_is_envy_free_and_maximal(graph in instance()) {
        let base = stable_match(&graph.lower_quota_restriction()).unwrap();
        let result = saturate(&graph, &base);
        for (r, h) in result.pairs() {
            prop_assert!(!has_envy(&graph, &result, r, h), "{} envied at {}", r, h);
        }
        for r in graph.proposers() {
            if result.is_matched(r) {
                continue;
            }
            for h in graph.preferences(r) {
                let full = result.occupancy(h) >= graph.upper_quota(h).unwrap();
                prop_assert!(full || has_envy(&graph, &result, r, h), "{} could join {}", r, h);
            }
        }
    }
}
