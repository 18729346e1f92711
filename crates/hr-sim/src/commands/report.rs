use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use hr_graph::canonical_hash;
use hr_match::{compare_matchings, MatchingReport, VoteTally};
use serde::Serialize;

use super::solve::Algorithm;
use crate::io::{emit_text, load_graph};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Graph file.
    #[arg(long)]
    pub graph: PathBuf,
    /// JSON output path; printed when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GraphReport {
    graph_hash: String,
    proposers: usize,
    receivers: usize,
    edges: usize,
    stable: MatchingReport,
    popular: MatchingReport,
    max_card: MatchingReport,
    popular_vs_stable: VoteTally,
}

pub fn run(args: &ReportArgs) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(&args.graph)?;
    let stable = Algorithm::Stable.solve(&graph)?;
    let popular = Algorithm::Popular.solve(&graph)?;
    let max_card = Algorithm::MaxCardinality.solve(&graph)?;
    let report = GraphReport {
        graph_hash: canonical_hash(&graph),
        proposers: graph.proposers().len(),
        receivers: graph.receivers().len(),
        edges: graph.edge_count(),
        stable: MatchingReport::new(&graph, &stable),
        popular: MatchingReport::new(&graph, &popular),
        max_card: MatchingReport::new(&graph, &max_card),
        popular_vs_stable: compare_matchings(&graph, &popular, &stable),
    };
    let json = serde_json::to_string_pretty(&report)?;
    emit_text(args.out.as_deref(), &json)
}
