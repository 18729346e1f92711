use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use hr_core::HrError;
use hr_graph::BipartiteGraph;
use hr_match::{max_cardinality_match, popular_match, stable_match, Matching};

use crate::io::{emit_matching, load_graph};

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Graph file (text format, or JSON with a .json extension).
    #[arg(long)]
    pub graph: PathBuf,
    /// CSV output path; rows go to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Stable,
    Popular,
    MaxCardinality,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Stable => "stable",
            Algorithm::Popular => "popular",
            Algorithm::MaxCardinality => "max-card",
        }
    }

    pub fn solve(self, graph: &BipartiteGraph) -> Result<Matching, HrError> {
        match self {
            Algorithm::Stable => stable_match(graph),
            Algorithm::Popular => popular_match(graph),
            Algorithm::MaxCardinality => max_cardinality_match(graph),
        }
    }
}

pub fn run(algorithm: Algorithm, args: &SolveArgs) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(&args.graph)?;
    let matching = algorithm.solve(&graph)?;
    tracing::info!(
        algorithm = algorithm.name(),
        size = matching.len(),
        "computed matching"
    );
    emit_matching(args.out.as_deref(), &graph, &matching)
}
