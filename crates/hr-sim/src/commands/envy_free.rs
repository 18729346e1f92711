use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use hr_match::{saturate, stable_match, stats};

use crate::io::{emit_matching, load_graph, load_matching};

#[derive(Args, Debug)]
pub struct EnvyFreeArgs {
    /// Graph file.
    #[arg(long)]
    pub graph: PathBuf,
    /// Matching to extend; defaults to the stable matching of the lower-quota restriction.
    #[arg(long)]
    pub matching: Option<PathBuf>,
    /// CSV output path; rows go to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &EnvyFreeArgs) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(&args.graph)?;
    let base = match &args.matching {
        Some(path) => load_matching(path, &graph)?,
        None => stable_match(&graph.lower_quota_restriction())?,
    };
    let saturated = saturate(&graph, &base);
    tracing::info!(
        base = base.len(),
        saturated = saturated.len(),
        deficiency = stats::total_deficiency(&graph, &saturated),
        "saturated matching"
    );
    emit_matching(args.out.as_deref(), &graph, &saturated)
}
