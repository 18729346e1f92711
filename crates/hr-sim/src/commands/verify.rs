use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use hr_match::{blocking_pairs, blocking_residents};

use crate::io::{load_graph, load_matching};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Graph file.
    #[arg(long)]
    pub graph: PathBuf,
    /// Matching to check, as `proposer,receiver` rows.
    #[arg(long)]
    pub matching: PathBuf,
}

pub fn run(args: &VerifyArgs) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(&args.graph)?;
    let matching = load_matching(&args.matching, &graph)?;
    let pairs = blocking_pairs(&graph, &matching);
    for (proposer, receiver) in &pairs {
        println!("{proposer},{receiver}");
    }
    if pairs.is_empty() {
        println!("matching is stable");
        return Ok(());
    }
    Err(format!(
        "matching is not stable: {} blocking pairs, {} blocking residents",
        pairs.len(),
        blocking_residents(&pairs).len()
    )
    .into())
}
