use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use hr_graph::{canonical_hash, generate, generate_batch, GeneratorConfig};

use crate::io::store_graph;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML generator configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Output graph file; `.json` selects the JSON encoding.
    #[arg(long)]
    pub out: PathBuf,
    /// Override the seed from the configuration.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of instances; batches write `<stem>_<i>.<ext>` next to `--out`.
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut config: GeneratorConfig = serde_yaml::from_str(&fs::read_to_string(&args.config)?)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.count <= 1 {
        let graph = generate(&config)?;
        store_graph(&args.out, &graph)?;
        println!("{}", canonical_hash(&graph));
        return Ok(());
    }
    for (idx, graph) in generate_batch(&config, args.count)?.iter().enumerate() {
        let path = batch_path(&args.out, idx + 1);
        store_graph(&path, graph)?;
        println!("{} {}", canonical_hash(graph), path.display());
    }
    Ok(())
}

fn batch_path(out: &Path, iteration: usize) -> PathBuf {
    let stem = out
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("instance");
    let name = match out.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}_{iteration}.{ext}"),
        None => format!("{stem}_{iteration}"),
    };
    out.with_file_name(name)
}
