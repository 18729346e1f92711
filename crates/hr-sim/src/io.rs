use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path;

use hr_graph::{graph_from_json, graph_to_json, read_graph_file, write_graph, BipartiteGraph};
use hr_match::{read_matching_csv, write_matching_csv, Matching};

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

/// Loads a graph from the text format, or from JSON for `.json` files.
pub fn load_graph(path: &Path) -> Result<BipartiteGraph, Box<dyn Error>> {
    let graph = if is_json(path) {
        graph_from_json(&fs::read_to_string(path)?)?
    } else {
        read_graph_file(path)?
    };
    tracing::info!(
        path = %path.display(),
        proposers = graph.proposers().len(),
        receivers = graph.receivers().len(),
        "loaded graph"
    );
    Ok(graph)
}

/// Writes a graph in the format implied by the extension of `path`.
pub fn store_graph(path: &Path, graph: &BipartiteGraph) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let body = if is_json(path) {
        graph_to_json(graph)?
    } else {
        write_graph(graph)
    };
    fs::write(path, body)?;
    Ok(())
}

pub fn load_matching(path: &Path, graph: &BipartiteGraph) -> Result<Matching, Box<dyn Error>> {
    let file = File::open(path)?;
    Ok(read_matching_csv(graph, BufReader::new(file))?)
}

/// Writes the CSV rows to `out`, or to stdout when no path is given.
pub fn emit_matching(
    out: Option<&Path>,
    graph: &BipartiteGraph,
    matching: &Matching,
) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => write_matching_csv(graph, matching, File::create(path)?)?,
        None => write_matching_csv(graph, matching, io::stdout().lock())?,
    }
    Ok(())
}

/// Writes `body` to `out`, or prints it when no path is given.
pub fn emit_text(out: Option<&Path>, body: &str) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => fs::write(path, body)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
