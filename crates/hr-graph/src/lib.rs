#![deny(missing_docs)]

//! Bipartite preference graphs for capacitated two-sided matching.
//!
//! [`BipartiteGraph`] is the validated, immutable instance shared by every
//! algorithm. Algorithms that shrink preference lists while they run do so on
//! a [`WorkingGraph`], an index arena obtained from
//! [`BipartiteGraph::working_copy`], so the caller's instance stays usable
//! across runs.

mod bipartite;
mod format;
mod generators;
mod hash;
mod serialization;
mod working;

pub use bipartite::{BipartiteGraph, GraphBuilder};
pub use format::{read_graph, read_graph_file, write_graph};
pub use generators::{
    gen_master_list, gen_uniform, generate, generate_batch, GeneratorConfig, GeneratorModel,
};
pub use hash::canonical_hash;
pub use serialization::{graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json};
pub use working::WorkingGraph;
