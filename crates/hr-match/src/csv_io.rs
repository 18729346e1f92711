use std::io::{Read, Write};

use hr_core::errors::{ErrorInfo, HrError};
use hr_core::VertexId;
use hr_graph::BipartiteGraph;

use crate::matching::Matching;

/// Writes `proposer,receiver` rows without a header, in proposer declaration order.
pub fn write_matching_csv<W: Write>(
    graph: &BipartiteGraph,
    matching: &Matching,
    writer: W,
) -> Result<(), HrError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for (proposer, receiver) in matching.pairs_in_order(graph) {
        csv.write_record([proposer.as_str(), receiver.as_str()])
            .map_err(|err| csv_error("write-csv", err))?;
    }
    csv.flush()
        .map_err(|err| HrError::Serde(ErrorInfo::new("write-csv", err.to_string())))
}

/// Renders the CSV form of `matching` into a string.
pub fn matching_to_csv(graph: &BipartiteGraph, matching: &Matching) -> Result<String, HrError> {
    let mut buffer = Vec::new();
    write_matching_csv(graph, matching, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| HrError::Serde(ErrorInfo::new("write-csv", err.to_string())))
}

/// Reads `proposer,receiver` rows and checks them against `graph`.
pub fn read_matching_csv<R: Read>(graph: &BipartiteGraph, reader: R) -> Result<Matching, HrError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut pairs = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let record = record.map_err(|err| csv_error("read-csv", err))?;
        match (record.get(0), record.get(1), record.len()) {
            (Some(proposer), Some(receiver), 2) => {
                pairs.push((VertexId::new(proposer), VertexId::new(receiver)));
            }
            _ => {
                return Err(HrError::Serde(
                    ErrorInfo::new("read-csv", "expected two columns per row")
                        .with_context("row", (row + 1).to_string()),
                ))
            }
        }
    }
    Matching::from_pairs(graph, pairs)
}

fn csv_error(code: &str, err: csv::Error) -> HrError {
    HrError::Serde(ErrorInfo::new(code, err.to_string()))
}
