#![deny(missing_docs)]
#![doc = "Core identifiers, quotas and error types shared by the matching crates."]

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, HrError};
pub use rng::{derive_substream_seed, RngHandle};

/// Identifier for a vertex of a bipartite preference graph.
///
/// Identifiers are opaque tokens: the engine only compares, orders and hashes
/// them. They are unique within a partition and partitions are disjoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(String);

impl VertexId {
    /// Creates a new identifier from any string-like value.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the textual representation of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VertexId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Inclusive occupancy bounds `(lower, upper)` of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quota {
    lower: usize,
    upper: usize,
}

impl Quota {
    /// Creates a quota, rejecting `lower > upper`.
    pub fn new(lower: usize, upper: usize) -> Result<Self, HrError> {
        if lower > upper {
            return Err(HrError::Graph(
                ErrorInfo::new("invalid-quota", "lower quota exceeds upper quota")
                    .with_context("lower", lower.to_string())
                    .with_context("upper", upper.to_string()),
            ));
        }
        Ok(Self { lower, upper })
    }

    /// Quota with no lower bound and the given upper bound.
    pub const fn upper_only(upper: usize) -> Self {
        Self { lower: 0, upper }
    }

    /// The default `(0, 1)` quota used for undecorated declarations.
    pub const fn unit() -> Self {
        Self::upper_only(1)
    }

    /// Minimum number of partners the vertex should receive.
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// Maximum number of partners the vertex may receive.
    pub fn upper(&self) -> usize {
        self.upper
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self::unit()
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.lower, self.upper)
    }
}

/// Partition a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Partition A: residents, students; the side that proposes.
    Proposer,
    /// Partition B: hospitals, courses; the capacitated side.
    Receiver,
}

impl Side {
    /// Returns the opposite partition.
    pub fn opposite(self) -> Self {
        match self {
            Side::Proposer => Side::Receiver,
            Side::Receiver => Side::Proposer,
        }
    }
}
