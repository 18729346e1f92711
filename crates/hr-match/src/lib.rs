#![deny(missing_docs)]

//! Matching algorithms for capacitated two-sided preference graphs.
//!
//! The stable engine ([`stable_match`]) is capacitated deferred acceptance.
//! [`popular_match`] reuses it on a two-level augmentation of the input.
//! [`max_cardinality_match`] blows receivers up into unit clones and runs a
//! [`MaximumMatcher`]. [`saturate`] extends a matching without creating
//! justified envy, and [`blocking_pairs`] checks stability of any matching.

mod blowup;
mod csv_io;
mod envy_free;
mod matching;
mod max_matching;
mod popular;
mod stable;
pub mod stats;
mod verify;

pub use blowup::{
    blow_up, max_cardinality_match, max_cardinality_match_with, project_max_cardinality,
    BlownUpGraph,
};
pub use csv_io::{matching_to_csv, read_matching_csv, write_matching_csv};
pub use envy_free::{has_envy, saturate};
pub use matching::Matching;
pub use max_matching::{HopcroftKarp, MaximumMatcher};
pub use popular::{augment, popular_match, AugmentedGraph};
pub use stable::{run_deferred_acceptance, stable_match, Assignment};
pub use stats::{compare_matchings, MatchingReport, VoteTally};
pub use verify::{blocking_pairs, blocking_residents, is_stable};
