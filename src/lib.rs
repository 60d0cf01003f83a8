//! Strongly connected components for large CSR graphs.
//!
//! - [`csr::SparseGraph`]: validated compressed-sparse-row digraph
//! - [`scc::tarjan_scc`]: iterative Tarjan, O(V + E), no recursion
//! - [`generator::generate_random_graph`]: seeded random graphs for fuzzing
//! - [`harness::DifferentialHarness`]: checks the solver against petgraph and
//!   dumps a reproduction when they disagree
//!
//! With the `python` feature the crate also builds the `scc_fast` extension
//! module (see `python.rs`).

pub mod artifact;
pub mod config;
pub mod csr;
mod errors;
pub mod generator;
pub mod harness;
pub mod reference;
pub mod scc;

#[cfg(feature = "python")]
mod python;

pub use csr::SparseGraph;
pub use errors::{ArtifactError, ConfigError, GraphError, HarnessError, Mismatch, MismatchKind};
pub use generator::generate_random_graph;
pub use harness::{compare_labelings, DifferentialHarness};
pub use scc::{compute_scc, tarjan_scc, ComponentLabeling};
