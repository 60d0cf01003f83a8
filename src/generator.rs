//! Random CSR graph generation for fuzzing.
//!
//! Every node draws an out-degree `d` uniformly from `[0, k)`, then `d`
//! distinct targets uniformly from `[0, N)` (self-loops allowed), sorted
//! ascending. The expected edge count is `N * (k - 1) / 2`.
//!
//! Seeded with ChaCha8 so a failing graph can be rebuilt from `(N, k, seed)`
//! alone, on any platform. Degrees are drawn as `u64` and targets through
//! `index::sample`'s `u32` path, so the stream never depends on `usize` width.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::csr::SparseGraph;
use crate::errors::GraphError;

/// Generate a reproducible random graph.
///
/// # Arguments
/// * `node_count` - Number of nodes `N`
/// * `degree_bound` - Exclusive upper bound `k` on each node's out-degree
/// * `seed` - ChaCha8 seed; equal arguments always give an identical graph
///
/// # Errors
/// - `InvalidParameter` if `N > 0` and `k - 1 > N` (not enough distinct targets)
/// - `TooLarge` if `N` or the edge count exceed `u32`
pub fn generate_random_graph(
    node_count: usize,
    degree_bound: usize,
    seed: u64,
) -> Result<SparseGraph, GraphError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_with_rng(&mut rng, node_count, degree_bound)
}

/// Same as [`generate_random_graph`] but draws from a caller-supplied RNG.
pub fn generate_with_rng<R: Rng>(
    rng: &mut R,
    node_count: usize,
    degree_bound: usize,
) -> Result<SparseGraph, GraphError> {
    if u32::try_from(node_count).is_err() {
        return Err(GraphError::TooLarge(node_count));
    }
    if node_count > 0 && degree_bound > node_count + 1 {
        return Err(GraphError::InvalidParameter(format!(
            "degree bound {} needs up to {} distinct targets but only {} nodes exist",
            degree_bound,
            degree_bound - 1,
            node_count
        )));
    }

    let mut row_pointer: Vec<u32> = Vec::with_capacity(node_count + 1);
    let mut column_index: Vec<u32> = Vec::with_capacity(edge_capacity_hint(node_count, degree_bound));
    row_pointer.push(0);

    for _ in 0..node_count {
        // k = 0 and k = 1 both mean "no edges"
        let degree = if degree_bound > 1 {
            rng.gen_range(0..degree_bound as u64) as usize
        } else {
            0
        };

        let start = column_index.len();
        column_index.extend(
            index::sample(rng, node_count, degree)
                .into_iter()
                .map(|target| target as u32),
        );
        column_index[start..].sort_unstable();

        let end = u32::try_from(column_index.len())
            .map_err(|_| GraphError::TooLarge(column_index.len()))?;
        row_pointer.push(end);
    }

    debug!(
        nodes = node_count,
        degree_bound,
        edges = column_index.len(),
        "generated random graph"
    );

    SparseGraph::new(node_count, row_pointer, column_index)
}

/// Expected edge count `N * (k - 1) / 2`, capped at the `u32` edge limit.
fn edge_capacity_hint(node_count: usize, degree_bound: usize) -> usize {
    let expected = node_count.saturating_mul(degree_bound.saturating_sub(1)) / 2;
    expected.min(u32::MAX as usize)
}
