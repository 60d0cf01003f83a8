// Python bindings (feature "python")
//
// Drop-in for scipy.sparse.csgraph.connected_components(m, connection="strong"):
//
//   from scc_fast import scc
//   count, labels = scc(m.indptr, m.indices)
//
// The arrays are read through numpy views, copied once into u32 buffers and
// the computation runs with the Python thread state detached.

use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::errors::GraphError;
use crate::generator;
use crate::scc;

// Convert GraphError to Python ValueError
impl From<GraphError> for PyErr {
    fn from(err: GraphError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Reject negative entries; numpy index arrays are signed.
fn to_u32(values: &[i32], what: &str) -> PyResult<Vec<u32>> {
    values
        .iter()
        .map(|&v| {
            u32::try_from(v).map_err(|_| {
                PyValueError::new_err(format!("{} contains negative value {}", what, v))
            })
        })
        .collect()
}

/// Strongly connected components of a CSR graph.
///
/// `indptr` is the full scipy row pointer (length N + 1), `indices` the
/// column indices. Returns `(count, labels)` with int32 labels in `[0, count)`.
///
/// Raises ValueError if the arrays are not a valid CSR graph.
#[pyfunction]
#[pyo3(signature = (indptr, indices))]
fn scc<'py>(
    py: Python<'py>,
    indptr: PyReadonlyArray1<'py, i32>,
    indices: PyReadonlyArray1<'py, i32>,
) -> PyResult<(u32, Bound<'py, PyArray1<i32>>)> {
    let row_pointer = to_u32(indptr.as_slice()?, "indptr")?;
    let column_index = to_u32(indices.as_slice()?, "indices")?;
    let node_count = row_pointer.len().saturating_sub(1);

    // Detach Python thread state during graph computation
    let labeling = py.detach(|| scc::compute_scc(node_count, row_pointer, column_index))?;

    // Labels are < node_count, which came from an i32 array
    let labels: Vec<i32> = labeling.labels.into_iter().map(|l| l as i32).collect();
    Ok((labeling.count, labels.into_pyarray(py)))
}

/// Seeded random graph as `(indptr, indices)` int32 arrays, ready for
/// `scipy.sparse.csr_matrix((data, indices, indptr))`.
///
/// Raises ValueError if `k - 1 > n`.
#[pyfunction]
#[pyo3(signature = (n, k, seed))]
fn generate_sparse<'py>(
    py: Python<'py>,
    n: usize,
    k: usize,
    seed: u64,
) -> PyResult<(Bound<'py, PyArray1<i32>>, Bound<'py, PyArray1<i32>>)> {
    let graph = py.detach(|| generator::generate_random_graph(n, k, seed))?;
    let (row_pointer, column_index) = graph.into_parts();
    let to_i32 = |values: Vec<u32>| -> PyResult<Vec<i32>> {
        values
            .into_iter()
            .map(|v| {
                i32::try_from(v)
                    .map_err(|_| PyValueError::new_err("graph too large for int32 indices"))
            })
            .collect()
    };
    Ok((
        to_i32(row_pointer)?.into_pyarray(py),
        to_i32(column_index)?.into_pyarray(py),
    ))
}

#[pymodule]
fn scc_fast(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(scc, m)?)?;
    m.add_function(wrap_pyfunction!(generate_sparse, m)?)?;
    Ok(())
}
