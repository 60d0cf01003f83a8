//! Reproduction artifacts for failing harness runs.
//!
//! A failing graph is written as two NumPy `.npy` arrays so it can be
//! reloaded here (`load_graph`) or from Python with `np.load`:
//!
//! ```text
//! <dir>/indptr.npy          row pointer, length N + 1
//! <dir>/indices.npy         column index, length E
//! <dir>/labels_<name>.npy   one label array per solver
//! <dir>/mismatch.json       seed, sizes, counts, what differed
//! ```
//!
//! Arrays are written as `.npy` v1.0, little-endian `u32` (`<u4`). The
//! reader also accepts non-negative `<i4`, `<i8` and `<u8`, which is what
//! numpy produces for scipy index arrays.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::csr::SparseGraph;
use crate::errors::{ArtifactError, MismatchKind};
use crate::scc::ComponentLabeling;

pub const ROW_POINTER_FILE: &str = "indptr.npy";
pub const COLUMN_INDEX_FILE: &str = "indices.npy";
pub const REPORT_FILE: &str = "mismatch.json";

const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";
/// Header (magic + version + length + dict) is padded to this alignment.
const NPY_ALIGN: usize = 64;

// ============================================================================
// .npy CODEC
// ============================================================================

/// Encode a 1-D `u32` array in `.npy` v1.0 format.
pub fn encode_npy(values: &[u32]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '<u4', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );
    // magic(6) + version(2) + header_len(2) + header + '\n'
    let unpadded = 10 + header.len() + 1;
    let padding = (NPY_ALIGN - unpadded % NPY_ALIGN) % NPY_ALIGN;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');

    let mut out = Vec::with_capacity(10 + header.len() + values.len() * 4);
    out.extend_from_slice(NPY_MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decode a 1-D integer `.npy` array into `u32` values.
///
/// `Err` carries a human-readable reason; `read_npy` attaches the path.
pub fn decode_npy(bytes: &[u8]) -> Result<Vec<u32>, String> {
    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err("missing NUMPY magic".to_string());
    }
    let (header_len, header_start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated header length".to_string());
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        v => return Err(format!("unsupported format version {}", v)),
    };
    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err("truncated header".to_string());
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| "header is not UTF-8".to_string())?;

    let descr = dict_value(header, "descr")
        .and_then(quoted)
        .ok_or_else(|| "header has no descr".to_string())?;
    if dict_value(header, "fortran_order").is_some_and(|v| v.starts_with("True")) {
        return Err("fortran_order arrays are not supported".to_string());
    }
    let len = parse_shape(header)?;

    let width = match descr {
        "<u4" | "<i4" => 4,
        "<u8" | "<i8" => 8,
        other => return Err(format!("unsupported dtype {}", other)),
    };
    let expected = len
        .checked_mul(width)
        .ok_or_else(|| format!("shape ({},) overflows the addressable size", len))?;
    let data = &bytes[data_start..];
    if data.len() != expected {
        return Err(format!(
            "expected {} bytes of data for {} elements, found {}",
            expected,
            len,
            data.len()
        ));
    }

    data.chunks_exact(width)
        .map(|chunk| {
            let value: i128 = match descr {
                "<u4" => u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i128,
                "<i4" => i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i128,
                "<u8" => u64::from_le_bytes(eight(chunk)) as i128,
                _ => i64::from_le_bytes(eight(chunk)) as i128,
            };
            u32::try_from(value).map_err(|_| format!("value {} does not fit in u32", value))
        })
        .collect()
}

fn eight(chunk: &[u8]) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(chunk);
    buf
}

/// Raw text after `'key':` in the header dict, up to the end of the dict.
fn dict_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("'{}':", key);
    let at = header.find(&needle)? + needle.len();
    Some(header[at..].trim_start())
}

/// The first single- or double-quoted string in `raw`.
fn quoted(raw: &str) -> Option<&str> {
    let quote = raw.chars().next().filter(|&c| c == '\'' || c == '"')?;
    let rest = &raw[1..];
    rest.find(quote).map(|end| &rest[..end])
}

fn parse_shape(header: &str) -> Result<usize, String> {
    let raw = dict_value(header, "shape").ok_or_else(|| "header has no shape".to_string())?;
    let open = raw.find('(').ok_or_else(|| "malformed shape".to_string())?;
    let close = raw.find(')').ok_or_else(|| "malformed shape".to_string())?;
    let dims: Vec<&str> = raw[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect();
    match dims.as_slice() {
        [len] => len.parse().map_err(|_| format!("bad shape dimension '{}'", len)),
        _ => Err(format!("expected a 1-D array, got shape ({})", &raw[open + 1..close])),
    }
}

pub fn write_npy(path: &Path, values: &[u32]) -> Result<(), ArtifactError> {
    fs::write(path, encode_npy(values)).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_npy(path: &Path) -> Result<Vec<u32>, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_npy(&bytes).map_err(|reason| ArtifactError::Npy {
        path: path.to_path_buf(),
        reason,
    })
}

// ============================================================================
// GRAPH AND MISMATCH DUMPS
// ============================================================================

/// Solver summary inside `mismatch.json`.
#[derive(Debug, Clone, Serialize)]
pub struct SolverSummary {
    pub name: &'static str,
    pub count: u32,
    pub labels_file: String,
}

/// Contents of `mismatch.json`.
#[derive(Debug, Clone, Serialize)]
pub struct MismatchReport {
    pub seed: u64,
    pub node_count: usize,
    pub degree_bound: usize,
    pub edge_count: usize,
    pub primary: SolverSummary,
    pub reference: SolverSummary,
    pub mismatch: MismatchKind,
}

fn create_dir(dir: &Path) -> Result<(), ArtifactError> {
    fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `indptr.npy` and `indices.npy` for `graph` into `dir`.
pub fn save_graph(dir: &Path, graph: &SparseGraph) -> Result<Vec<PathBuf>, ArtifactError> {
    create_dir(dir)?;
    let row_pointer_path = dir.join(ROW_POINTER_FILE);
    let column_index_path = dir.join(COLUMN_INDEX_FILE);
    write_npy(&row_pointer_path, graph.row_pointer())?;
    write_npy(&column_index_path, graph.column_index())?;
    debug!(dir = %dir.display(), "saved graph arrays");
    Ok(vec![row_pointer_path, column_index_path])
}

/// Reload a graph written by `save_graph` (or by `np.save`).
///
/// # Errors
/// - `Io` / `Npy` if either array is missing or malformed
/// - `Graph` if the arrays are not a valid CSR graph
pub fn load_graph(dir: &Path) -> Result<SparseGraph, ArtifactError> {
    let row_pointer = read_npy(&dir.join(ROW_POINTER_FILE))?;
    let column_index = read_npy(&dir.join(COLUMN_INDEX_FILE))?;
    let node_count = row_pointer.len().saturating_sub(1);
    Ok(SparseGraph::new(node_count, row_pointer, column_index)?)
}

fn write_labels(
    dir: &Path,
    (name, labeling): (&'static str, &ComponentLabeling),
    files: &mut Vec<PathBuf>,
) -> Result<SolverSummary, ArtifactError> {
    let labels_file = format!("labels_{}.npy", name);
    let path = dir.join(&labels_file);
    write_npy(&path, &labeling.labels)?;
    files.push(path);
    Ok(SolverSummary {
        name,
        count: labeling.count,
        labels_file,
    })
}

/// Persist everything needed to replay a disagreement: both graph arrays,
/// both label arrays and the JSON report. Returns every file written.
pub fn persist_mismatch(
    dir: &Path,
    graph: &SparseGraph,
    degree_bound: usize,
    seed: u64,
    primary: (&'static str, &ComponentLabeling),
    reference: (&'static str, &ComponentLabeling),
    kind: &MismatchKind,
) -> Result<Vec<PathBuf>, ArtifactError> {
    let mut files = save_graph(dir, graph)?;

    let primary = write_labels(dir, primary, &mut files)?;
    let reference = write_labels(dir, reference, &mut files)?;

    let report = MismatchReport {
        seed,
        node_count: graph.node_count(),
        degree_bound,
        edge_count: graph.edge_count(),
        primary,
        reference,
        mismatch: kind.clone(),
    };
    let report_path = dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&report_path, json).map_err(|source| ArtifactError::Io {
        path: report_path.clone(),
        source,
    })?;
    files.push(report_path);

    info!(dir = %dir.display(), files = files.len(), "persisted mismatch reproduction");
    Ok(files)
}
