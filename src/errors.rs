// Error types for graph construction, config loading, artifact persistence
// and the harness.
//
// Every fallible operation returns one of these instead of panicking.
// GraphError converts to Python ValueError via PyO3 (see python.rs).

use std::path::PathBuf;

use thiserror::Error;

/// Malformed CSR input or generator arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("row pointer has length {actual}, expected node_count + 1 = {expected}")]
    RowPointerLength { expected: usize, actual: usize },

    #[error("row pointer must start at 0, got {0}")]
    RowPointerStart(u32),

    #[error("row pointer decreases at node {node}: {start} > {end}")]
    RowPointerDecreasing { node: usize, start: u32, end: u32 },

    #[error("row pointer ends at {row_end} but column index holds {edges} edges")]
    EdgeCountMismatch { row_end: u32, edges: usize },

    #[error("Node index {0} out of bounds (num_nodes: {1})")]
    NodeOutOfBounds(u32, u32),

    #[error("graph too large: {0} does not fit in a u32 index")]
    TooLarge(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Failure to write or reload a reproduction artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed .npy file {path}: {reason}")]
    Npy { path: PathBuf, reason: String },

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("persisted arrays do not form a valid graph: {0}")]
    Graph(#[from] GraphError),
}

/// Failure to read a harness config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Which part of the comparison failed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchKind {
    /// The two solvers returned label arrays of different lengths.
    Length { primary: usize, reference: usize },
    /// Component counts differ.
    Count { primary: u32, reference: u32 },
    /// Same count, different partition. `node` is the first node whose
    /// canonical label differs.
    Partition { node: usize, primary: u32, reference: u32 },
}

impl std::fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MismatchKind::Length { primary, reference } => {
                write!(f, "Different label lengths ({} vs {})", primary, reference)
            }
            MismatchKind::Count { primary, reference } => {
                write!(f, "Different counts ({} vs {})", primary, reference)
            }
            MismatchKind::Partition { node, primary, reference } => write!(
                f,
                "Different arrays: node {} has canonical label {} vs {}",
                node, primary, reference
            ),
        }
    }
}

/// A disagreement between the primary and reference solvers, together
/// with where its reproduction was written.
#[derive(Debug, Clone)]
pub struct Mismatch {
    /// Generator seed, `None` when replaying a persisted graph.
    pub seed: Option<u64>,
    pub primary: &'static str,
    pub reference: &'static str,
    pub kind: MismatchKind,
    pub artifact_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} disagrees with {}", self.primary, self.reference)?;
        if let Some(seed) = self.seed {
            write!(f, " for seed {}", seed)?;
        }
        write!(
            f,
            ": {} (reproduction in {})",
            self.kind,
            self.artifact_dir.display()
        )
    }
}

/// Fatal outcome of a harness run.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("{0}")]
    Mismatch(Box<Mismatch>),

    /// The solvers disagreed but the reproduction could not be written.
    #[error("{kind} for seed {seed}, and persisting the reproduction failed: {source}")]
    Unpersisted {
        seed: u64,
        kind: MismatchKind,
        #[source]
        source: ArtifactError,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl HarnessError {
    /// The mismatch details, if this is a solver disagreement.
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            HarnessError::Mismatch(m) => Some(m),
            _ => None,
        }
    }
}
