// Strongly connected components over CSR graphs
//
// WHY ITERATIVE:
// The textbook Tarjan recursion uses one call frame per node on the current
// DFS path. A chain of a few million nodes overflows the thread stack long
// before it runs out of heap. Here the recursion is simulated with an
// explicit Vec of (node, edge cursor) frames, so the only limit is memory.
//
// Tarjan's Algorithm:
// 1. Walk the graph depth-first, roots in increasing node id order
// 2. index[v]   = discovery order of v
// 3. lowlink[v] = smallest index reachable from v's DFS subtree through
//                 nodes still on the path stack
// 4. When v finishes and lowlink[v] == index[v], everything above v on the
//    path stack (and v itself) is one SCC
//
// Components are labelled in the order they close, which is a reverse
// topological order of the condensation graph.
//
// Time complexity: O(V + E), every edge is examined exactly once
// Space: three u32 per node plus the two stacks, all O(V)

use tracing::debug;

use crate::csr::SparseGraph;
use crate::errors::GraphError;

/// Marks a node that has not been discovered / not yet labelled.
const UNSET: u32 = u32::MAX;

/// Result of an SCC computation: `labels[v]` is the component of node `v`,
/// every label lies in `[0, count)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComponentLabeling {
    pub count: u32,
    pub labels: Vec<u32>,
}

impl ComponentLabeling {
    pub fn new(count: u32, labels: Vec<u32>) -> Self {
        ComponentLabeling { count, labels }
    }

    /// Build a labeling from explicit member lists (one list per component).
    /// Nodes not mentioned keep the `u32::MAX` sentinel.
    pub fn from_components<I, C>(node_count: usize, components: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = u32>,
    {
        let mut labels = vec![UNSET; node_count];
        let mut count = 0u32;
        for members in components {
            for node in members {
                labels[node as usize] = count;
            }
            count += 1;
        }
        ComponentLabeling { count, labels }
    }

    /// Member lists indexed by label. Members are in increasing node order.
    pub fn components(&self) -> Vec<Vec<u32>> {
        let mut groups: Vec<Vec<u32>> = vec![Vec::new(); self.count as usize];
        for (node, &label) in self.labels.iter().enumerate() {
            groups[label as usize].push(node as u32);
        }
        groups
    }

    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.count as usize];
        for &label in &self.labels {
            sizes[label as usize] += 1;
        }
        sizes
    }

    /// Relabel so components are numbered by their lowest member id: the
    /// component holding node 0 becomes 0, the next unseen one 1, and so on.
    /// Two labelings describe the same partition iff their canonical forms
    /// are equal. `count` is recomputed from the labels.
    pub fn canonical(&self) -> ComponentLabeling {
        let (count, labels) = canonicalize(&self.labels);
        ComponentLabeling { count, labels }
    }

    /// True if `a` and `b` share a component.
    pub fn same_component(&self, a: usize, b: usize) -> bool {
        self.labels[a] == self.labels[b]
    }
}

/// First-occurrence relabeling of an arbitrary label array.
///
/// Input labels may be any `u32` values (an external solver is not trusted
/// to stay within `[0, count)`), so the mapping is a hash map rather than a
/// dense table.
pub fn canonicalize(labels: &[u32]) -> (u32, Vec<u32>) {
    let mut mapping: rustc_hash::FxHashMap<u32, u32> = rustc_hash::FxHashMap::default();
    let mut next = 0u32;
    let canonical: Vec<u32> = labels
        .iter()
        .map(|raw| {
            *mapping.entry(*raw).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect();
    (next, canonical)
}

/// One simulated call frame: the node being expanded and the position of
/// the next outgoing edge to look at.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: u32,
    cursor: u32,
}

/// Compute the strongly connected components of `graph`.
///
/// Never recurses; safe for arbitrarily long paths. Self-loops and parallel
/// edges need no special handling: an edge back to an on-stack node only
/// lowers `lowlink` towards an index that is already a lower bound.
pub fn tarjan_scc(graph: &SparseGraph) -> ComponentLabeling {
    let n = graph.node_count();
    let row_pointer = graph.row_pointer();
    let column_index = graph.column_index();

    let mut index = vec![UNSET; n];
    let mut lowlink = vec![UNSET; n];
    // A node is on the path stack iff it is discovered and still unlabelled
    let mut labels = vec![UNSET; n];

    let mut path: Vec<u32> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut next_index = 0u32;
    let mut count = 0u32;

    for root in 0..n {
        if index[root] != UNSET {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        path.push(root as u32);
        frames.push(Frame {
            node: root as u32,
            cursor: row_pointer[root],
        });

        while let Some(frame) = frames.last_mut() {
            let v = frame.node as usize;

            if frame.cursor < row_pointer[v + 1] {
                let w = column_index[frame.cursor as usize] as usize;
                frame.cursor += 1;

                if index[w] == UNSET {
                    // Tree edge: "recurse" into w
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    path.push(w as u32);
                    frames.push(Frame {
                        node: w as u32,
                        cursor: row_pointer[w],
                    });
                } else if labels[w] == UNSET {
                    // Back or cross edge into the active path
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            // All edges of v examined: "return" from v
            frames.pop();

            if lowlink[v] == index[v] {
                while let Some(w) = path.pop() {
                    labels[w as usize] = count;
                    if w as usize == v {
                        break;
                    }
                }
                count += 1;
            }

            if let Some(parent) = frames.last() {
                let p = parent.node as usize;
                lowlink[p] = lowlink[p].min(lowlink[v]);
            }
        }
    }

    debug!(nodes = n, edges = graph.edge_count(), components = count, "tarjan_scc done");

    ComponentLabeling { count, labels }
}

/// Validate raw CSR arrays and compute their SCCs.
///
/// # Errors
/// Any `GraphError` raised by `SparseGraph::new`; the traversal itself
/// cannot fail.
pub fn compute_scc(
    node_count: usize,
    row_pointer: Vec<u32>,
    column_index: Vec<u32>,
) -> Result<ComponentLabeling, GraphError> {
    let graph = SparseGraph::new(node_count, row_pointer, column_index)?;
    Ok(tarjan_scc(&graph))
}

/// Components with at least `min_size` members, i.e. the non-trivial cycles
/// when `min_size >= 2`.
pub fn find_cycles(graph: &SparseGraph, min_size: usize) -> Vec<Vec<u32>> {
    tarjan_scc(graph)
        .components()
        .into_iter()
        .filter(|members| members.len() >= min_size)
        .collect()
}
