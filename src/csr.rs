// Compressed sparse row (CSR) directed graph
//
// Layout:
//   row_pointer  = prefix sum of out-degrees, length V+1, row_pointer[0] = 0
//   column_index = concatenated neighbour lists, length E
//   neighbors(v) = column_index[row_pointer[v] .. row_pointer[v+1]]
//
// Neighbour lists are taken as given: duplicates, self-loops and unsorted
// lists are all legal. Only the structural invariants above are checked.

use crate::errors::GraphError;

/// Immutable directed graph in CSR form. Node ids and offsets are `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseGraph {
    row_pointer: Vec<u32>,
    column_index: Vec<u32>,
}

impl SparseGraph {
    /// Build a graph from raw CSR arrays.
    ///
    /// # Errors
    /// - `RowPointerLength` if `row_pointer.len() != node_count + 1`
    /// - `RowPointerStart` if `row_pointer[0] != 0`
    /// - `RowPointerDecreasing` if offsets ever go backwards
    /// - `EdgeCountMismatch` if the last offset is not `column_index.len()`
    /// - `NodeOutOfBounds` if any target is `>= node_count`
    pub fn new(
        node_count: usize,
        row_pointer: Vec<u32>,
        column_index: Vec<u32>,
    ) -> Result<Self, GraphError> {
        let n = u32::try_from(node_count).map_err(|_| GraphError::TooLarge(node_count))?;
        if u32::try_from(column_index.len()).is_err() {
            return Err(GraphError::TooLarge(column_index.len()));
        }

        if row_pointer.len() != node_count + 1 {
            return Err(GraphError::RowPointerLength {
                expected: node_count + 1,
                actual: row_pointer.len(),
            });
        }
        if row_pointer[0] != 0 {
            return Err(GraphError::RowPointerStart(row_pointer[0]));
        }
        for (node, pair) in row_pointer.windows(2).enumerate() {
            if pair[0] > pair[1] {
                return Err(GraphError::RowPointerDecreasing {
                    node,
                    start: pair[0],
                    end: pair[1],
                });
            }
        }
        let row_end = row_pointer[node_count];
        if row_end as usize != column_index.len() {
            return Err(GraphError::EdgeCountMismatch {
                row_end,
                edges: column_index.len(),
            });
        }
        if let Some(&bad) = column_index.iter().find(|&&dst| dst >= n) {
            return Err(GraphError::NodeOutOfBounds(bad, n));
        }

        Ok(SparseGraph {
            row_pointer,
            column_index,
        })
    }

    /// Build a graph from an edge list. Each source keeps its edges in
    /// input order.
    ///
    /// # Errors
    /// - `NodeOutOfBounds` if any endpoint is `>= node_count`
    pub fn from_edges(node_count: usize, edges: &[(u32, u32)]) -> Result<Self, GraphError> {
        let n = u32::try_from(node_count).map_err(|_| GraphError::TooLarge(node_count))?;
        for &(src, dst) in edges {
            if src >= n {
                return Err(GraphError::NodeOutOfBounds(src, n));
            }
            if dst >= n {
                return Err(GraphError::NodeOutOfBounds(dst, n));
            }
        }
        if u32::try_from(edges.len()).is_err() {
            return Err(GraphError::TooLarge(edges.len()));
        }

        // Counting sort by source
        let mut row_pointer = vec![0u32; node_count + 1];
        for &(src, _) in edges {
            row_pointer[src as usize + 1] += 1;
        }
        for i in 0..node_count {
            row_pointer[i + 1] += row_pointer[i];
        }

        let mut cursor: Vec<u32> = row_pointer[..node_count].to_vec();
        let mut column_index = vec![0u32; edges.len()];
        for &(src, dst) in edges {
            let slot = &mut cursor[src as usize];
            column_index[*slot as usize] = dst;
            *slot += 1;
        }

        Self::new(node_count, row_pointer, column_index)
    }

    /// Build a graph from one neighbour list per node.
    pub fn from_adjacency(adjacency: &[Vec<u32>]) -> Result<Self, GraphError> {
        let mut row_pointer = Vec::with_capacity(adjacency.len() + 1);
        let mut column_index = Vec::new();
        row_pointer.push(0u32);
        for neighbors in adjacency {
            column_index.extend_from_slice(neighbors);
            let end = u32::try_from(column_index.len())
                .map_err(|_| GraphError::TooLarge(column_index.len()))?;
            row_pointer.push(end);
        }
        Self::new(adjacency.len(), row_pointer, column_index)
    }

    /// The empty graph (no nodes, no edges).
    pub fn empty() -> Self {
        SparseGraph {
            row_pointer: vec![0],
            column_index: Vec::new(),
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.row_pointer.len() - 1
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.column_index.len()
    }

    /// Offset range of `node`'s neighbours inside `column_index`.
    #[inline]
    fn edge_range(&self, node: usize) -> std::ops::Range<usize> {
        self.row_pointer[node] as usize..self.row_pointer[node + 1] as usize
    }

    #[inline]
    pub fn neighbors(&self, node: usize) -> &[u32] {
        &self.column_index[self.edge_range(node)]
    }

    #[inline]
    pub fn out_degree(&self, node: usize) -> usize {
        (self.row_pointer[node + 1] - self.row_pointer[node]) as usize
    }

    /// All edges as `(source, target)` pairs in CSR order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.node_count()).flat_map(move |src| {
            self.neighbors(src).iter().map(move |&dst| (src as u32, dst))
        })
    }

    pub fn row_pointer(&self) -> &[u32] {
        &self.row_pointer
    }

    pub fn column_index(&self) -> &[u32] {
        &self.column_index
    }

    pub fn into_parts(self) -> (Vec<u32>, Vec<u32>) {
        (self.row_pointer, self.column_index)
    }
}

impl Default for SparseGraph {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod validation {
        use super::*;

        #[test]
        fn test_accepts_valid_arrays() {
            let g = SparseGraph::new(3, vec![0, 2, 2, 3], vec![1, 2, 0]).unwrap();
            assert_eq!(g.node_count(), 3);
            assert_eq!(g.edge_count(), 3);
            assert_eq!(g.neighbors(0), &[1, 2]);
            assert!(g.neighbors(1).is_empty());
            assert_eq!(g.neighbors(2), &[0]);
        }

        #[test]
        fn test_empty_graph() {
            let g = SparseGraph::new(0, vec![0], vec![]).unwrap();
            assert_eq!(g.node_count(), 0);
            assert_eq!(g, SparseGraph::empty());
        }

        #[test]
        fn test_row_pointer_length() {
            let err = SparseGraph::new(3, vec![0, 1, 2], vec![0, 1]).unwrap_err();
            assert_eq!(err, GraphError::RowPointerLength { expected: 4, actual: 3 });

            let err = SparseGraph::new(0, vec![], vec![]).unwrap_err();
            assert_eq!(err, GraphError::RowPointerLength { expected: 1, actual: 0 });
        }

        #[test]
        fn test_row_pointer_start() {
            let err = SparseGraph::new(1, vec![1, 1], vec![0]).unwrap_err();
            assert_eq!(err, GraphError::RowPointerStart(1));
        }

        #[test]
        fn test_row_pointer_decreasing() {
            let err = SparseGraph::new(3, vec![0, 2, 1, 2], vec![0, 1]).unwrap_err();
            assert_eq!(err, GraphError::RowPointerDecreasing { node: 1, start: 2, end: 1 });
        }

        #[test]
        fn test_edge_count_mismatch() {
            let err = SparseGraph::new(2, vec![0, 1, 1], vec![0, 1]).unwrap_err();
            assert_eq!(err, GraphError::EdgeCountMismatch { row_end: 1, edges: 2 });
        }

        #[test]
        fn test_target_out_of_bounds() {
            let err = SparseGraph::new(2, vec![0, 1, 2], vec![1, 2]).unwrap_err();
            assert_eq!(err, GraphError::NodeOutOfBounds(2, 2));
        }

        #[test]
        fn test_duplicates_and_self_loops_tolerated() {
            let g = SparseGraph::new(2, vec![0, 3, 3], vec![1, 1, 0]).unwrap();
            assert_eq!(g.neighbors(0), &[1, 1, 0]);
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn test_from_edges_groups_by_source() {
            let g = SparseGraph::from_edges(4, &[(2, 3), (0, 1), (2, 0), (1, 2)]).unwrap();
            assert_eq!(g.row_pointer(), &[0, 1, 2, 4, 4]);
            assert_eq!(g.neighbors(2), &[3, 0]);
        }

        #[test]
        fn test_from_edges_out_of_bounds() {
            let err = SparseGraph::from_edges(2, &[(0, 1), (5, 0)]).unwrap_err();
            assert_eq!(err, GraphError::NodeOutOfBounds(5, 2));
        }

        #[test]
        fn test_from_adjacency_matches_from_edges() {
            let adj = vec![vec![1], vec![2], vec![0, 3], vec![]];
            let a = SparseGraph::from_adjacency(&adj).unwrap();
            let b = SparseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 0), (2, 3)]).unwrap();
            assert_eq!(a, b);
        }

        #[test]
        fn test_edges_iterator() {
            let g = SparseGraph::from_edges(3, &[(0, 1), (0, 0), (2, 1)]).unwrap();
            let edges: Vec<_> = g.edges().collect();
            assert_eq!(edges, vec![(0, 1), (0, 0), (2, 1)]);
            assert_eq!(g.out_degree(0), 2);
            assert_eq!(g.out_degree(1), 0);
        }
    }
}
