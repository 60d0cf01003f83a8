//! Property tests for the SCC solver
//!
//! Random small graphs are checked against a brute-force reachability
//! oracle (transitive closure), so these do not depend on any other SCC
//! implementation being right.

use proptest::prelude::*;
use scc_fast::reference::{PetgraphKosaraju, PetgraphTarjan, SccSolver};
use scc_fast::{compare_labelings, tarjan_scc, ComponentLabeling, SparseGraph};

/// reach[i][j] = j is reachable from i (every node reaches itself).
fn reachability(n: usize, edges: &[(u32, u32)]) -> Vec<Vec<bool>> {
    let mut reach = vec![vec![false; n]; n];
    for (i, row) in reach.iter_mut().enumerate() {
        row[i] = true;
    }
    for &(src, dst) in edges {
        reach[src as usize][dst as usize] = true;
    }
    // Floyd-Warshall closure
    for k in 0..n {
        for i in 0..n {
            if reach[i][k] {
                for j in 0..n {
                    if reach[k][j] {
                        reach[i][j] = true;
                    }
                }
            }
        }
    }
    reach
}

/// Node count plus an edge list over those nodes.
fn arb_graph() -> impl Strategy<Value = (usize, Vec<(u32, u32)>)> {
    (1usize..24).prop_flat_map(|n| {
        let edge = (0..n as u32, 0..n as u32);
        (Just(n), prop::collection::vec(edge, 0..n * 3))
    })
}

fn solve(n: usize, edges: &[(u32, u32)]) -> ComponentLabeling {
    tarjan_scc(&SparseGraph::from_edges(n, edges).unwrap())
}

proptest! {
    #[test]
    fn same_label_iff_mutually_reachable((n, edges) in arb_graph()) {
        let result = solve(n, &edges);
        let reach = reachability(n, &edges);
        for i in 0..n {
            for j in 0..n {
                let mutual = reach[i][j] && reach[j][i];
                prop_assert_eq!(result.same_component(i, j), mutual, "nodes {} and {}", i, j);
            }
        }
    }

    #[test]
    fn count_within_bounds((n, edges) in arb_graph()) {
        let result = solve(n, &edges);
        prop_assert!(result.count >= 1);
        prop_assert!(result.count as usize <= n);
        prop_assert!(result.labels.iter().all(|&l| l < result.count));
    }

    #[test]
    fn self_loop_invariance((n, edges) in arb_graph(), node in 0usize..24) {
        let node = (node % n) as u32;
        let mut looped = edges.clone();
        looped.push((node, node));
        let plain = solve(n, &edges);
        let with_loop = solve(n, &looped);
        prop_assert_eq!(compare_labelings(&plain, &with_loop), Ok(()));
    }

    #[test]
    fn duplicate_edge_invariance((n, edges) in arb_graph(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!edges.is_empty());
        let mut doubled = edges.clone();
        doubled.push(edges[pick.index(edges.len())]);
        let plain = solve(n, &edges);
        let with_dup = solve(n, &doubled);
        prop_assert_eq!(compare_labelings(&plain, &with_dup), Ok(()));
    }

    #[test]
    fn isolated_node_is_singleton((n, edges) in arb_graph()) {
        // Append one node that no edge touches
        let result = solve(n + 1, &edges);
        let isolated = n;
        let label = result.labels[isolated];
        prop_assert_eq!(result.labels.iter().filter(|&&l| l == label).count(), 1);
    }

    #[test]
    fn agrees_with_petgraph((n, edges) in arb_graph()) {
        let graph = SparseGraph::from_edges(n, &edges).unwrap();
        let ours = tarjan_scc(&graph);
        prop_assert_eq!(compare_labelings(&ours, &PetgraphKosaraju.solve(&graph)), Ok(()));
        prop_assert_eq!(compare_labelings(&ours, &PetgraphTarjan.solve(&graph)), Ok(()));
    }
}

#[test]
fn test_empty_graph_has_no_components() {
    let result = tarjan_scc(&SparseGraph::empty());
    assert_eq!(result.count, 0);
    assert!(result.labels.is_empty());
}
