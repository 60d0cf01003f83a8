//! Integration tests for the differential harness
//!
//! Each test uses its own temp directory for reproductions.

use scc_fast::artifact::{load_graph, read_npy, COLUMN_INDEX_FILE, REPORT_FILE, ROW_POINTER_FILE};
use scc_fast::config::HarnessConfig;
use scc_fast::reference::{IterativeTarjan, PetgraphKosaraju, SccSolver};
use scc_fast::{
    compute_scc, generate_random_graph, ComponentLabeling, DifferentialHarness, HarnessError,
    MismatchKind, SparseGraph,
};
use tempfile::TempDir;

/// Claims every node is its own component.
struct AllSingletons;

impl SccSolver for AllSingletons {
    fn name(&self) -> &'static str {
        "all_singletons"
    }

    fn solve(&self, graph: &SparseGraph) -> ComponentLabeling {
        let n = graph.node_count() as u32;
        ComponentLabeling::new(n, (0..n).collect())
    }
}

/// Runs the real solver, then swaps the labels of nodes 0 and 2. The count
/// stays right; the partition is only wrong when the two components differ
/// in membership.
struct SwapsZeroAndTwo;

impl SccSolver for SwapsZeroAndTwo {
    fn name(&self) -> &'static str {
        "swaps_zero_and_two"
    }

    fn solve(&self, graph: &SparseGraph) -> ComponentLabeling {
        let mut labeling = IterativeTarjan.solve(graph);
        if labeling.labels.len() >= 3 {
            let (l0, l2) = (labeling.labels[0], labeling.labels[2]);
            labeling.labels[0] = l2;
            labeling.labels[2] = l0;
        }
        labeling
    }
}

/// Runs the real solver, then moves one node of a multi-node component into
/// another component. The count is unchanged; the partition is not.
struct MovesOneNode;

impl SccSolver for MovesOneNode {
    fn name(&self) -> &'static str {
        "moves_one_node"
    }

    fn solve(&self, graph: &SparseGraph) -> ComponentLabeling {
        let mut labeling = IterativeTarjan.solve(graph);
        let sizes = labeling.component_sizes();
        let moved = (0..labeling.labels.len()).find(|&n| sizes[labeling.labels[n] as usize] > 1);
        if let Some(moved) = moved {
            let from = labeling.labels[moved];
            if let Some(&to) = labeling.labels.iter().find(|&&l| l != from) {
                labeling.labels[moved] = to;
            }
        }
        labeling
    }
}

fn config(dir: &TempDir, node_count: usize, degree_bound: usize) -> HarnessConfig {
    HarnessConfig {
        node_count,
        degree_bound,
        seed: 1,
        iterations: 3,
        artifact_dir: dir.path().to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn test_scenarios_through_compute_scc() {
    // 0->1->2->0, 2->3
    let a = compute_scc(4, vec![0, 1, 2, 4, 4], vec![1, 2, 0, 3]).unwrap();
    assert_eq!(a.count, 2);
    assert_eq!(a.canonical().labels, vec![0, 0, 0, 1]);

    let b = compute_scc(3, vec![0, 0, 0, 0], vec![]).unwrap();
    assert_eq!(b.count, 3);

    let c = compute_scc(1, vec![0, 1], vec![0]).unwrap();
    assert_eq!(c, ComponentLabeling::new(1, vec![0]));

    let d = compute_scc(5, vec![0, 1, 2, 3, 4, 5], vec![1, 2, 3, 4, 0]).unwrap();
    assert_eq!(d.count, 1);

    let e = compute_scc(0, vec![0], vec![]).unwrap();
    assert_eq!(e, ComponentLabeling::default());
}

#[test]
fn test_generated_graphs_agree_with_kosaraju() {
    for seed in 0..20 {
        let graph = generate_random_graph(2_000, 4, seed).unwrap();
        let ours = IterativeTarjan.solve(&graph);
        let theirs = PetgraphKosaraju.solve(&graph);
        assert_eq!(
            scc_fast::compare_labelings(&ours, &theirs),
            Ok(()),
            "seed {}",
            seed
        );
    }
}

#[test]
fn test_count_mismatch_persists_reproduction() {
    let dir = tempfile::tempdir().unwrap();
    // k = 8 on 200 nodes yields a giant component, so singletons are wrong
    let harness = DifferentialHarness::with_solvers(
        config(&dir, 200, 8),
        Box::new(IterativeTarjan),
        Box::new(AllSingletons),
    );

    let err = harness.run().unwrap_err();
    let mismatch = err.mismatch().expect("expected a mismatch");
    assert_eq!(mismatch.seed, Some(1));
    assert!(matches!(mismatch.kind, MismatchKind::Count { .. }));
    assert_eq!(mismatch.artifact_dir, dir.path().join("seed-1"));
    assert_eq!(mismatch.files.len(), 5);
    for file in &mismatch.files {
        assert!(file.exists(), "{} missing", file.display());
    }

    // The dump reloads into exactly the generated graph
    let reloaded = load_graph(&mismatch.artifact_dir).unwrap();
    assert_eq!(reloaded, generate_random_graph(200, 8, 1).unwrap());

    let singletons = read_npy(&mismatch.artifact_dir.join("labels_all_singletons.npy")).unwrap();
    assert_eq!(singletons, (0..200).collect::<Vec<u32>>());

    let report = std::fs::read_to_string(mismatch.artifact_dir.join(REPORT_FILE)).unwrap();
    assert!(report.contains("\"kind\": \"count\""));
}

#[test]
fn test_partition_mismatch_detected() {
    let dir = tempfile::tempdir().unwrap();
    // k = 1: every node is a singleton, so the swap keeps the count and the
    // partition, which the harness must accept.
    let harness = DifferentialHarness::with_solvers(
        config(&dir, 50, 1),
        Box::new(IterativeTarjan),
        Box::new(SwapsZeroAndTwo),
    );
    assert!(harness.run().is_ok());

    // {0,1},{2} becomes {1},{0,2}; canonical labels first differ at node 1
    let graph = SparseGraph::from_edges(3, &[(0, 1), (1, 0)]).unwrap();
    let ours = IterativeTarjan.solve(&graph);
    let theirs = SwapsZeroAndTwo.solve(&graph);
    assert!(matches!(
        scc_fast::compare_labelings(&ours, &theirs),
        Err(MismatchKind::Partition { node: 1, .. })
    ));
}

#[test]
fn test_partition_mismatch_persists_reproduction() {
    let dir = tempfile::tempdir().unwrap();
    // k = 8 on 200 nodes: a giant component plus out-degree-0 singletons
    let harness = DifferentialHarness::with_solvers(
        config(&dir, 200, 8),
        Box::new(IterativeTarjan),
        Box::new(MovesOneNode),
    );

    let err = harness.run().unwrap_err();
    let mismatch = err.mismatch().expect("expected a mismatch");
    let seed = mismatch.seed.expect("generated runs carry a seed");
    let node = match mismatch.kind {
        MismatchKind::Partition { node, .. } => node,
        ref other => panic!("expected a partition mismatch, got {:?}", other),
    };
    assert_eq!(mismatch.artifact_dir, dir.path().join(format!("seed-{}", seed)));
    assert_eq!(mismatch.files.len(), 5);

    let graph = generate_random_graph(200, 8, seed).unwrap();
    let ours = read_npy(&mismatch.artifact_dir.join("labels_tarjan.npy")).unwrap();
    let theirs = read_npy(&mismatch.artifact_dir.join("labels_moves_one_node.npy")).unwrap();
    assert_eq!(ours, IterativeTarjan.solve(&graph).labels);
    assert_eq!(theirs, MovesOneNode.solve(&graph).labels);

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(mismatch.artifact_dir.join(REPORT_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(report["seed"], seed);
    assert_eq!(report["mismatch"]["kind"], "partition");
    assert_eq!(report["mismatch"]["node"], node);
    assert_eq!(report["primary"]["count"], report["reference"]["count"]);
    assert_eq!(report["reference"]["labels_file"], "labels_moves_one_node.npy");
}

#[test]
fn test_default_reference_survives_deep_graphs() {
    let dir = tempfile::tempdir().unwrap();
    // The giant component's DFS runs hundreds of thousands of levels deep,
    // on rayon worker threads with default stacks.
    let harness = DifferentialHarness::new(HarnessConfig {
        node_count: 200_000,
        degree_bound: 6,
        seed: 3,
        iterations: 2,
        parallel: true,
        artifact_dir: dir.path().to_path_buf(),
        ..Default::default()
    });
    let session = harness.run().unwrap();
    assert_eq!(session.graphs, 2);
    assert!(session.largest_component > 100_000);
    assert!(!dir.path().join("seed-3").exists());
}

#[test]
fn test_raw_label_order_is_not_required() {
    // Kosaraju and Tarjan number components differently; only the
    // partition must match.
    let graph = SparseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
    let ours = IterativeTarjan.solve(&graph);
    let theirs = PetgraphKosaraju.solve(&graph);
    assert_eq!(ours.count, theirs.count);
    assert_eq!(scc_fast::compare_labelings(&ours, &theirs), Ok(()));
}

#[test]
fn test_replay_saved_graph() {
    let dir = tempfile::tempdir().unwrap();
    let graph = generate_random_graph(500, 5, 77).unwrap();
    scc_fast::artifact::save_graph(dir.path(), &graph).unwrap();
    assert!(dir.path().join(ROW_POINTER_FILE).exists());
    assert!(dir.path().join(COLUMN_INDEX_FILE).exists());

    let harness = DifferentialHarness::new(config(&dir, 500, 5));
    let run = harness.replay(dir.path()).unwrap();
    assert_eq!(run.seed, None);
    assert_eq!(run.node_count, 500);
    assert_eq!(run.edge_count, graph.edge_count());

    let broken = DifferentialHarness::with_solvers(
        config(&dir, 500, 5),
        Box::new(IterativeTarjan),
        Box::new(AllSingletons),
    );
    match broken.replay(dir.path()) {
        Err(HarnessError::Mismatch(m)) => {
            assert_eq!(m.seed, None);
            assert!(m.files.is_empty());
        }
        other => panic!("expected mismatch, got {:?}", other.map(|r| r.components)),
    }
}

#[test]
fn test_unwritable_artifact_dir_reports_unpersisted() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the artifact directory should go
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, b"").unwrap();

    let harness = DifferentialHarness::with_solvers(
        HarnessConfig {
            artifact_dir: blocker,
            ..config(&dir, 200, 8)
        },
        Box::new(IterativeTarjan),
        Box::new(AllSingletons),
    );
    assert!(matches!(harness.run(), Err(HarnessError::Unpersisted { seed: 1, .. })));
}
