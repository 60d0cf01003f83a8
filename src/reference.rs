// SCC solvers behind a common interface
//
// The harness only needs "graph in, (count, labels) out". The primary
// solver is the iterative Tarjan in scc.rs; the references come from
// petgraph, an independent codebase, so a shared bug is unlikely.
//
// Kosaraju is the default reference because it is a different algorithm
// altogether (two passes, reversed graph), not just another Tarjan.

use petgraph::algo::{kosaraju_scc, tarjan_scc as petgraph_tarjan};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::csr::SparseGraph;
use crate::scc::{tarjan_scc, ComponentLabeling};

/// Anything that can compute a component labeling for a CSR graph.
pub trait SccSolver: Send + Sync {
    /// Short identifier used in logs and artifact file names.
    fn name(&self) -> &'static str;

    fn solve(&self, graph: &SparseGraph) -> ComponentLabeling;
}

/// The crate's own iterative Tarjan.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterativeTarjan;

impl SccSolver for IterativeTarjan {
    fn name(&self) -> &'static str {
        "tarjan"
    }

    fn solve(&self, graph: &SparseGraph) -> ComponentLabeling {
        tarjan_scc(graph)
    }
}

/// `petgraph::algo::kosaraju_scc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PetgraphKosaraju;

impl SccSolver for PetgraphKosaraju {
    fn name(&self) -> &'static str {
        "petgraph_kosaraju"
    }

    fn solve(&self, graph: &SparseGraph) -> ComponentLabeling {
        let digraph = to_digraph(graph);
        let sccs = kosaraju_scc(&digraph);
        labeling_from_sccs(graph.node_count(), sccs)
    }
}

/// `petgraph::algo::tarjan_scc`.
///
/// petgraph's Tarjan recurses once per DFS level, so a long path exhausts
/// the thread stack. Only use it on small graphs (property tests, benches);
/// it is not offered as a harness reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct PetgraphTarjan;

impl SccSolver for PetgraphTarjan {
    fn name(&self) -> &'static str {
        "petgraph_tarjan"
    }

    fn solve(&self, graph: &SparseGraph) -> ComponentLabeling {
        let digraph = to_digraph(graph);
        let sccs = petgraph_tarjan(&digraph);
        labeling_from_sccs(graph.node_count(), sccs)
    }
}

/// Reference solver selectable from config / CLI. Every variant must run
/// without recursion so the harness survives graphs of any depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    #[default]
    Kosaraju,
}

impl ReferenceKind {
    pub fn solver(self) -> Box<dyn SccSolver> {
        match self {
            ReferenceKind::Kosaraju => Box::new(PetgraphKosaraju),
        }
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kosaraju" => Ok(ReferenceKind::Kosaraju),
            "tarjan" => Err(
                "petgraph's tarjan_scc is recursive and overflows the stack on deep graphs; use kosaraju"
                    .to_string(),
            ),
            other => Err(format!("unknown reference solver '{}' (kosaraju)", other)),
        }
    }
}

/// Copy the CSR arrays into a petgraph `DiGraph`. Node `i` becomes
/// `NodeIndex(i)` because nodes are added in order.
fn to_digraph(graph: &SparseGraph) -> DiGraph<(), ()> {
    let mut digraph: DiGraph<(), ()> =
        DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    for _ in 0..graph.node_count() {
        digraph.add_node(());
    }
    for (src, dst) in graph.edges() {
        digraph.add_edge(NodeIndex::new(src as usize), NodeIndex::new(dst as usize), ());
    }
    digraph
}

fn labeling_from_sccs(node_count: usize, sccs: Vec<Vec<NodeIndex>>) -> ComponentLabeling {
    ComponentLabeling::from_components(
        node_count,
        sccs.into_iter()
            .map(|scc| scc.into_iter().map(|node| node.index() as u32)),
    )
}
