// Differential testing harness
//
// For each seed:
//   1. generate a random CSR graph from (N, k, seed)
//   2. solve it with the primary solver and with the reference
//   3. compare the two labelings up to renaming
//   4. on disagreement, dump the graph and both labelings and stop
//
// COMPARISON:
// Label values are implementation-defined, so raw array equality would
// flag two correct solvers that merely number components differently.
// Both labelings are canonicalized (components numbered by lowest member)
// before comparing; equal canonical arrays <=> identical partitions.
//
// One seed is processed sequentially. Different seeds share nothing, so a
// session can fan them out over rayon without changing any result.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::artifact::{load_graph, persist_mismatch};
use crate::config::HarnessConfig;
use crate::csr::SparseGraph;
use crate::errors::{HarnessError, Mismatch, MismatchKind};
use crate::generator::generate_random_graph;
use crate::reference::{IterativeTarjan, SccSolver};
use crate::scc::ComponentLabeling;

/// Outcome of one agreeing comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub seed: Option<u64>,
    pub node_count: usize,
    pub edge_count: usize,
    pub components: u32,
    pub largest_component: usize,
}

/// Totals over a whole session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub graphs: u64,
    pub nodes: u64,
    pub edges: u64,
    pub components: u64,
    /// Size of the largest component seen in any graph
    pub largest_component: usize,
}

impl SessionSummary {
    fn add(&mut self, run: &RunSummary) {
        self.graphs += 1;
        self.nodes += run.node_count as u64;
        self.edges += run.edge_count as u64;
        self.components += run.components as u64;
        self.largest_component = self.largest_component.max(run.largest_component);
    }
}

/// Check that two labelings describe the same partition.
///
/// # Errors
/// The first difference found: label-array length, then component count,
/// then the first node whose canonical label differs.
pub fn compare_labelings(
    primary: &ComponentLabeling,
    reference: &ComponentLabeling,
) -> Result<(), MismatchKind> {
    if primary.labels.len() != reference.labels.len() {
        return Err(MismatchKind::Length {
            primary: primary.labels.len(),
            reference: reference.labels.len(),
        });
    }
    if primary.count != reference.count {
        return Err(MismatchKind::Count {
            primary: primary.count,
            reference: reference.count,
        });
    }

    let a = primary.canonical();
    let b = reference.canonical();
    match a.labels.iter().zip(&b.labels).position(|(x, y)| x != y) {
        Some(node) => Err(MismatchKind::Partition {
            node,
            primary: a.labels[node],
            reference: b.labels[node],
        }),
        // Equal canonical arrays but a count that disagrees with the labels
        // actually used means one solver misreported its count.
        None if a.count != primary.count => Err(MismatchKind::Count {
            primary: primary.count,
            reference: a.count,
        }),
        None => Ok(()),
    }
}

/// Runs a primary and a reference SCC solver side by side.
pub struct DifferentialHarness {
    config: HarnessConfig,
    primary: Box<dyn SccSolver>,
    reference: Box<dyn SccSolver>,
}

impl DifferentialHarness {
    /// Iterative Tarjan against the reference named in `config`.
    pub fn new(config: HarnessConfig) -> Self {
        let reference = config.reference.solver();
        Self::with_solvers(config, Box::new(IterativeTarjan), reference)
    }

    pub fn with_solvers(
        config: HarnessConfig,
        primary: Box<dyn SccSolver>,
        reference: Box<dyn SccSolver>,
    ) -> Self {
        DifferentialHarness {
            config,
            primary,
            reference,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Generate the graph for `seed`, solve it twice and compare.
    ///
    /// # Errors
    /// - `Graph` if the configured `(N, k)` cannot be generated
    /// - `Mismatch` if the solvers disagree (reproduction already written)
    /// - `Unpersisted` if they disagree and writing the reproduction failed
    pub fn run_seed(&self, seed: u64) -> Result<RunSummary, HarnessError> {
        let graph = generate_random_graph(self.config.node_count, self.config.degree_bound, seed)?;
        let (primary, reference) = self.solve_both(&graph);

        match compare_labelings(&primary, &reference) {
            Ok(()) => {
                debug!(seed, components = primary.count, "solvers agree");
                Ok(summary(Some(seed), &graph, &primary))
            }
            Err(kind) => Err(self.record_mismatch(seed, &graph, &primary, &reference, kind)),
        }
    }

    /// Run every configured iteration, stopping at the first disagreement.
    pub fn run(&self) -> Result<SessionSummary, HarnessError> {
        self.config.validate()?;
        info!(
            nodes = self.config.node_count,
            degree_bound = self.config.degree_bound,
            seed = self.config.seed,
            iterations = self.config.iterations,
            parallel = self.config.parallel,
            primary = self.primary.name(),
            reference = self.reference.name(),
            "starting differential SCC session"
        );

        let run_one = |iteration: u64| self.run_seed(self.config.seed_for(iteration));

        let runs: Vec<RunSummary> = if self.config.parallel {
            (0..self.config.iterations)
                .into_par_iter()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            (0..self.config.iterations)
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut session = SessionSummary::default();
        for run in &runs {
            session.add(run);
        }
        info!(
            graphs = session.graphs,
            edges = session.edges,
            components = session.components,
            "all graphs agree"
        );
        Ok(session)
    }

    /// Re-solve a persisted graph and compare again. Nothing is written.
    pub fn replay(&self, dir: &Path) -> Result<RunSummary, HarnessError> {
        let graph = load_graph(dir)?;
        let (primary, reference) = self.solve_both(&graph);
        match compare_labelings(&primary, &reference) {
            Ok(()) => Ok(summary(None, &graph, &primary)),
            Err(kind) => Err(HarnessError::Mismatch(Box::new(Mismatch {
                seed: None,
                primary: self.primary.name(),
                reference: self.reference.name(),
                kind,
                artifact_dir: dir.to_path_buf(),
                files: Vec::new(),
            }))),
        }
    }

    fn solve_both(&self, graph: &SparseGraph) -> (ComponentLabeling, ComponentLabeling) {
        (self.primary.solve(graph), self.reference.solve(graph))
    }

    fn record_mismatch(
        &self,
        seed: u64,
        graph: &SparseGraph,
        primary: &ComponentLabeling,
        reference: &ComponentLabeling,
        kind: MismatchKind,
    ) -> HarnessError {
        let dir = self.config.artifact_dir.join(format!("seed-{}", seed));
        error!(seed, %kind, dir = %dir.display(), "solvers disagree");

        match persist_mismatch(
            &dir,
            graph,
            self.config.degree_bound,
            seed,
            (self.primary.name(), primary),
            (self.reference.name(), reference),
            &kind,
        ) {
            Ok(files) => HarnessError::Mismatch(Box::new(Mismatch {
                seed: Some(seed),
                primary: self.primary.name(),
                reference: self.reference.name(),
                kind,
                artifact_dir: dir,
                files,
            })),
            Err(source) => HarnessError::Unpersisted { seed, kind, source },
        }
    }
}

fn summary(seed: Option<u64>, graph: &SparseGraph, labeling: &ComponentLabeling) -> RunSummary {
    RunSummary {
        seed,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        components: labeling.count,
        // canonical() keeps labels in range even if a solver's raw ones are not
        largest_component: labeling
            .canonical()
            .component_sizes()
            .into_iter()
            .max()
            .unwrap_or(0),
    }
}
