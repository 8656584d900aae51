//! The update pass: partition, solve, write back, notify.
//!
//! Components are solved purely (nothing is written while solving), so the
//! solve step can run on the rayon pool when the `parallel` feature is
//! enabled. Results are applied afterwards in component order on the calling
//! thread.

use crate::catalog::Catalog;
use crate::config::SolverConfig;
use crate::constraint::{Solution, build_component};
use crate::event::GraphEvent;
use crate::graph::ProductionGraph;
use crate::id::*;
use crate::node::RateMode;
use crate::solver::SolveError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

static UPDATE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Summary of one update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Components found in the graph.
    pub components: usize,
    /// Components with no feasible solution (zeroed and flagged).
    pub infeasible: usize,
    /// Nothing was written: updates were paused or a solve overflowed.
    pub skipped: bool,
}

/// Rebalance every node and link of `graph`, then queue one
/// [`GraphEvent::ValuesUpdated`].
///
/// Infeasible components are zeroed and their nodes flagged. If any
/// component overflows, no values are written at all and the previous ones
/// stay in place.
pub fn update_node_values(
    graph: &mut ProductionGraph,
    catalog: &Catalog,
    config: &SolverConfig,
) -> UpdateReport {
    let update = UPDATE_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    let mut report = UpdateReport::default();

    if graph.updates_paused() {
        debug!(update, "updates paused, not solving");
        report.skipped = true;
        graph.events_mut().emit(GraphEvent::ValuesUpdated);
        return report;
    }

    let components = graph.connected_components();
    report.components = components.len();
    debug!(update, components = components.len(), "balancing graph");

    let outcomes = solve_components(graph, catalog, config, &components);

    if outcomes.iter().any(|o| matches!(o, Err(SolveError::Overflow))) {
        warn!(update, "numeric overflow while solving, keeping previous values");
        report.skipped = true;
    } else {
        report.infeasible = apply(graph, &components, outcomes);
    }

    graph.events_mut().emit(GraphEvent::ValuesUpdated);
    report
}

/// Build and solve one component without touching the graph.
pub fn solve_component(
    graph: &ProductionGraph,
    catalog: &Catalog,
    config: &SolverConfig,
    component: &[NodeId],
) -> Result<Solution, SolveError> {
    let system = build_component(graph, catalog, component);
    trace!(nodes = component.len(), "constraint system:\n{system}");
    system.solve(config)
}

#[cfg(feature = "parallel")]
fn solve_components(
    graph: &ProductionGraph,
    catalog: &Catalog,
    config: &SolverConfig,
    components: &[Vec<NodeId>],
) -> Vec<Result<Solution, SolveError>> {
    use rayon::prelude::*;

    if config.parallel {
        components
            .par_iter()
            .map(|c| solve_component(graph, catalog, config, c))
            .collect()
    } else {
        components
            .iter()
            .map(|c| solve_component(graph, catalog, config, c))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn solve_components(
    graph: &ProductionGraph,
    catalog: &Catalog,
    config: &SolverConfig,
    components: &[Vec<NodeId>],
) -> Vec<Result<Solution, SolveError>> {
    components
        .iter()
        .map(|c| solve_component(graph, catalog, config, c))
        .collect()
}

/// Write outcomes back. Returns the number of infeasible components.
fn apply(
    graph: &mut ProductionGraph,
    components: &[Vec<NodeId>],
    outcomes: Vec<Result<Solution, SolveError>>,
) -> usize {
    let auto: Vec<NodeId> = graph
        .nodes()
        .filter(|(_, n)| n.rate_mode == RateMode::Auto)
        .map(|(id, _)| id)
        .collect();
    for id in auto {
        if let Ok(node) = graph.node_mut(id) {
            node.actual_rate = 0.0;
        }
    }

    let mut infeasible = 0;
    for (component, outcome) in components.iter().zip(outcomes) {
        match outcome {
            Ok(solution) => write_solution(graph, component, &solution),
            Err(err) => {
                infeasible += 1;
                warn!(nodes = component.len(), %err, "component has no solution, zeroing");
                write_failure(graph, component);
            }
        }
    }
    infeasible
}

fn write_solution(graph: &mut ProductionGraph, component: &[NodeId], solution: &Solution) {
    for &id in component {
        if let Ok(node) = graph.node_mut(id) {
            node.actual_rate = match node.rate_mode {
                RateMode::Manual => node.desired_rate,
                RateMode::Auto => solution.rate(id),
            };
            node.solver_error = false;
        }
        let links = graph.output_links(id).to_vec();
        for link in links {
            if let Some(data) = graph.link_mut(link) {
                data.throughput = solution.throughput(link);
            }
        }
    }
}

fn write_failure(graph: &mut ProductionGraph, component: &[NodeId]) {
    for &id in component {
        if let Ok(node) = graph.node_mut(id) {
            node.actual_rate = 0.0;
            node.solver_error = true;
        }
        let links = graph.output_links(id).to_vec();
        for link in links {
            if let Some(data) = graph.link_mut(link) {
                data.throughput = 0.0;
            }
        }
    }
}
