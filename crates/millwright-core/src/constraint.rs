//! Turns one connected component into a linear program.
//!
//! Variables: one rate per node and one throughput per link. A link's
//! throughput variable is shared by the output group of its supplier and the
//! input group of its consumer, which is what conserves flow along it.
//!
//! Rows, per node and per item it has links for:
//!
//! ```text
//! sum(throughput of links in group) - multiplier * node_rate = 0
//! ```
//!
//! plus `node_rate = desired_rate` for every Manual node. Items without links
//! add no row.

use crate::catalog::Catalog;
use crate::config::SolverConfig;
use crate::graph::ProductionGraph;
use crate::id::*;
use crate::node::{RateContract, RateMode};
use crate::solver::{LinearProgram, SolveError};
use slotmap::SecondaryMap;
use std::collections::BTreeMap;
use std::fmt;

/// Objective weight of a node-rate variable. Links are free, so the optimum
/// is the smallest set of node rates the rows allow.
const NODE_RATE_COST: f64 = 1.0;

// ---------------------------------------------------------------------------
// ConstraintSystem
// ---------------------------------------------------------------------------

/// Variables and rows for one component, ready to solve.
#[derive(Debug, Clone)]
pub struct ConstraintSystem {
    program: LinearProgram,
    node_vars: SecondaryMap<NodeId, usize>,
    link_vars: SecondaryMap<LinkId, usize>,
    scale_hint: f64,
}

impl Default for ConstraintSystem {
    fn default() -> Self {
        Self {
            program: LinearProgram::new(),
            node_vars: SecondaryMap::new(),
            link_vars: SecondaryMap::new(),
            scale_hint: 1.0,
        }
    }
}

impl ConstraintSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate variable of `node`, allocated on first use.
    pub fn add_node(&mut self, node: NodeId) -> usize {
        if let Some(&var) = self.node_vars.get(node) {
            return var;
        }
        let var = self
            .program
            .add_variable(format!("rate{node:?}"), NODE_RATE_COST);
        self.node_vars.insert(node, var);
        var
    }

    /// Throughput variable of `link`, allocated on first use.
    pub fn add_link(&mut self, link: LinkId) -> usize {
        if let Some(&var) = self.link_vars.get(link) {
            return var;
        }
        let var = self.program.add_variable(format!("flow{link:?}"), 0.0);
        self.link_vars.insert(link, var);
        var
    }

    /// Fix `node`'s rate.
    pub fn add_target(&mut self, node: NodeId, rate: f64) {
        let var = self.add_node(node);
        self.program
            .add_equality(format!("target{node:?}"), vec![(var, 1.0)], rate);
    }

    /// `sum(links) = multiplier * rate(node)` for links entering `node`.
    pub fn add_input_ratio(&mut self, node: NodeId, item: ItemId, links: &[LinkId], multiplier: f64) {
        self.add_ratio("in", node, item, links, multiplier);
    }

    /// `sum(links) = multiplier * rate(node)` for links leaving `node`.
    pub fn add_output_ratio(&mut self, node: NodeId, item: ItemId, links: &[LinkId], multiplier: f64) {
        self.add_ratio("out", node, item, links, multiplier);
    }

    fn add_ratio(&mut self, side: &str, node: NodeId, item: ItemId, links: &[LinkId], multiplier: f64) {
        if links.is_empty() {
            return;
        }
        let node_var = self.add_node(node);
        let mut coeffs: Vec<(usize, f64)> = links.iter().map(|&l| (self.add_link(l), 1.0)).collect();
        coeffs.push((node_var, -multiplier));
        self.program
            .add_equality(format!("{side}{node:?}/{item:?}"), coeffs, 0.0);
    }

    /// Raise the conditioning hint passed to the solver. Never lowers it.
    pub fn widen_scale_hint(&mut self, hint: f64) {
        if hint.is_finite() && hint > self.scale_hint {
            self.scale_hint = hint;
        }
    }

    pub fn scale_hint(&self) -> f64 {
        self.scale_hint
    }

    pub fn variable_count(&self) -> usize {
        self.program.variable_count()
    }

    pub fn constraint_count(&self) -> usize {
        self.program.constraint_count()
    }

    /// Solve the system. Never mutates the graph.
    pub fn solve(&self, config: &SolverConfig) -> Result<Solution, SolveError> {
        let values = self.program.solve(config, self.scale_hint)?;

        let mut solution = Solution::default();
        for (node, &var) in &self.node_vars {
            solution.node_rates.insert(node, values[var]);
        }
        for (link, &var) in &self.link_vars {
            solution.throughputs.insert(link, values[var]);
        }
        Ok(solution)
    }
}

impl fmt::Display for ConstraintSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} variables, {} rows, scale hint {}",
            self.variable_count(),
            self.constraint_count(),
            self.scale_hint
        )?;
        write!(f, "{}", self.program)
    }
}

// ---------------------------------------------------------------------------
// Solution
// ---------------------------------------------------------------------------

/// Solved rates for one component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    node_rates: SecondaryMap<NodeId, f64>,
    throughputs: SecondaryMap<LinkId, f64>,
}

impl Solution {
    /// Solved rate of `node`; 0 for nodes outside the component.
    pub fn rate(&self, node: NodeId) -> f64 {
        self.node_rates.get(node).copied().unwrap_or(0.0)
    }

    /// Solved throughput of `link`; 0 for links outside the component.
    pub fn throughput(&self, link: LinkId) -> f64 {
        self.throughputs.get(link).copied().unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Emit the variables and rows for `component`.
///
/// A link whose item the endpoint does not touch gets a zero multiplier,
/// which pins its throughput to 0.
pub fn build_component(graph: &ProductionGraph, catalog: &Catalog, component: &[NodeId]) -> ConstraintSystem {
    let mut system = ConstraintSystem::new();

    for &id in component {
        let Some(node) = graph.node(id) else {
            continue;
        };
        system.add_node(id);
        system.widen_scale_hint(node.max_io_ratio(catalog));

        for (item, links) in group_by_item(graph, graph.input_links(id)) {
            let multiplier = node.input_rate_for(catalog, item).unwrap_or(0.0);
            system.add_input_ratio(id, item, &links, multiplier);
        }
        for (item, links) in group_by_item(graph, graph.output_links(id)) {
            let multiplier = node.output_rate_for(catalog, item).unwrap_or(0.0);
            system.add_output_ratio(id, item, &links, multiplier);
        }

        if node.rate_mode == RateMode::Manual {
            system.add_target(id, node.desired_rate);
        }
    }

    system
}

fn group_by_item(graph: &ProductionGraph, links: &[LinkId]) -> BTreeMap<ItemId, Vec<LinkId>> {
    let mut groups: BTreeMap<ItemId, Vec<LinkId>> = BTreeMap::new();
    for &link in links {
        if let Some(data) = graph.link(link) {
            groups.entry(data.item).or_default().push(link);
        }
    }
    groups
}
