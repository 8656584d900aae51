//! Millwright Core -- the rate-balancing engine for factory production plans.
//!
//! A plan is a graph of suppliers, consumers, pass-throughs and recipe
//! nodes joined by single-item links. This crate computes the processing
//! rate of every node and the throughput of every link that is consistent
//! with recipe ratios, manually fixed rates and flow conservation.
//!
//! # Update Pass
//!
//! Every value-changing edit made through [`planner::Planner`] runs one
//! synchronous pass (see [`balance::update_node_values`]):
//!
//! 1. **Partition** -- split the graph into connected components.
//! 2. **Build** -- turn each component into a linear program
//!    ([`constraint::build_component`]).
//! 3. **Solve** -- two-phase simplex over non-negative reals
//!    ([`solver::LinearProgram`]), optionally on the rayon pool.
//! 4. **Apply** -- write rates and throughputs back, or zero and flag the
//!    component when it has no solution.
//! 5. **Notify** -- queue one [`event::GraphEvent::ValuesUpdated`].
//!
//! # Key Types
//!
//! - [`graph::ProductionGraph`] -- Arena-backed node/link store with
//!   connected-component queries and a pending-event queue.
//! - [`node::NodeKind`] -- The four node variants; [`node::RateContract`]
//!   gives their per-item flow multipliers.
//! - [`catalog::Catalog`] -- Items, recipes, assemblers, modules and beacons,
//!   frozen at build, with missing placeholders created on demand.
//! - [`planner::Planner`] -- Graph + catalog + config with auto-rebalancing
//!   and pause/resume batching.
//! - [`config::SolverConfig`] -- Iteration bound, tolerance, parallelism.

pub mod balance;
pub mod catalog;
pub mod config;
pub mod constraint;
pub mod event;
pub mod graph;
pub mod id;
pub mod node;
pub mod planner;
pub mod solver;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
