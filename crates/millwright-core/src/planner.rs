//! The top-level planner: a graph, the catalog it is read against, and the
//! solver settings, with automatic rebalancing after every value-changing
//! edit.

use crate::balance::{UpdateReport, update_node_values};
use crate::catalog::Catalog;
use crate::config::SolverConfig;
use crate::event::GraphEvent;
use crate::graph::{GraphError, Link, ProductionGraph};
use crate::id::*;
use crate::node::*;

/// Owns the graph and rebalances it synchronously after each edit.
///
/// Edits made while updates are paused are batched; [`Planner::resume_updates`]
/// runs one pass covering all of them.
#[derive(Debug)]
pub struct Planner {
    graph: ProductionGraph,
    catalog: Catalog,
    config: SolverConfig,
}

impl Planner {
    pub fn new(catalog: Catalog, config: SolverConfig) -> Self {
        Self::with_graph(ProductionGraph::new(), catalog, config)
    }

    /// Wrap an existing graph. No pass is run until the next edit.
    pub fn with_graph(graph: ProductionGraph, catalog: Catalog, config: SolverConfig) -> Self {
        Self {
            graph,
            catalog,
            config,
        }
    }

    pub fn graph(&self) -> &ProductionGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable catalog access, e.g. for creating missing placeholders during
    /// import.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Graph and catalog borrowed together, for bulk edits that read one
    /// while writing the other. Does not rebalance.
    pub fn parts_mut(&mut self) -> (&mut ProductionGraph, &mut Catalog) {
        (&mut self.graph, &mut self.catalog)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
        self.refresh();
    }

    pub fn into_parts(self) -> (ProductionGraph, Catalog, SolverConfig) {
        (self.graph, self.catalog, self.config)
    }

    // -----------------------------------------------------------------------
    // Topology edits
    // -----------------------------------------------------------------------

    pub fn create_supplier(&mut self, item: ItemId, position: Position) -> NodeId {
        let node = self.graph.create_supplier(item, position);
        self.refresh();
        node
    }

    pub fn create_consumer(&mut self, item: ItemId, position: Position) -> NodeId {
        let node = self.graph.create_consumer(item, position);
        self.refresh();
        node
    }

    pub fn create_passthrough(&mut self, item: ItemId, position: Position) -> NodeId {
        let node = self.graph.create_passthrough(item, position);
        self.refresh();
        node
    }

    /// Create a recipe node. A burner assembler without an explicit fuel gets
    /// the catalog's default fuel.
    pub fn create_recipe(&mut self, mut config: RecipeConfig, position: Position) -> NodeId {
        if config.fuel.is_none() {
            config.fuel = self.catalog.default_fuel(config.assembler);
        }
        let node = self.graph.create_recipe(config, position);
        self.refresh();
        node
    }

    /// See [`ProductionGraph::create_link`]. No pass runs when nothing was
    /// created.
    pub fn create_link(&mut self, supplier: NodeId, consumer: NodeId, item: ItemId) -> Option<LinkId> {
        let link = self.graph.create_link(supplier, consumer, item)?;
        self.refresh();
        Some(link)
    }

    pub fn delete_link(&mut self, link: LinkId) -> Result<Link, GraphError> {
        let data = self.graph.delete_link(link)?;
        self.refresh();
        Ok(data)
    }

    pub fn delete_node(&mut self, node: NodeId) -> Result<Node, GraphError> {
        let data = self.graph.delete_node(node)?;
        self.refresh();
        Ok(data)
    }

    pub fn delete_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.graph.delete_nodes(nodes);
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.refresh();
    }

    // -----------------------------------------------------------------------
    // Value edits
    // -----------------------------------------------------------------------

    pub fn set_rate_mode(&mut self, node: NodeId, mode: RateMode) -> Result<(), GraphError> {
        self.graph.set_rate_mode(node, mode)?;
        self.refresh();
        Ok(())
    }

    pub fn set_desired_rate(&mut self, node: NodeId, rate: f64) -> Result<(), GraphError> {
        self.graph.set_desired_rate(node, rate)?;
        self.refresh();
        Ok(())
    }

    /// Switch `node` to Manual at `rate` with a single pass.
    pub fn fix_rate(&mut self, node: NodeId, rate: f64) -> Result<(), GraphError> {
        self.graph.set_rate_mode(node, RateMode::Manual)?;
        self.graph.set_desired_rate(node, rate)?;
        self.refresh();
        Ok(())
    }

    /// Positions do not affect rates, so no pass runs.
    pub fn set_position(&mut self, node: NodeId, position: Position) -> Result<(), GraphError> {
        self.graph.set_position(node, position)
    }

    /// Edit a recipe node's machine loadout, then rebalance.
    pub fn edit_recipe<F>(&mut self, node: NodeId, f: F) -> Result<(), GraphError>
    where
        F: FnOnce(&mut RecipeConfig),
    {
        f(self.graph.recipe_config_mut(node)?);
        self.refresh();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Update control
    // -----------------------------------------------------------------------

    /// Stop rebalancing after edits until [`Planner::resume_updates`].
    pub fn pause_updates(&mut self) {
        self.graph.set_updates_paused(true);
    }

    /// Re-enable rebalancing and run one pass for the batched edits.
    pub fn resume_updates(&mut self) -> UpdateReport {
        self.graph.set_updates_paused(false);
        self.update_node_values()
    }

    pub fn updates_paused(&self) -> bool {
        self.graph.updates_paused()
    }

    /// Run one pass now, regardless of what changed.
    pub fn update_node_values(&mut self) -> UpdateReport {
        update_node_values(&mut self.graph, &self.catalog, &self.config)
    }

    /// Take every pending notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        self.graph.drain_events()
    }

    fn refresh(&mut self) {
        if !self.graph.updates_paused() {
            self.update_node_values();
        }
    }
}
