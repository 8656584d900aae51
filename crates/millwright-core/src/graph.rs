use crate::catalog::Catalog;
use crate::event::{EventQueue, GraphEvent};
use crate::id::*;
use crate::node::*;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

/// Padding added around the node extents by [`ProductionGraph::bounds`].
const X_BORDER: i32 = 200;
const Y_BORDER: i32 = 100;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error("link not found: {0:?}")]
    LinkNotFound(LinkId),
    #[error("node {0:?} is not a recipe node")]
    NotARecipeNode(NodeId),
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Adjacency lists for a single node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NodeAdjacency {
    /// Links whose consumer is this node.
    inputs: Vec<LinkId>,
    /// Links whose supplier is this node.
    outputs: Vec<LinkId>,
}

/// A directed single-item flow from a supplier-side node to a consumer-side
/// node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub supplier: NodeId,
    pub consumer: NodeId,
    pub item: ItemId,
    pub(crate) throughput: f64,
}

impl Link {
    /// Items per second carried, as of the last successful solve.
    pub fn throughput(&self) -> f64 {
        self.throughput
    }
}

/// Rectangle enclosing every node, padded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

// ---------------------------------------------------------------------------
// ProductionGraph
// ---------------------------------------------------------------------------

/// The graph store: sole owner of nodes and links.
///
/// Nodes and links live in `SlotMap` arenas; links refer to their endpoints
/// by id and each node's incident links are kept in a `SecondaryMap` so the
/// two stay in key synchronization. Every topology change queues exactly one
/// [`GraphEvent`] after the change is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionGraph {
    nodes: SlotMap<NodeId, Node>,
    links: SlotMap<LinkId, Link>,
    adjacency: SecondaryMap<NodeId, NodeAdjacency>,

    #[serde(skip)]
    events: EventQueue,
    /// When set, update passes skip solving (they still notify).
    pause_updates: bool,
}

impl ProductionGraph {
    /// Create a new, empty production graph.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Node creation
    // -----------------------------------------------------------------------

    /// Add a node of any kind. Returns its id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let node = self.nodes.insert(Node::new(kind, position));
        self.adjacency.insert(node, NodeAdjacency::default());
        self.events.emit(GraphEvent::NodeAdded { node });
        node
    }

    pub fn create_supplier(&mut self, item: ItemId, position: Position) -> NodeId {
        self.add_node(NodeKind::Supplier { item }, position)
    }

    pub fn create_consumer(&mut self, item: ItemId, position: Position) -> NodeId {
        self.add_node(NodeKind::Consumer { item }, position)
    }

    pub fn create_passthrough(&mut self, item: ItemId, position: Position) -> NodeId {
        self.add_node(NodeKind::Passthrough { item }, position)
    }

    pub fn create_recipe(&mut self, config: RecipeConfig, position: Position) -> NodeId {
        self.add_node(NodeKind::Recipe(config), position)
    }

    // -----------------------------------------------------------------------
    // Links
    // -----------------------------------------------------------------------

    /// Link `supplier`'s output of `item` to `consumer`'s input.
    ///
    /// Returns `None` without changing anything when an identical
    /// (supplier, consumer, item) link already exists or an endpoint is not
    /// in the graph. Item/direction compatibility is not checked here; see
    /// [`ProductionGraph::is_possible_connection`].
    pub fn create_link(
        &mut self,
        supplier: NodeId,
        consumer: NodeId,
        item: ItemId,
    ) -> Option<LinkId> {
        if !self.contains_node(supplier) || !self.contains_node(consumer) {
            return None;
        }
        if self.find_link(supplier, consumer, item).is_some() {
            return None;
        }

        let link = self.links.insert(Link {
            supplier,
            consumer,
            item,
            throughput: 0.0,
        });
        if let Some(adj) = self.adjacency.get_mut(supplier) {
            adj.outputs.push(link);
        }
        if let Some(adj) = self.adjacency.get_mut(consumer) {
            adj.inputs.push(link);
        }
        self.events.emit(GraphEvent::LinkAdded {
            link,
            supplier,
            consumer,
            item,
        });
        Some(link)
    }

    /// Find the link carrying `item` from `supplier` to `consumer`.
    pub fn find_link(&self, supplier: NodeId, consumer: NodeId, item: ItemId) -> Option<LinkId> {
        self.output_links(supplier).iter().copied().find(|&l| {
            self.links
                .get(l)
                .is_some_and(|link| link.consumer == consumer && link.item == item)
        })
    }

    /// Remove a link. Returns the removed link data.
    pub fn delete_link(&mut self, link: LinkId) -> Result<Link, GraphError> {
        let data = self
            .links
            .remove(link)
            .ok_or(GraphError::LinkNotFound(link))?;
        if let Some(adj) = self.adjacency.get_mut(data.supplier) {
            adj.outputs.retain(|&l| l != link);
        }
        if let Some(adj) = self.adjacency.get_mut(data.consumer) {
            adj.inputs.retain(|&l| l != link);
        }
        self.events.emit(GraphEvent::LinkDeleted {
            link,
            supplier: data.supplier,
            consumer: data.consumer,
            item: data.item,
        });
        Ok(data)
    }

    /// Whether `item` can flow from `supplier` to `consumer`: distinct
    /// nodes, the supplier emits the item and the consumer accepts it.
    pub fn is_possible_connection(
        &self,
        catalog: &Catalog,
        supplier: NodeId,
        consumer: NodeId,
        item: ItemId,
    ) -> bool {
        if supplier == consumer {
            return false;
        }
        let (Some(s), Some(c)) = (self.nodes.get(supplier), self.nodes.get(consumer)) else {
            return false;
        };
        s.outputs(catalog).contains(&item) && c.inputs(catalog).contains(&item)
    }

    // -----------------------------------------------------------------------
    // Node removal
    // -----------------------------------------------------------------------

    /// Remove a node and every incident link. Link deletions are queued
    /// before the node deletion.
    pub fn delete_node(&mut self, node: NodeId) -> Result<Node, GraphError> {
        let mut incident: Vec<LinkId> = match self.adjacency.get(node) {
            Some(adj) => adj.inputs.iter().chain(adj.outputs.iter()).copied().collect(),
            None => return Err(GraphError::NodeNotFound(node)),
        };
        // A self-link shows up in both lists.
        incident.sort();
        incident.dedup();

        for link in incident {
            self.delete_link(link)?;
        }

        self.adjacency.remove(node);
        let data = self
            .nodes
            .remove(node)
            .ok_or(GraphError::NodeNotFound(node))?;
        self.events.emit(GraphEvent::NodeDeleted { node });
        Ok(data)
    }

    /// Remove several nodes. Ids that are already gone are skipped.
    pub fn delete_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        for node in nodes {
            let _ = self.delete_node(node);
        }
    }

    /// Remove every node and link, queueing a deletion event for each.
    pub fn clear(&mut self) {
        let nodes: Vec<NodeId> = self.nodes.keys().collect();
        self.delete_nodes(nodes);
    }

    // -----------------------------------------------------------------------
    // Value edits
    // -----------------------------------------------------------------------

    pub fn set_rate_mode(&mut self, node: NodeId, mode: RateMode) -> Result<(), GraphError> {
        self.node_mut(node)?.rate_mode = mode;
        Ok(())
    }

    pub fn set_desired_rate(&mut self, node: NodeId, rate: f64) -> Result<(), GraphError> {
        self.node_mut(node)?.desired_rate = rate;
        Ok(())
    }

    pub fn set_position(&mut self, node: NodeId, position: Position) -> Result<(), GraphError> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    /// Mutable access to a recipe node's machine and module loadout.
    pub fn recipe_config_mut(&mut self, node: NodeId) -> Result<&mut RecipeConfig, GraphError> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Recipe(config) => Ok(config),
            _ => Err(GraphError::NotARecipeNode(node)),
        }
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(node)
            .ok_or(GraphError::NodeNotFound(node))
    }

    pub(crate) fn link_mut(&mut self, link: LinkId) -> Option<&mut Link> {
        self.links.get_mut(link)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub fn link(&self, link: LinkId) -> Option<&Link> {
        self.links.get(link)
    }

    /// Links whose consumer is `node`.
    pub fn input_links(&self, node: NodeId) -> &[LinkId] {
        self.adjacency
            .get(node)
            .map(|adj| adj.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Links whose supplier is `node`.
    pub fn output_links(&self, node: NodeId) -> &[LinkId] {
        self.adjacency
            .get(node)
            .map(|adj| adj.outputs.as_slice())
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn contains_link(&self, link: LinkId) -> bool {
        self.links.contains_key(link)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter()
    }

    /// Nodes whose output set contains `item`.
    pub fn suppliers_of(&self, catalog: &Catalog, item: ItemId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.outputs(catalog).contains(&item))
            .map(|(id, _)| id)
            .collect()
    }

    /// Nodes whose input set contains `item`.
    pub fn consumers_of(&self, catalog: &Catalog, item: ItemId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.inputs(catalog).contains(&item))
            .map(|(id, _)| id)
            .collect()
    }

    /// Partition every node into maximal sets connected by links in either
    /// direction. Iterative (explicit stack), so deep chains cannot overflow
    /// the call stack. Each component is sorted by `NodeId`.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut visited: SecondaryMap<NodeId, ()> = SecondaryMap::new();
        let mut components = Vec::new();

        for start in self.nodes.keys() {
            if visited.insert(start, ()).is_some() {
                continue;
            }

            let mut component = Vec::new();
            let mut stack = vec![start];

            while let Some(node) = stack.pop() {
                component.push(node);

                for &link in self.input_links(node).iter().chain(self.output_links(node)) {
                    let Some(data) = self.links.get(link) else {
                        continue;
                    };
                    let other = if data.supplier == node {
                        data.consumer
                    } else {
                        data.supplier
                    };
                    if visited.insert(other, ()).is_none() {
                        stack.push(other);
                    }
                }
            }

            component.sort();
            components.push(component);
        }

        components
    }

    /// Padded rectangle around every node position. `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.nodes.values().map(|n| n.position);
        let first = positions.next()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.x, first.x, first.y, first.y);
        for p in positions {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        Some(Bounds {
            x: x_min - X_BORDER,
            y: y_min - Y_BORDER,
            width: x_max - x_min + 2 * X_BORDER,
            height: y_max - y_min + 2 * Y_BORDER,
        })
    }

    // -----------------------------------------------------------------------
    // Notifications and update control
    // -----------------------------------------------------------------------

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Take every pending notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        self.events.drain()
    }

    pub fn updates_paused(&self) -> bool {
        self.pause_updates
    }

    pub fn set_updates_paused(&mut self, paused: bool) {
        self.pause_updates = paused;
    }
}
