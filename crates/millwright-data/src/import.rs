//! Rebuilding graph content from a snapshot.
//!
//! Snapshot node ids are transient: every imported node gets a fresh
//! [`NodeId`] and links are remapped through a lookup table. Catalog names
//! the live catalog does not know become missing placeholders, so a save
//! made against different game data still loads and can be repaired.
//!
//! Links are trusted. A link whose item does not fit its endpoints is
//! still created (it will carry nothing once solved) and logged.

use crate::schema::{GraphSnapshot, NodeData, NodeType};
use millwright_core::catalog::Catalog;
use millwright_core::graph::ProductionGraph;
use millwright_core::id::*;
use millwright_core::node::{NodeKind, RateMode, RecipeConfig};
use millwright_core::planner::Planner;
use std::collections::HashMap;
use tracing::{debug, warn};

// ===========================================================================
// Errors
// ===========================================================================

/// Structural faults that make a snapshot unusable. Checked before anything
/// is created, so a failed import leaves the graph untouched.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("duplicate node id {0} in snapshot")]
    DuplicateNodeId(u32),
    #[error("duplicate recipe id {0} in snapshot")]
    DuplicateRecipeId(i64),
    #[error("node {node} ({node_type:?}) has no {field}")]
    MissingField {
        node: u32,
        node_type: NodeType,
        field: &'static str,
    },
    #[error("node {node} refers to recipe {recipe_id}, which the snapshot does not include")]
    UnknownRecipe { node: u32, recipe_id: i64 },
}

/// What an import created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedNodes {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkId>,
}

// ===========================================================================
// Import
// ===========================================================================

/// Add the snapshot's nodes and links to `graph`.
///
/// Links that name a node id absent from the snapshot, or that duplicate an
/// existing link, are skipped with a warning.
pub fn import_snapshot(
    graph: &mut ProductionGraph,
    catalog: &mut Catalog,
    snapshot: &GraphSnapshot,
) -> Result<ImportedNodes, ImportError> {
    validate(snapshot)?;

    for name in &snapshot.included_items {
        catalog.item_or_missing(name);
    }
    for name in &snapshot.included_assemblers {
        catalog.assembler_or_missing(name);
    }
    for name in &snapshot.included_modules {
        catalog.module_or_missing(name);
    }
    for name in &snapshot.included_beacons {
        catalog.beacon_or_missing(name);
    }

    let mut recipes: HashMap<i64, RecipeId> = HashMap::new();
    for short in &snapshot.included_recipes {
        let ingredients: Vec<(ItemId, f64)> = short
            .ingredients
            .iter()
            .map(|(name, &amount)| (catalog.item_or_missing(name), amount))
            .collect();
        let products: Vec<(ItemId, f64)> = short
            .products
            .iter()
            .map(|(name, &amount)| (catalog.item_or_missing(name), amount))
            .collect();
        let id = catalog.recipe_or_missing(&short.name, &ingredients, &products);
        recipes.insert(short.recipe_id, id);
    }

    let mut imported = ImportedNodes::default();
    let mut node_map: HashMap<u32, NodeId> = HashMap::new();

    for data in &snapshot.nodes {
        let kind = node_kind(catalog, data, &recipes)?;
        let id = graph.add_node(kind, data.location.0);
        let mode = RateMode::from(data.rate_type);
        // Node was just created, so these cannot fail.
        let _ = graph.set_rate_mode(id, mode);
        if mode == RateMode::Manual {
            let _ = graph.set_desired_rate(id, data.desired_rate);
        }
        node_map.insert(data.node_id, id);
        imported.nodes.push(id);
    }

    for link in &snapshot.node_links {
        let (Some(&supplier), Some(&consumer)) = (
            node_map.get(&link.supplier_id),
            node_map.get(&link.consumer_id),
        ) else {
            warn!(
                supplier = link.supplier_id,
                consumer = link.consumer_id,
                "link refers to a node the snapshot does not contain, skipping"
            );
            continue;
        };
        let item = catalog.item_or_missing(&link.item);
        if !graph.is_possible_connection(catalog, supplier, consumer, item) {
            warn!(
                supplier = link.supplier_id,
                consumer = link.consumer_id,
                item = %link.item,
                "imported link does not match its endpoints"
            );
        }
        match graph.create_link(supplier, consumer, item) {
            Some(id) => imported.links.push(id),
            None => debug!(
                supplier = link.supplier_id,
                consumer = link.consumer_id,
                item = %link.item,
                "duplicate link skipped"
            ),
        }
    }

    debug!(
        nodes = imported.nodes.len(),
        links = imported.links.len(),
        "snapshot imported"
    );
    Ok(imported)
}

/// Import through a planner: one balancing pass after everything is in.
pub fn import_into_planner(
    planner: &mut Planner,
    snapshot: &GraphSnapshot,
) -> Result<ImportedNodes, ImportError> {
    let (graph, catalog) = planner.parts_mut();
    let imported = import_snapshot(graph, catalog, snapshot)?;
    if !planner.updates_paused() {
        planner.update_node_values();
    }
    Ok(imported)
}

fn validate(snapshot: &GraphSnapshot) -> Result<(), ImportError> {
    let mut recipe_ids = std::collections::HashSet::new();
    for recipe in &snapshot.included_recipes {
        if !recipe_ids.insert(recipe.recipe_id) {
            return Err(ImportError::DuplicateRecipeId(recipe.recipe_id));
        }
    }

    let mut seen = std::collections::HashSet::new();
    for node in &snapshot.nodes {
        if !seen.insert(node.node_id) {
            return Err(ImportError::DuplicateNodeId(node.node_id));
        }
        let missing = |field| ImportError::MissingField {
            node: node.node_id,
            node_type: node.node_type,
            field,
        };
        match node.node_type {
            NodeType::Supplier | NodeType::Consumer | NodeType::Passthrough => {
                if node.item.is_none() {
                    return Err(missing("item"));
                }
            }
            NodeType::Recipe => {
                let recipe_id = node.recipe_id.ok_or_else(|| missing("recipe id"))?;
                if node.assembler.is_none() {
                    return Err(missing("assembler"));
                }
                if !snapshot
                    .included_recipes
                    .iter()
                    .any(|r| r.recipe_id == recipe_id)
                {
                    return Err(ImportError::UnknownRecipe {
                        node: node.node_id,
                        recipe_id,
                    });
                }
            }
        }
    }
    Ok(())
}

fn node_kind(
    catalog: &mut Catalog,
    data: &NodeData,
    recipes: &HashMap<i64, RecipeId>,
) -> Result<NodeKind, ImportError> {
    let missing = |field| ImportError::MissingField {
        node: data.node_id,
        node_type: data.node_type,
        field,
    };

    let item = |catalog: &mut Catalog| -> Result<ItemId, ImportError> {
        let name = data.item.as_deref().ok_or_else(|| missing("item"))?;
        Ok(catalog.item_or_missing(name))
    };

    Ok(match data.node_type {
        NodeType::Supplier => NodeKind::Supplier { item: item(catalog)? },
        NodeType::Consumer => NodeKind::Consumer { item: item(catalog)? },
        NodeType::Passthrough => NodeKind::Passthrough { item: item(catalog)? },
        NodeType::Recipe => NodeKind::Recipe(recipe_config(catalog, data, recipes)?),
    })
}

fn recipe_config(
    catalog: &mut Catalog,
    data: &NodeData,
    recipes: &HashMap<i64, RecipeId>,
) -> Result<RecipeConfig, ImportError> {
    let recipe_id = data.recipe_id.ok_or(ImportError::MissingField {
        node: data.node_id,
        node_type: data.node_type,
        field: "recipe id",
    })?;
    let recipe = *recipes.get(&recipe_id).ok_or(ImportError::UnknownRecipe {
        node: data.node_id,
        recipe_id,
    })?;
    let assembler_name = data.assembler.as_deref().ok_or(ImportError::MissingField {
        node: data.node_id,
        node_type: data.node_type,
        field: "assembler",
    })?;

    let mut config = RecipeConfig::new(recipe, catalog.assembler_or_missing(assembler_name));
    config.assembler_modules = data
        .assembler_modules
        .iter()
        .map(|m| catalog.module_or_missing(m))
        .collect();

    config.fuel = match &data.fuel {
        Some(name) => Some(catalog.item_or_missing(name)),
        None => catalog.default_fuel(config.assembler),
    };

    if let Some(name) = &data.burnt {
        let burnt = catalog.item_or_missing(name);
        if config.burnt_item(catalog) != Some(burnt) {
            config.burnt_override = Some(burnt);
        }
    }

    if let Some(name) = &data.beacon {
        config.beacon = Some(catalog.beacon_or_missing(name));
        config.beacon_modules = data
            .beacon_modules
            .iter()
            .map(|m| catalog.module_or_missing(m))
            .collect();
        config.beacon_count = data.beacon_count;
    }

    Ok(config)
}
