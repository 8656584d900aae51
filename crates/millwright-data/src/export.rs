//! Writing graph content to a snapshot.

use crate::recipe_short::RecipeShort;
use crate::schema::{GraphSnapshot, LinkData, Location, NodeData, NodeType, RateType};
use millwright_core::catalog::Catalog;
use millwright_core::graph::ProductionGraph;
use millwright_core::id::*;
use millwright_core::node::{Node, NodeKind, RateContract};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Snapshot the whole graph, or only `subset` when given.
///
/// With a subset, only links whose endpoints are both in it are written.
/// Ids in `subset` that are not in the graph are ignored. Normal recipes are
/// listed before missing ones; missing recipes are deduplicated by
/// structure since several can share a name.
pub fn export_snapshot(
    graph: &ProductionGraph,
    catalog: &Catalog,
    subset: Option<&[NodeId]>,
) -> GraphSnapshot {
    let wanted: Option<HashSet<NodeId>> = subset.map(|s| s.iter().copied().collect());
    let included: Vec<(NodeId, &Node)> = graph
        .nodes()
        .filter(|(id, _)| wanted.as_ref().is_none_or(|w| w.contains(id)))
        .collect();

    let index: HashMap<NodeId, u32> = included
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i as u32))
        .collect();

    let item_name = |item: ItemId| {
        catalog
            .item(item)
            .map(|i| i.name.clone())
            .unwrap_or_default()
    };

    let mut items = BTreeSet::new();
    let mut assemblers = BTreeSet::new();
    let mut modules = BTreeSet::new();
    let mut beacons = BTreeSet::new();
    let mut recipes: Vec<RecipeShort> = Vec::new();
    let mut missing_recipes: Vec<RecipeShort> = Vec::new();
    let mut nodes = Vec::with_capacity(included.len());

    for (i, (_, node)) in included.iter().enumerate() {
        for item in node.inputs(catalog).into_iter().chain(node.outputs(catalog)) {
            items.insert(item_name(item));
        }

        let mut data = match &node.kind {
            NodeKind::Supplier { item } => {
                NodeData::item_node(i as u32, NodeType::Supplier, &item_name(*item), node.position)
            }
            NodeKind::Consumer { item } => {
                NodeData::item_node(i as u32, NodeType::Consumer, &item_name(*item), node.position)
            }
            NodeKind::Passthrough { item } => {
                NodeData::item_node(i as u32, NodeType::Passthrough, &item_name(*item), node.position)
            }
            NodeKind::Recipe(config) => {
                if let Some(recipe) = catalog.recipe(config.recipe) {
                    let short = RecipeShort::from_recipe(catalog, config.recipe, recipe);
                    if recipe.is_missing {
                        if !missing_recipes.iter().any(|r| r.same_structure(&short)) {
                            missing_recipes.push(short);
                        }
                    } else if !recipes.iter().any(|r| r.recipe_id == short.recipe_id) {
                        recipes.push(short);
                    }
                }

                let assembler = catalog
                    .assembler(config.assembler)
                    .map(|a| a.name.clone())
                    .unwrap_or_default();
                assemblers.insert(assembler.clone());

                let module_names = |ids: &[ModuleId]| -> Vec<String> {
                    ids.iter()
                        .filter_map(|&m| catalog.module(m))
                        .map(|m| m.name.clone())
                        .collect()
                };

                let mut data = NodeData::recipe_node(
                    i as u32,
                    i64::from(config.recipe.0),
                    &assembler,
                    node.position,
                );
                data.assembler_modules = module_names(&config.assembler_modules);
                data.fuel = config.fuel.map(item_name);
                data.burnt = config.burnt_override.map(item_name);
                if let Some(beacon) = config.beacon.and_then(|b| catalog.beacon(b)) {
                    beacons.insert(beacon.name.clone());
                    data.beacon = Some(beacon.name.clone());
                    data.beacon_modules = module_names(&config.beacon_modules);
                    data.beacon_count = config.beacon_count;
                }
                modules.extend(data.assembler_modules.iter().cloned());
                modules.extend(data.beacon_modules.iter().cloned());
                data
            }
        };

        data.location = Location(node.position);
        data.rate_type = RateType::from(node.rate_mode);
        data.desired_rate = node.desired_rate;
        nodes.push(data);
    }

    let node_links = graph
        .links()
        .filter_map(|(_, link)| {
            Some(LinkData {
                supplier_id: *index.get(&link.supplier)?,
                consumer_id: *index.get(&link.consumer)?,
                item: item_name(link.item),
            })
        })
        .collect();

    recipes.extend(missing_recipes);

    GraphSnapshot {
        included_items: items.into_iter().collect(),
        included_recipes: recipes,
        included_assemblers: assemblers.into_iter().collect(),
        included_modules: modules.into_iter().collect(),
        included_beacons: beacons.into_iter().collect(),
        nodes,
        node_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_snapshot;
    use millwright_core::node::Position;
    use millwright_core::test_utils::*;

    #[test]
    fn whole_graph_export() {
        let catalog = test_catalog();
        let mut graph = ProductionGraph::new();
        gear_line(&mut graph, 4.0);

        let snapshot = export_snapshot(&graph, &catalog, None);
        assert_eq!(snapshot.nodes.len(), 4);
        assert_eq!(snapshot.node_links.len(), 3);
        assert_eq!(
            snapshot.included_items,
            vec!["iron-gear-wheel", "iron-ore", "iron-plate"]
        );
        assert_eq!(snapshot.included_assemblers, vec!["assembler"]);
        let names: Vec<&str> = snapshot.included_recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["iron-plate", "iron-gear-wheel"]);

        let ore = &snapshot.nodes[0];
        assert_eq!(ore.node_type, NodeType::Supplier);
        assert_eq!(ore.rate_type, RateType::Manual);
        assert_eq!(ore.desired_rate, 4.0);
    }

    #[test]
    fn subset_keeps_only_inner_links() {
        let catalog = test_catalog();
        let mut graph = ProductionGraph::new();
        let [_, smelter, gears, _] = gear_line(&mut graph, 4.0);

        let snapshot = export_snapshot(&graph, &catalog, Some(&[smelter, gears]));
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.node_links.len(), 1);
        assert_eq!(snapshot.node_links[0].item, "iron-plate");
        assert_eq!(snapshot.node_links[0].supplier_id, 0);
        assert_eq!(snapshot.node_links[0].consumer_id, 1);
    }

    #[test]
    fn burner_fuel_and_modules_written() {
        let catalog = test_catalog();
        let mut graph = ProductionGraph::new();
        let mut config = burner_smelt_iron();
        config.burnt_override = Some(iron_ore());
        config.beacon = Some(beacon());
        config.beacon_modules = vec![speed_module(), speed_module()];
        config.beacon_count = 4.0;
        config.assembler_modules = vec![productivity_module()];
        add_recipe(&mut graph, config);

        let snapshot = export_snapshot(&graph, &catalog, None);
        let node = &snapshot.nodes[0];
        assert_eq!(node.fuel.as_deref(), Some("coal"));
        assert_eq!(node.burnt.as_deref(), Some("iron-ore"));
        assert_eq!(node.beacon.as_deref(), Some("beacon"));
        assert_eq!(node.beacon_count, 4.0);
        assert_eq!(node.assembler_modules, vec!["productivity-module"]);
        assert_eq!(
            snapshot.included_modules,
            vec!["productivity-module", "speed-module"]
        );
        assert_eq!(snapshot.included_beacons, vec!["beacon"]);
        assert!(snapshot.included_items.contains(&"coal".to_string()));
    }

    #[test]
    fn missing_recipes_follow_normal_and_dedupe_by_structure() {
        let mut catalog = test_catalog();
        let live = gear_recipe().recipe;
        let odd = catalog.recipe_or_missing("iron-gear-wheel", &[(copper_plate(), 2.0)], &[(gear(), 1.0)]);
        let other = catalog.recipe_or_missing("iron-gear-wheel", &[(iron_ore(), 2.0)], &[(gear(), 1.0)]);
        assert_ne!(odd, other);

        let mut graph = ProductionGraph::new();
        for recipe in [odd, live, other, odd] {
            add_recipe(&mut graph, millwright_core::node::RecipeConfig::new(recipe, assembler()));
        }

        let snapshot = export_snapshot(&graph, &catalog, None);
        let flags: Vec<bool> = snapshot.included_recipes.iter().map(|r| r.is_missing).collect();
        assert_eq!(flags, vec![false, true, true]);
        assert!(
            snapshot
                .included_recipes
                .iter()
                .all(|r| r.name == "iron-gear-wheel")
        );
    }

    #[test]
    fn export_then_import_rebuilds_topology() {
        let catalog = test_catalog();
        let mut graph = ProductionGraph::new();
        let feed = manual_supplier(&mut graph, alpha(), 1.0);
        let a = add_recipe(&mut graph, loop_a());
        let b = add_recipe(&mut graph, loop_b());
        graph.create_link(feed, a, alpha()).unwrap();
        graph.create_link(a, b, beta()).unwrap();
        graph.create_link(b, a, gamma()).unwrap();
        graph.set_position(b, Position::new(-30, 70)).unwrap();
        let snapshot = export_snapshot(&graph, &catalog, None);

        let mut target_catalog = test_catalog();
        let mut target = ProductionGraph::new();
        let imported = import_snapshot(&mut target, &mut target_catalog, &snapshot).unwrap();
        assert_eq!(imported.nodes.len(), 3);
        assert_eq!(imported.links.len(), 3);
        assert_eq!(target_catalog.missing_recipe_count(), 0);
        assert_eq!(
            target.node(imported.nodes[2]).unwrap().position,
            Position::new(-30, 70)
        );
        assert_eq!(export_snapshot(&target, &target_catalog, None), snapshot);
    }
}
