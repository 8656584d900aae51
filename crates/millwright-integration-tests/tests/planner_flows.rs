//! Planner-level flows across both crates: editing, batching, and loading
//! saved graphs into a live planner.

use millwright_core::config::SolverConfig;
use millwright_core::event::{EventKind, GraphEvent};
use millwright_core::graph::ProductionGraph;
use millwright_core::id::*;
use millwright_core::node::*;
use millwright_core::planner::Planner;
use millwright_core::test_utils::*;
use millwright_data::schema::{LinkData, NodeData, NodeType, RateType};
use millwright_data::{GraphSnapshot, codec, export_snapshot, import_into_planner};

fn planner() -> Planner {
    Planner::new(test_catalog(), SolverConfig::default())
}

fn rate(planner: &Planner, node: NodeId) -> f64 {
    planner.graph().node(node).unwrap().actual_rate()
}

fn count(events: &[GraphEvent], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

// ===========================================================================
// Feedback and contradiction
// ===========================================================================

/// Feed R into a 1:1 loop through two relays: both loop nodes run at R.
#[test]
fn feedback_cycle_runs_at_feed_rate() {
    let mut p = planner();
    let at = Position::default();
    let feed = p.create_supplier(iron_plate(), at);
    let a = p.create_passthrough(iron_plate(), at);
    let b = p.create_passthrough(iron_plate(), at);
    let sink = p.create_consumer(iron_plate(), at);
    p.create_link(feed, a, iron_plate()).unwrap();
    p.create_link(a, b, iron_plate()).unwrap();
    p.create_link(b, a, iron_plate()).unwrap();
    p.create_link(b, sink, iron_plate()).unwrap();
    p.fix_rate(feed, 12.0).unwrap();

    assert!(approx(rate(&p, a), 12.0));
    assert!(approx(rate(&p, b), 12.0));
    assert!(approx(rate(&p, sink), 12.0));
    assert!(!p.graph().node(a).unwrap().has_error());
}

/// Supplier fixed at 10 feeding a consumer fixed at 5 cannot balance.
#[test]
fn contradictory_manual_rates_flag_component() {
    let mut p = planner();
    let at = Position::default();
    let source = p.create_supplier(iron_ore(), at);
    let sink = p.create_consumer(iron_ore(), at);
    let link = p.create_link(source, sink, iron_ore()).unwrap();
    let elsewhere = p.create_supplier(copper_ore(), at);
    p.fix_rate(elsewhere, 2.0).unwrap();
    p.fix_rate(source, 10.0).unwrap();
    p.fix_rate(sink, 5.0).unwrap();

    for node in [source, sink] {
        let n = p.graph().node(node).unwrap();
        assert!(n.has_error());
        assert_eq!(n.actual_rate(), 0.0);
    }
    assert_eq!(p.graph().link(link).unwrap().throughput(), 0.0);

    // The unrelated component still solves.
    assert!(!p.graph().node(elsewhere).unwrap().has_error());
    assert_eq!(rate(&p, elsewhere), 2.0);

    // Resolving the contradiction clears the flags.
    p.set_desired_rate(sink, 10.0).unwrap();
    assert!(!p.graph().node(source).unwrap().has_error());
    assert!(approx(p.graph().link(link).unwrap().throughput(), 10.0));
}

// ===========================================================================
// Notifications
// ===========================================================================

#[test]
fn every_edit_reports_values_updated() {
    let mut p = planner();
    let at = Position::default();
    let ore = p.create_supplier(iron_ore(), at);
    let smelter = p.create_recipe(smelt_iron(), at);
    let link = p.create_link(ore, smelter, iron_ore()).unwrap();

    let events = p.drain_events();
    assert_eq!(count(&events, EventKind::NodeAdded), 2);
    assert_eq!(count(&events, EventKind::LinkAdded), 1);
    assert_eq!(count(&events, EventKind::ValuesUpdated), 3);

    // A duplicate link is a silent no-op.
    assert!(p.create_link(ore, smelter, iron_ore()).is_none());
    assert!(p.drain_events().is_empty());

    p.delete_node(ore).unwrap();
    assert_eq!(
        p.drain_events(),
        vec![
            GraphEvent::LinkDeleted {
                link,
                supplier: ore,
                consumer: smelter,
                item: iron_ore(),
            },
            GraphEvent::NodeDeleted { node: ore },
            GraphEvent::ValuesUpdated,
        ]
    );
}

#[test]
fn paused_batch_solves_once() {
    let mut p = planner();
    p.pause_updates();
    let at = Position::default();
    let ore = p.create_supplier(iron_ore(), at);
    let smelter = p.create_recipe(smelt_iron(), at);
    p.create_link(ore, smelter, iron_ore()).unwrap();
    p.fix_rate(ore, 4.0).unwrap();
    assert_eq!(rate(&p, smelter), 0.0);
    assert_eq!(count(&p.drain_events(), EventKind::ValuesUpdated), 0);

    let report = p.resume_updates();
    assert_eq!(report.components, 1);
    assert!(!report.skipped);
    assert!(approx(rate(&p, smelter), 4.0));
    assert_eq!(count(&p.drain_events(), EventKind::ValuesUpdated), 1);
}

/// The `parallel` setting never changes results, whether or not the
/// feature is compiled in.
#[test]
fn parallel_setting_matches_serial() {
    let build = |parallel: bool| {
        let mut p = Planner::new(
            test_catalog(),
            SolverConfig {
                parallel,
                ..SolverConfig::default()
            },
        );
        let (graph, _) = p.parts_mut();
        for i in 0..8 {
            gear_line(graph, 1.0 + f64::from(i));
        }
        p.update_node_values();
        p.graph()
            .nodes()
            .map(|(_, n)| n.actual_rate().to_bits())
            .collect::<Vec<_>>()
    };
    assert_eq!(build(true), build(false));
}

// ===========================================================================
// Loading saved graphs
// ===========================================================================

#[test]
fn import_balances_in_one_pass() {
    let mut source = ProductionGraph::new();
    gear_line(&mut source, 8.0);
    let text = codec::to_json(&export_snapshot(&source, &test_catalog(), None)).unwrap();

    let mut p = planner();
    let imported = import_into_planner(&mut p, &codec::from_json(&text).unwrap()).unwrap();
    assert_eq!(imported.nodes.len(), 4);

    let events = p.drain_events();
    assert_eq!(count(&events, EventKind::NodeAdded), 4);
    assert_eq!(count(&events, EventKind::LinkAdded), 3);
    assert_eq!(count(&events, EventKind::ValuesUpdated), 1);

    let rates: Vec<f64> = imported.nodes.iter().map(|&n| rate(&p, n)).collect();
    assert_eq!(rates[0], 8.0);
    assert!(approx(rates[1], 8.0));
    assert!(approx(rates[2], 4.0));
    assert!(approx(rates[3], 4.0));
}

#[test]
fn import_twice_gives_two_independent_copies() {
    let mut source = ProductionGraph::new();
    gear_line(&mut source, 2.0);
    let snapshot = export_snapshot(&source, &test_catalog(), None);

    let mut p = planner();
    let first = import_into_planner(&mut p, &snapshot).unwrap();
    let second = import_into_planner(&mut p, &snapshot).unwrap();
    assert!(first.nodes.iter().all(|n| !second.nodes.contains(n)));
    assert_eq!(p.graph().node_count(), 8);
    assert_eq!(p.graph().connected_components().len(), 2);
    assert!(approx(rate(&p, second.nodes[2]), 1.0));
}

/// A save made against other game data: unknown names become placeholders
/// and the graph still balances through the placeholder recipe.
#[test]
fn unknown_names_load_as_placeholders() {
    let mut snapshot = GraphSnapshot {
        included_items: vec!["unobtainium".into(), "widget".into()],
        included_assemblers: vec!["mystery-machine".into()],
        ..GraphSnapshot::default()
    };
    let mut recipe = millwright_data::recipe_short::RecipeShort::named("widget");
    recipe.recipe_id = 7;
    recipe.is_missing = true;
    recipe.ingredients.insert("unobtainium".into(), 2.0);
    recipe.products.insert("widget".into(), 1.0);
    snapshot.included_recipes.push(recipe);

    let mut feed = NodeData::item_node(0, NodeType::Supplier, "unobtainium", Position::new(0, 0));
    feed.rate_type = RateType::Manual;
    feed.desired_rate = 6.0;
    snapshot.nodes.push(feed);
    snapshot
        .nodes
        .push(NodeData::recipe_node(1, 7, "mystery-machine", Position::new(100, 0)));
    snapshot.node_links.push(LinkData {
        supplier_id: 0,
        consumer_id: 1,
        item: "unobtainium".into(),
    });

    let mut p = planner();
    let items_before = p.catalog().item_count();
    let imported = import_into_planner(&mut p, &snapshot).unwrap();

    assert_eq!(p.catalog().missing_item_count(), 2);
    assert_eq!(p.catalog().missing_recipe_count(), 1);
    assert_eq!(p.catalog().item_count(), items_before + 2);

    let machine = imported.nodes[1];
    assert!(!p.graph().node(machine).unwrap().has_error());
    assert!(approx(rate(&p, machine), 3.0));
    assert_eq!(imported.links.len(), 1);
}

/// Exporting only part of a planner's graph and loading it elsewhere keeps
/// just the inner links.
#[test]
fn subset_export_into_second_planner() {
    let mut p = planner();
    let (graph, _) = p.parts_mut();
    let [_, smelter, gears, _] = gear_line(graph, 6.0);
    p.update_node_values();

    let snapshot = export_snapshot(p.graph(), p.catalog(), Some(&[smelter, gears]));
    let bytes = codec::to_bytes(&snapshot).unwrap();

    let mut other = planner();
    let imported = import_into_planner(&mut other, &codec::from_bytes(&bytes).unwrap()).unwrap();
    assert_eq!(imported.nodes.len(), 2);
    assert_eq!(imported.links.len(), 1);
    // Neither end is Manual, so the fragment is unanchored.
    assert!(imported.nodes.iter().all(|&n| rate(&other, n) == 0.0));

    other.fix_rate(imported.nodes[1], 2.0).unwrap();
    assert!(approx(rate(&other, imported.nodes[0]), 4.0));
}
