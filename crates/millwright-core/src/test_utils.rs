//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).
//!
//! The ids returned by the accessors below are only valid against
//! [`test_catalog`], which registers everything in a fixed order.

use crate::catalog::{Catalog, CatalogBuilder, ModuleEffects};
use crate::graph::ProductionGraph;
use crate::id::*;
use crate::node::*;

// ===========================================================================
// Items
// ===========================================================================

pub fn iron_ore() -> ItemId {
    ItemId(0)
}
pub fn iron_plate() -> ItemId {
    ItemId(1)
}
pub fn copper_ore() -> ItemId {
    ItemId(2)
}
pub fn copper_plate() -> ItemId {
    ItemId(3)
}
pub fn gear() -> ItemId {
    ItemId(4)
}
pub fn circuit() -> ItemId {
    ItemId(5)
}
pub fn coal() -> ItemId {
    ItemId(6)
}
pub fn ash() -> ItemId {
    ItemId(7)
}
pub fn water() -> ItemId {
    ItemId(8)
}
pub fn steam() -> ItemId {
    ItemId(9)
}

// Abstract items for cycle fixtures.
pub fn alpha() -> ItemId {
    ItemId(10)
}
pub fn beta() -> ItemId {
    ItemId(11)
}
pub fn gamma() -> ItemId {
    ItemId(12)
}
pub fn delta() -> ItemId {
    ItemId(13)
}

// ===========================================================================
// Machines and modules
// ===========================================================================

/// Electric, speed 1, four module slots.
pub fn assembler() -> AssemblerId {
    AssemblerId(0)
}

/// Burner, speed 1, 90 kW, burns coal into ash.
pub fn stone_furnace() -> AssemblerId {
    AssemblerId(1)
}

/// +50% speed, +50% consumption.
pub fn speed_module() -> ModuleId {
    ModuleId(0)
}

/// +10% productivity, -15% speed.
pub fn productivity_module() -> ModuleId {
    ModuleId(1)
}

pub fn beacon() -> BeaconId {
    BeaconId(0)
}

// ===========================================================================
// Recipe node configurations (all recipes take 1 s)
// ===========================================================================

/// 1 iron ore -> 1 iron plate.
pub fn smelt_iron() -> RecipeConfig {
    RecipeConfig::new(RecipeId(0), assembler())
}

/// 1 copper ore -> 1 copper plate.
pub fn smelt_copper() -> RecipeConfig {
    RecipeConfig::new(RecipeId(1), assembler())
}

/// 2 iron plate -> 1 gear.
pub fn gear_recipe() -> RecipeConfig {
    RecipeConfig::new(RecipeId(2), assembler())
}

/// 1 iron plate + 3 copper plate -> 2 circuit.
pub fn circuit_recipe() -> RecipeConfig {
    RecipeConfig::new(RecipeId(3), assembler())
}

/// 10 water -> 10 steam at 165 degrees.
pub fn boil() -> RecipeConfig {
    RecipeConfig::new(RecipeId(4), assembler())
}

/// alpha + gamma -> beta.
pub fn loop_a() -> RecipeConfig {
    RecipeConfig::new(RecipeId(5), assembler())
}

/// beta -> gamma + delta.
pub fn loop_b() -> RecipeConfig {
    RecipeConfig::new(RecipeId(6), assembler())
}

/// Iron smelting in the burner furnace with coal.
pub fn burner_smelt_iron() -> RecipeConfig {
    let mut config = RecipeConfig::new(RecipeId(0), stone_furnace());
    config.fuel = Some(coal());
    config
}

// ===========================================================================
// Catalog
// ===========================================================================

/// The catalog every helper in this module refers to.
pub fn test_catalog() -> Catalog {
    try_test_catalog().expect("test catalog is well-formed")
}

fn try_test_catalog() -> Result<Catalog, crate::catalog::CatalogError> {
    let mut b = CatalogBuilder::new();
    let ore = b.register_item("iron-ore")?;
    let plate = b.register_item("iron-plate")?;
    let cu_ore = b.register_item("copper-ore")?;
    let cu_plate = b.register_item("copper-plate")?;
    let gear = b.register_item("iron-gear-wheel")?;
    let circuit = b.register_item("electronic-circuit")?;
    let coal = b.register_item("coal")?;
    let ash = b.register_item("ash")?;
    let water = b.register_fluid("water", 15.0)?;
    let steam = b.register_fluid("steam", 15.0)?;
    let alpha = b.register_item("alpha")?;
    let beta = b.register_item("beta")?;
    let gamma = b.register_item("gamma")?;
    let delta = b.register_item("delta")?;

    b.mutate_item("coal", |i| {
        i.fuel_value = 4_000_000.0;
        i.burn_result = Some(ash);
    })?;

    b.register_recipe("iron-plate", 1.0, &[(ore, 1.0)], &[(plate, 1.0)])?;
    b.register_recipe("copper-plate", 1.0, &[(cu_ore, 1.0)], &[(cu_plate, 1.0)])?;
    b.register_recipe("iron-gear-wheel", 1.0, &[(plate, 2.0)], &[(gear, 1.0)])?;
    b.register_recipe(
        "electronic-circuit",
        1.0,
        &[(plate, 1.0), (cu_plate, 3.0)],
        &[(circuit, 2.0)],
    )?;
    b.register_recipe("boil", 1.0, &[(water, 10.0)], &[(steam, 10.0)])?;
    b.mutate_recipe("boil", |r| r.products[0].temperature = Some(165.0))?;
    b.register_recipe("loop-a", 1.0, &[(alpha, 1.0), (gamma, 1.0)], &[(beta, 1.0)])?;
    b.register_recipe("loop-b", 1.0, &[(beta, 1.0)], &[(gamma, 1.0), (delta, 1.0)])?;

    b.register_assembler("assembler", 1.0, 4)?;
    b.register_assembler("stone-furnace", 1.0, 0)?;
    b.mutate_assembler("stone-furnace", |a| {
        a.is_burner = true;
        a.energy_consumption = 90_000.0;
        a.fuels.push(coal);
    })?;

    b.register_module(
        "speed-module",
        ModuleEffects {
            speed: 0.5,
            productivity: 0.0,
            consumption: 0.5,
        },
    )?;
    b.register_module(
        "productivity-module",
        ModuleEffects {
            speed: -0.15,
            productivity: 0.1,
            consumption: 0.8,
        },
    )?;
    b.register_beacon("beacon", 0.5, 2)?;

    b.build()
}

// ===========================================================================
// Graph helpers
// ===========================================================================

/// Add a recipe node at the origin.
pub fn add_recipe(graph: &mut ProductionGraph, config: RecipeConfig) -> NodeId {
    graph.create_recipe(config, Position::default())
}

fn make_manual(graph: &mut ProductionGraph, node: NodeId, rate: f64) -> NodeId {
    if let Ok(()) = graph.set_rate_mode(node, RateMode::Manual) {
        let _ = graph.set_desired_rate(node, rate);
    }
    node
}

/// A supplier of `item` fixed at `rate`.
pub fn manual_supplier(graph: &mut ProductionGraph, item: ItemId, rate: f64) -> NodeId {
    let node = graph.create_supplier(item, Position::default());
    make_manual(graph, node, rate)
}

/// A consumer of `item` fixed at `rate`.
pub fn manual_consumer(graph: &mut ProductionGraph, item: ItemId, rate: f64) -> NodeId {
    let node = graph.create_consumer(item, Position::default());
    make_manual(graph, node, rate)
}

/// Ore supplier fixed at `ore_rate` -> iron smelter -> gear assembler ->
/// gear consumer. Returns the nodes in that order.
pub fn gear_line(graph: &mut ProductionGraph, ore_rate: f64) -> [NodeId; 4] {
    let ore = manual_supplier(graph, iron_ore(), ore_rate);
    let smelter = add_recipe(graph, smelt_iron());
    let gears = add_recipe(graph, gear_recipe());
    let sink = graph.create_consumer(gear(), Position::default());
    let _ = graph.create_link(ore, smelter, iron_ore());
    let _ = graph.create_link(smelter, gears, iron_plate());
    let _ = graph.create_link(gears, sink, gear());
    [ore, smelter, gears, sink]
}

/// Relative comparison for solved rates.
pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}
