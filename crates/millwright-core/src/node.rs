//! Node variants and the per-variant rate contract.
//!
//! Every node has a processing rate. For each item a node touches, the rate
//! contract gives the multiplier `m` such that
//! `item_flow = m * node_rate`. Suppliers, consumers and pass-throughs use
//! `m = 1` for their single item; recipe nodes derive `m` from the recipe
//! amounts, the assembler speed and the module/beacon loadout.

use crate::catalog::Catalog;
use crate::id::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared node fields
// ---------------------------------------------------------------------------

/// How a node's rate is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateMode {
    /// Solved by the balancing engine.
    #[default]
    Auto,
    /// Fixed to the node's desired rate.
    Manual,
}

/// Editor position of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Recipe node configuration
// ---------------------------------------------------------------------------

/// Machine and module loadout of a recipe node. Chosen by the caller; the
/// engine only balances rates for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeConfig {
    pub recipe: RecipeId,
    pub assembler: AssemblerId,
    pub assembler_modules: Vec<ModuleId>,
    /// Fuel burnt by a burner assembler.
    pub fuel: Option<ItemId>,
    /// Replaces the fuel's own burn result.
    pub burnt_override: Option<ItemId>,
    pub beacon: Option<BeaconId>,
    pub beacon_modules: Vec<ModuleId>,
    pub beacon_count: f64,
}

impl RecipeConfig {
    pub fn new(recipe: RecipeId, assembler: AssemblerId) -> Self {
        Self {
            recipe,
            assembler,
            assembler_modules: Vec::new(),
            fuel: None,
            burnt_override: None,
            beacon: None,
            beacon_modules: Vec::new(),
            beacon_count: 0.0,
        }
    }

    /// Crafts completed per second by one machine.
    pub fn crafts_per_second(&self, catalog: &Catalog) -> f64 {
        let (Some(recipe), Some(assembler)) = (
            catalog.recipe(self.recipe),
            catalog.assembler(self.assembler),
        ) else {
            return 0.0;
        };
        if recipe.time <= 0.0 {
            return 0.0;
        }
        let effects = ResolvedEffects::resolve(self, catalog);
        assembler.speed * effects.speed / recipe.time
    }

    /// Fuel items burnt per second by one machine. Zero unless the assembler
    /// is a burner with a fuel that has a positive fuel value.
    pub fn fuel_per_second(&self, catalog: &Catalog) -> f64 {
        let Some(assembler) = catalog.assembler(self.assembler) else {
            return 0.0;
        };
        let Some(fuel) = self.fuel.and_then(|f| catalog.item(f)) else {
            return 0.0;
        };
        if !assembler.is_burner || fuel.fuel_value <= 0.0 {
            return 0.0;
        }
        let effects = ResolvedEffects::resolve(self, catalog);
        assembler.energy_consumption * effects.consumption / fuel.fuel_value
    }

    /// Item left over after burning the fuel, if any.
    pub fn burnt_item(&self, catalog: &Catalog) -> Option<ItemId> {
        self.burnt_override.or_else(|| {
            self.fuel
                .and_then(|f| catalog.item(f))
                .and_then(|f| f.burn_result)
        })
    }

    fn burns_fuel(&self, catalog: &Catalog) -> bool {
        self.fuel.is_some()
            && catalog
                .assembler(self.assembler)
                .is_some_and(|a| a.is_burner)
    }
}

/// Module effects folded into multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEffects {
    pub speed: f64,
    pub productivity: f64,
    pub consumption: f64,
}

impl ResolvedEffects {
    /// Sum assembler modules and beacon modules (scaled by beacon count and
    /// distribution effectivity), then clamp into valid multipliers.
    pub fn resolve(config: &RecipeConfig, catalog: &Catalog) -> Self {
        let mut speed = 0.0;
        let mut productivity = catalog
            .assembler(config.assembler)
            .map(|a| a.base_productivity)
            .unwrap_or(0.0);
        let mut consumption = 0.0;

        for module in config
            .assembler_modules
            .iter()
            .filter_map(|&m| catalog.module(m))
        {
            speed += module.effects.speed;
            productivity += module.effects.productivity;
            consumption += module.effects.consumption;
        }

        let beacon_scale = config
            .beacon
            .and_then(|b| catalog.beacon(b))
            .map(|b| b.distribution_effectivity * config.beacon_count)
            .unwrap_or(0.0);
        if beacon_scale > 0.0 {
            for module in config
                .beacon_modules
                .iter()
                .filter_map(|&m| catalog.module(m))
            {
                speed += module.effects.speed * beacon_scale;
                productivity += module.effects.productivity * beacon_scale;
                consumption += module.effects.consumption * beacon_scale;
            }
        }

        Self {
            speed: (1.0 + speed).max(0.2),
            productivity: (1.0 + productivity).max(0.0),
            consumption: (1.0 + consumption).max(0.2),
        }
    }
}

// ---------------------------------------------------------------------------
// Node variants
// ---------------------------------------------------------------------------

/// The four node variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Produces a single item from nothing.
    Supplier { item: ItemId },
    /// Drains a single item.
    Consumer { item: ItemId },
    /// Relays a single item unchanged.
    Passthrough { item: ItemId },
    /// Runs a recipe in an assigned machine.
    Recipe(RecipeConfig),
}

/// A production-graph vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
    pub rate_mode: RateMode,
    /// Only meaningful when `rate_mode` is `Manual`.
    pub desired_rate: f64,
    pub(crate) actual_rate: f64,
    pub(crate) solver_error: bool,
}

impl Node {
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            kind,
            position,
            rate_mode: RateMode::Auto,
            desired_rate: 0.0,
            actual_rate: 0.0,
            solver_error: false,
        }
    }

    /// Rate written by the last successful solve (0 after an infeasible one).
    pub fn actual_rate(&self) -> f64 {
        self.actual_rate
    }

    /// Set when the node's component had no feasible solution.
    pub fn has_error(&self) -> bool {
        self.solver_error
    }

    pub fn recipe_config(&self) -> Option<&RecipeConfig> {
        match &self.kind {
            NodeKind::Recipe(config) => Some(config),
            _ => None,
        }
    }

    /// Conditioning hint: spread of the recipe's amounts, 1 for other kinds.
    pub fn max_io_ratio(&self, catalog: &Catalog) -> f64 {
        self.recipe_config()
            .and_then(|c| catalog.recipe(c.recipe))
            .map(|r| r.max_io_ratio())
            .unwrap_or(1.0)
    }
}

// ---------------------------------------------------------------------------
// Rate contract
// ---------------------------------------------------------------------------

/// Per-item flow multipliers of a node.
pub trait RateContract {
    /// Items the node accepts, sorted and deduplicated.
    fn inputs(&self, catalog: &Catalog) -> Vec<ItemId>;
    /// Items the node emits, sorted and deduplicated.
    fn outputs(&self, catalog: &Catalog) -> Vec<ItemId>;
    /// `item_flow = multiplier * node_rate` on the input side. `None` when the
    /// node does not accept `item`.
    fn input_rate_for(&self, catalog: &Catalog, item: ItemId) -> Option<f64>;
    /// Output-side counterpart of [`RateContract::input_rate_for`].
    fn output_rate_for(&self, catalog: &Catalog, item: ItemId) -> Option<f64>;
}

impl RateContract for NodeKind {
    fn inputs(&self, catalog: &Catalog) -> Vec<ItemId> {
        match self {
            NodeKind::Supplier { .. } => Vec::new(),
            NodeKind::Consumer { item } | NodeKind::Passthrough { item } => vec![*item],
            NodeKind::Recipe(config) => {
                let mut items: Vec<ItemId> = catalog
                    .recipe(config.recipe)
                    .map(|r| r.ingredient_items().into_iter().collect())
                    .unwrap_or_default();
                if config.burns_fuel(catalog)
                    && let Some(fuel) = config.fuel
                {
                    items.push(fuel);
                }
                items.sort();
                items.dedup();
                items
            }
        }
    }

    fn outputs(&self, catalog: &Catalog) -> Vec<ItemId> {
        match self {
            NodeKind::Consumer { .. } => Vec::new(),
            NodeKind::Supplier { item } | NodeKind::Passthrough { item } => vec![*item],
            NodeKind::Recipe(config) => {
                let mut items: Vec<ItemId> = catalog
                    .recipe(config.recipe)
                    .map(|r| r.product_items().into_iter().collect())
                    .unwrap_or_default();
                if config.burns_fuel(catalog)
                    && let Some(burnt) = config.burnt_item(catalog)
                {
                    items.push(burnt);
                }
                items.sort();
                items.dedup();
                items
            }
        }
    }

    fn input_rate_for(&self, catalog: &Catalog, item: ItemId) -> Option<f64> {
        match self {
            NodeKind::Supplier { .. } => None,
            NodeKind::Consumer { item: own } | NodeKind::Passthrough { item: own } => {
                (*own == item).then_some(1.0)
            }
            NodeKind::Recipe(config) => {
                if !self.inputs(catalog).contains(&item) {
                    return None;
                }
                let mut rate = catalog
                    .recipe(config.recipe)
                    .map(|r| r.ingredient_amount(item))
                    .unwrap_or(0.0)
                    * config.crafts_per_second(catalog);
                if config.burns_fuel(catalog) && config.fuel == Some(item) {
                    rate += config.fuel_per_second(catalog);
                }
                Some(rate)
            }
        }
    }

    fn output_rate_for(&self, catalog: &Catalog, item: ItemId) -> Option<f64> {
        match self {
            NodeKind::Consumer { .. } => None,
            NodeKind::Supplier { item: own } | NodeKind::Passthrough { item: own } => {
                (*own == item).then_some(1.0)
            }
            NodeKind::Recipe(config) => {
                if !self.outputs(catalog).contains(&item) {
                    return None;
                }
                let effects = ResolvedEffects::resolve(config, catalog);
                let mut rate = catalog
                    .recipe(config.recipe)
                    .map(|r| r.product_amount(item))
                    .unwrap_or(0.0)
                    * config.crafts_per_second(catalog)
                    * effects.productivity;
                if config.burns_fuel(catalog) && config.burnt_item(catalog) == Some(item) {
                    rate += config.fuel_per_second(catalog);
                }
                Some(rate)
            }
        }
    }
}

impl RateContract for Node {
    fn inputs(&self, catalog: &Catalog) -> Vec<ItemId> {
        self.kind.inputs(catalog)
    }

    fn outputs(&self, catalog: &Catalog) -> Vec<ItemId> {
        self.kind.outputs(catalog)
    }

    fn input_rate_for(&self, catalog: &Catalog, item: ItemId) -> Option<f64> {
        self.kind.input_rate_for(catalog, item)
    }

    fn output_rate_for(&self, catalog: &Catalog, item: ItemId) -> Option<f64> {
        self.kind.output_rate_for(catalog, item)
    }
}
