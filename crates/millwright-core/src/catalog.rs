//! Game-data catalog: items, recipes, assemblers, modules and beacons.
//!
//! Content is registered on a [`CatalogBuilder`] and frozen into a
//! [`Catalog`] by [`CatalogBuilder::build`], which validates item references
//! and derives the per-item temperature-dependence flag. After build the only
//! mutation allowed is the creation of *missing placeholders*: stand-in
//! entities for names found in an imported graph that the live catalog does
//! not know about.

use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Temperatures
// ---------------------------------------------------------------------------

/// Accepted temperature band for a fluid ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    /// When set, the range is not shown and any temperature is accepted.
    pub ignore: bool,
}

impl TemperatureRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            ignore: false,
        }
    }

    pub fn exact(temperature: f64) -> Self {
        Self::new(temperature, temperature)
    }

    /// Accepts every temperature and renders no suffix.
    pub fn any() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            ignore: true,
        }
    }

    pub fn contains(&self, temperature: f64) -> bool {
        self.ignore || (temperature >= self.min && temperature <= self.max)
    }
}

// ---------------------------------------------------------------------------
// Catalog entities
// ---------------------------------------------------------------------------

/// A solid or fluid item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub is_fluid: bool,
    pub default_temperature: f64,
    /// Energy released when burnt, in joules. Zero for non-fuels.
    pub fuel_value: f64,
    pub burn_result: Option<ItemId>,
    /// Derived at build: some recipe produces this fluid at a temperature
    /// other than its default.
    pub temperature_dependent: bool,
    pub is_missing: bool,
}

impl Item {
    fn new(name: &str, is_fluid: bool, default_temperature: f64, is_missing: bool) -> Self {
        Self {
            name: name.to_string(),
            is_fluid,
            default_temperature,
            fuel_value: 0.0,
            burn_result: None,
            temperature_dependent: false,
            is_missing,
        }
    }

    /// Display label for this item restricted to a temperature band.
    pub fn temperature_range_name(&self, range: &TemperatureRange) -> String {
        if range.ignore {
            return self.name.clone();
        }

        let include_min = range.min.is_finite();
        let include_max = range.max.is_finite();

        if range.min == range.max {
            format!("{} ({:.0}°)", self.name, range.min)
        } else if include_min && include_max {
            format!("{} ({:.0}°-{:.0}°)", self.name, range.min, range.max)
        } else if include_min {
            format!("{} (min {:.0}°)", self.name, range.min)
        } else if include_max {
            format!("{} (max {:.0}°)", self.name, range.max)
        } else {
            format!("{}(any°)", self.name)
        }
    }
}

/// A recipe ingredient.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub item: ItemId,
    pub amount: f64,
    pub temperature: Option<TemperatureRange>,
}

/// A recipe product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub item: ItemId,
    pub amount: f64,
    pub temperature: Option<f64>,
}

/// A recipe: fixed ingredient and product amounts per craft.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: String,
    /// Seconds per craft at crafting speed 1.
    pub time: f64,
    pub ingredients: Vec<Ingredient>,
    pub products: Vec<Product>,
    pub is_missing: bool,
}

impl Recipe {
    /// Amount of `item` consumed per craft (summed over duplicate entries).
    pub fn ingredient_amount(&self, item: ItemId) -> f64 {
        self.ingredients
            .iter()
            .filter(|i| i.item == item)
            .map(|i| i.amount)
            .sum()
    }

    /// Amount of `item` produced per craft (summed over duplicate entries).
    pub fn product_amount(&self, item: ItemId) -> f64 {
        self.products
            .iter()
            .filter(|p| p.item == item)
            .map(|p| p.amount)
            .sum()
    }

    pub fn ingredient_items(&self) -> BTreeSet<ItemId> {
        self.ingredients.iter().map(|i| i.item).collect()
    }

    pub fn product_items(&self) -> BTreeSet<ItemId> {
        self.products.iter().map(|p| p.item).collect()
    }

    /// Largest amount divided by smallest amount across every entry. 1 for
    /// recipes without positive amounts.
    pub fn max_io_ratio(&self) -> f64 {
        let amounts = self
            .ingredients
            .iter()
            .map(|i| i.amount)
            .chain(self.products.iter().map(|p| p.amount))
            .filter(|a| *a > 0.0);

        let (min, max) = amounts.fold((f64::INFINITY, 0.0f64), |(lo, hi), a| {
            (lo.min(a), hi.max(a))
        });
        if max > 0.0 { max / min } else { 1.0 }
    }

    /// Same name and same ingredient/product item sets; amounts ignored.
    pub fn same_structure(&self, other: &Recipe) -> bool {
        self.name == other.name
            && self.ingredient_items() == other.ingredient_items()
            && self.product_items() == other.product_items()
    }
}

/// A crafting machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembler {
    pub name: String,
    /// Crafting speed multiplier.
    pub speed: f64,
    pub base_productivity: f64,
    pub module_slots: u32,
    pub is_burner: bool,
    /// Energy drawn while working, in watts.
    pub energy_consumption: f64,
    /// Fuels a burner assembler accepts, in preference order.
    pub fuels: Vec<ItemId>,
    pub is_missing: bool,
}

/// Bonuses a module grants. All values are additive fractions (0.2 = +20%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleEffects {
    pub speed: f64,
    pub productivity: f64,
    pub consumption: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub effects: ModuleEffects,
    pub is_missing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Beacon {
    pub name: String,
    pub distribution_effectivity: f64,
    pub module_slots: u32,
    pub is_missing: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemId),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Catalog`].
/// Two-phase lifecycle: registration (with optional mutation) -> build.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<Item>,
    item_names: HashMap<String, ItemId>,
    recipes: Vec<Recipe>,
    recipe_names: HashMap<String, RecipeId>,
    assemblers: Vec<Assembler>,
    assembler_names: HashMap<String, AssemblerId>,
    modules: Vec<Module>,
    module_names: HashMap<String, ModuleId>,
    beacons: Vec<Beacon>,
    beacon_names: HashMap<String, BeaconId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a solid item. Returns its ID.
    pub fn register_item(&mut self, name: &str) -> Result<ItemId, CatalogError> {
        self.push_item(Item::new(name, false, 0.0, false))
    }

    /// Register a fluid with its default temperature. Returns its ID.
    pub fn register_fluid(
        &mut self,
        name: &str,
        default_temperature: f64,
    ) -> Result<ItemId, CatalogError> {
        self.push_item(Item::new(name, true, default_temperature, false))
    }

    fn push_item(&mut self, item: Item) -> Result<ItemId, CatalogError> {
        if self.item_names.contains_key(&item.name) {
            return Err(CatalogError::DuplicateName(item.name));
        }
        let id = ItemId(self.items.len() as u32);
        self.item_names.insert(item.name.clone(), id);
        self.items.push(item);
        Ok(id)
    }

    /// Register a recipe from `(item, amount)` pairs. Returns its ID.
    pub fn register_recipe(
        &mut self,
        name: &str,
        time: f64,
        ingredients: &[(ItemId, f64)],
        products: &[(ItemId, f64)],
    ) -> Result<RecipeId, CatalogError> {
        if self.recipe_names.contains_key(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(Recipe {
            name: name.to_string(),
            time,
            ingredients: ingredients
                .iter()
                .map(|&(item, amount)| Ingredient {
                    item,
                    amount,
                    temperature: None,
                })
                .collect(),
            products: products
                .iter()
                .map(|&(item, amount)| Product {
                    item,
                    amount,
                    temperature: None,
                })
                .collect(),
            is_missing: false,
        });
        self.recipe_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Register an electric assembler. Returns its ID.
    pub fn register_assembler(
        &mut self,
        name: &str,
        speed: f64,
        module_slots: u32,
    ) -> Result<AssemblerId, CatalogError> {
        if self.assembler_names.contains_key(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
        let id = AssemblerId(self.assemblers.len() as u32);
        self.assemblers.push(Assembler {
            name: name.to_string(),
            speed,
            base_productivity: 0.0,
            module_slots,
            is_burner: false,
            energy_consumption: 0.0,
            fuels: Vec::new(),
            is_missing: false,
        });
        self.assembler_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn register_module(
        &mut self,
        name: &str,
        effects: ModuleEffects,
    ) -> Result<ModuleId, CatalogError> {
        if self.module_names.contains_key(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module {
            name: name.to_string(),
            effects,
            is_missing: false,
        });
        self.module_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn register_beacon(
        &mut self,
        name: &str,
        distribution_effectivity: f64,
        module_slots: u32,
    ) -> Result<BeaconId, CatalogError> {
        if self.beacon_names.contains_key(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
        let id = BeaconId(self.beacons.len() as u32);
        self.beacons.push(Beacon {
            name: name.to_string(),
            distribution_effectivity,
            module_slots,
            is_missing: false,
        });
        self.beacon_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Mutate an existing item by name (fuel value, burn result, ...).
    pub fn mutate_item<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut Item),
    {
        let id = self
            .item_names
            .get(name)
            .ok_or(CatalogError::NotFound(name.to_string()))?;
        f(&mut self.items[id.0 as usize]);
        Ok(())
    }

    /// Mutate an existing recipe by name (temperatures, extra entries, ...).
    pub fn mutate_recipe<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut Recipe),
    {
        let id = self
            .recipe_names
            .get(name)
            .ok_or(CatalogError::NotFound(name.to_string()))?;
        f(&mut self.recipes[id.0 as usize]);
        Ok(())
    }

    /// Mutate an existing assembler by name (burner settings, productivity, ...).
    pub fn mutate_assembler<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut Assembler),
    {
        let id = self
            .assembler_names
            .get(name)
            .ok_or(CatalogError::NotFound(name.to_string()))?;
        f(&mut self.assemblers[id.0 as usize]);
        Ok(())
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_names.get(name).copied()
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_names.get(name).copied()
    }

    /// Validate references, derive temperature dependence and freeze.
    pub fn build(mut self) -> Result<Catalog, CatalogError> {
        let item_count = self.items.len();
        let check = |item: ItemId| {
            if (item.0 as usize) < item_count {
                Ok(())
            } else {
                Err(CatalogError::InvalidItemRef(item))
            }
        };

        for recipe in &self.recipes {
            for item in recipe.ingredient_items().into_iter().chain(recipe.product_items()) {
                check(item)?;
            }
        }
        for assembler in &self.assemblers {
            for &fuel in &assembler.fuels {
                check(fuel)?;
            }
        }
        for item in &self.items {
            if let Some(burnt) = item.burn_result {
                check(burnt)?;
            }
        }

        for recipe in &self.recipes {
            for product in &recipe.products {
                let Some(temperature) = product.temperature else {
                    continue;
                };
                let item = &mut self.items[product.item.0 as usize];
                if item.is_fluid && temperature != item.default_temperature {
                    item.temperature_dependent = true;
                }
            }
        }

        Ok(Catalog {
            items: self.items,
            item_names: self.item_names,
            recipes: self.recipes,
            recipe_names: self.recipe_names,
            assemblers: self.assemblers,
            assembler_names: self.assembler_names,
            modules: self.modules,
            module_names: self.module_names,
            beacons: self.beacons,
            beacon_names: self.beacon_names,
            missing_items: HashMap::new(),
            missing_recipes: Vec::new(),
            missing_assemblers: HashMap::new(),
            missing_modules: HashMap::new(),
            missing_beacons: HashMap::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Frozen catalog. Live entries never change after build; missing
/// placeholders are appended on demand and never reachable by name lookup.
#[derive(Debug)]
pub struct Catalog {
    items: Vec<Item>,
    item_names: HashMap<String, ItemId>,
    recipes: Vec<Recipe>,
    recipe_names: HashMap<String, RecipeId>,
    assemblers: Vec<Assembler>,
    assembler_names: HashMap<String, AssemblerId>,
    modules: Vec<Module>,
    module_names: HashMap<String, ModuleId>,
    beacons: Vec<Beacon>,
    beacon_names: HashMap<String, BeaconId>,

    missing_items: HashMap<String, ItemId>,
    /// Missing recipes are matched structurally, several may share a name.
    missing_recipes: Vec<RecipeId>,
    missing_assemblers: HashMap<String, AssemblerId>,
    missing_modules: HashMap<String, ModuleId>,
    missing_beacons: HashMap<String, BeaconId>,
}

impl Catalog {
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0 as usize)
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.0 as usize)
    }

    pub fn assembler(&self, id: AssemblerId) -> Option<&Assembler> {
        self.assemblers.get(id.0 as usize)
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0 as usize)
    }

    pub fn beacon(&self, id: BeaconId) -> Option<&Beacon> {
        self.beacons.get(id.0 as usize)
    }

    /// Live item lookup by name. Missing placeholders are not returned.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_names.get(name).copied()
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_names.get(name).copied()
    }

    pub fn assembler_id(&self, name: &str) -> Option<AssemblerId> {
        self.assembler_names.get(name).copied()
    }

    pub fn module_id(&self, name: &str) -> Option<ModuleId> {
        self.module_names.get(name).copied()
    }

    pub fn beacon_id(&self, name: &str) -> Option<BeaconId> {
        self.beacon_names.get(name).copied()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn missing_item_count(&self) -> usize {
        self.missing_items.len()
    }

    pub fn missing_recipe_count(&self) -> usize {
        self.missing_recipes.len()
    }

    /// First fuel a burner assembler accepts, if any.
    pub fn default_fuel(&self, assembler: AssemblerId) -> Option<ItemId> {
        self.assembler(assembler)
            .filter(|a| a.is_burner)
            .and_then(|a| a.fuels.first().copied())
    }

    // -----------------------------------------------------------------------
    // Missing placeholders
    // -----------------------------------------------------------------------

    /// Resolve an item name, creating a missing placeholder if unknown.
    pub fn item_or_missing(&mut self, name: &str) -> ItemId {
        if let Some(id) = self.item_id(name) {
            return id;
        }
        if let Some(&id) = self.missing_items.get(name) {
            return id;
        }
        let id = ItemId(self.items.len() as u32);
        self.items.push(Item::new(name, false, 0.0, true));
        self.missing_items.insert(name.to_string(), id);
        tracing::debug!(name, "created missing item placeholder");
        id
    }

    pub fn assembler_or_missing(&mut self, name: &str) -> AssemblerId {
        if let Some(id) = self.assembler_id(name) {
            return id;
        }
        if let Some(&id) = self.missing_assemblers.get(name) {
            return id;
        }
        let id = AssemblerId(self.assemblers.len() as u32);
        self.assemblers.push(Assembler {
            name: name.to_string(),
            speed: 1.0,
            base_productivity: 0.0,
            module_slots: 0,
            is_burner: false,
            energy_consumption: 0.0,
            fuels: Vec::new(),
            is_missing: true,
        });
        self.missing_assemblers.insert(name.to_string(), id);
        tracing::debug!(name, "created missing assembler placeholder");
        id
    }

    pub fn module_or_missing(&mut self, name: &str) -> ModuleId {
        if let Some(id) = self.module_id(name) {
            return id;
        }
        if let Some(&id) = self.missing_modules.get(name) {
            return id;
        }
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module {
            name: name.to_string(),
            effects: ModuleEffects::default(),
            is_missing: true,
        });
        self.missing_modules.insert(name.to_string(), id);
        tracing::debug!(name, "created missing module placeholder");
        id
    }

    pub fn beacon_or_missing(&mut self, name: &str) -> BeaconId {
        if let Some(id) = self.beacon_id(name) {
            return id;
        }
        if let Some(&id) = self.missing_beacons.get(name) {
            return id;
        }
        let id = BeaconId(self.beacons.len() as u32);
        self.beacons.push(Beacon {
            name: name.to_string(),
            distribution_effectivity: 0.0,
            module_slots: 0,
            is_missing: true,
        });
        self.missing_beacons.insert(name.to_string(), id);
        tracing::debug!(name, "created missing beacon placeholder");
        id
    }

    /// Resolve a recipe by name and structure.
    ///
    /// A live recipe is used only when its ingredient and product item sets
    /// match. Otherwise an existing missing recipe with the same structure is
    /// reused, or a new one is created with the given amounts.
    pub fn recipe_or_missing(
        &mut self,
        name: &str,
        ingredients: &[(ItemId, f64)],
        products: &[(ItemId, f64)],
    ) -> RecipeId {
        let candidate = Recipe {
            name: name.to_string(),
            time: 1.0,
            ingredients: ingredients
                .iter()
                .map(|&(item, amount)| Ingredient {
                    item,
                    amount,
                    temperature: None,
                })
                .collect(),
            products: products
                .iter()
                .map(|&(item, amount)| Product {
                    item,
                    amount,
                    temperature: None,
                })
                .collect(),
            is_missing: true,
        };

        if let Some(id) = self.recipe_id(name)
            && self.recipes[id.0 as usize].same_structure(&candidate)
        {
            return id;
        }
        if let Some(&id) = self
            .missing_recipes
            .iter()
            .find(|id| self.recipes[id.0 as usize].same_structure(&candidate))
        {
            return id;
        }

        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(candidate);
        self.missing_recipes.push(id);
        tracing::debug!(name, "created missing recipe placeholder");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_builder() -> CatalogBuilder {
        let mut b = CatalogBuilder::new();
        let ore = b.register_item("iron-ore").unwrap();
        let plate = b.register_item("iron-plate").unwrap();
        b.register_recipe("iron-plate", 3.2, &[(ore, 1.0)], &[(plate, 1.0)])
            .unwrap();
        b.register_assembler("stone-furnace", 1.0, 0).unwrap();
        b
    }

    #[test]
    fn register_and_build() {
        let catalog = setup_builder().build().unwrap();
        assert_eq!(catalog.item_count(), 2);
        assert_eq!(catalog.recipe_count(), 1);
        assert!(catalog.assembler_id("stone-furnace").is_some());
    }

    #[test]
    fn duplicate_item_rejected() {
        let mut b = setup_builder();
        let result = b.register_item("iron-ore");
        assert!(matches!(result, Err(CatalogError::DuplicateName(name)) if name == "iron-ore"));
    }

    #[test]
    fn invalid_item_ref_in_recipe_fails() {
        let mut b = CatalogBuilder::new();
        b.register_recipe("bad", 1.0, &[(ItemId(99), 1.0)], &[])
            .unwrap();
        match b.build() {
            Err(CatalogError::InvalidItemRef(id)) => assert_eq!(id, ItemId(99)),
            other => panic!("expected InvalidItemRef, got: {other:?}"),
        }
    }

    #[test]
    fn mutate_nonexistent_fails() {
        let mut b = setup_builder();
        assert!(b.mutate_item("nope", |_| {}).is_err());
        assert!(b.mutate_recipe("nope", |_| {}).is_err());
        assert!(b.mutate_assembler("nope", |_| {}).is_err());
    }

    #[test]
    fn fluid_produced_off_default_is_temperature_dependent() {
        let mut b = CatalogBuilder::new();
        let water = b.register_fluid("water", 15.0).unwrap();
        let steam = b.register_fluid("steam", 15.0).unwrap();
        b.register_recipe("boil", 1.0, &[(water, 60.0)], &[(steam, 60.0)])
            .unwrap();
        b.mutate_recipe("boil", |r| r.products[0].temperature = Some(165.0))
            .unwrap();
        let catalog = b.build().unwrap();

        assert!(catalog.item(steam).unwrap().temperature_dependent);
        assert!(!catalog.item(water).unwrap().temperature_dependent);
    }

    #[test]
    fn solid_product_temperature_ignored() {
        let mut b = CatalogBuilder::new();
        let ore = b.register_item("ore").unwrap();
        b.register_recipe("mine", 1.0, &[], &[(ore, 1.0)]).unwrap();
        b.mutate_recipe("mine", |r| r.products[0].temperature = Some(500.0))
            .unwrap();
        let catalog = b.build().unwrap();
        assert!(!catalog.item(ore).unwrap().temperature_dependent);
    }

    #[test]
    fn temperature_range_names() {
        let steam = Item::new("steam", true, 15.0, false);
        assert_eq!(steam.temperature_range_name(&TemperatureRange::any()), "steam");
        assert_eq!(
            steam.temperature_range_name(&TemperatureRange::exact(165.0)),
            "steam (165°)"
        );
        assert_eq!(
            steam.temperature_range_name(&TemperatureRange::new(15.0, 90.0)),
            "steam (15°-90°)"
        );
        assert_eq!(
            steam.temperature_range_name(&TemperatureRange::new(100.0, f64::INFINITY)),
            "steam (min 100°)"
        );
        assert_eq!(
            steam.temperature_range_name(&TemperatureRange::new(f64::NEG_INFINITY, 50.0)),
            "steam (max 50°)"
        );
        assert_eq!(
            steam.temperature_range_name(&TemperatureRange::new(
                f64::NEG_INFINITY,
                f64::INFINITY
            )),
            "steam(any°)"
        );
    }

    #[test]
    fn max_io_ratio_spans_all_entries() {
        let mut b = CatalogBuilder::new();
        let a = b.register_item("a").unwrap();
        let c = b.register_item("c").unwrap();
        b.register_recipe("r", 1.0, &[(a, 2.0)], &[(c, 10.0)]).unwrap();
        b.register_recipe("empty", 1.0, &[], &[]).unwrap();
        let catalog = b.build().unwrap();
        assert_eq!(catalog.recipe(RecipeId(0)).unwrap().max_io_ratio(), 5.0);
        assert_eq!(catalog.recipe(RecipeId(1)).unwrap().max_io_ratio(), 1.0);
    }

    #[test]
    fn item_or_missing_reuses_placeholder() {
        let mut catalog = setup_builder().build().unwrap();
        let live = catalog.item_or_missing("iron-ore");
        assert_eq!(Some(live), catalog.item_id("iron-ore"));

        let first = catalog.item_or_missing("unobtainium");
        let second = catalog.item_or_missing("unobtainium");
        assert_eq!(first, second);
        assert!(catalog.item(first).unwrap().is_missing);
        assert_eq!(catalog.missing_item_count(), 1);
        // Placeholders are never found by live lookup.
        assert!(catalog.item_id("unobtainium").is_none());
    }

    #[test]
    fn recipe_or_missing_matches_structure() {
        let mut catalog = setup_builder().build().unwrap();
        let ore = catalog.item_id("iron-ore").unwrap();
        let plate = catalog.item_id("iron-plate").unwrap();

        // Same item sets, different amounts: still the live recipe.
        let live = catalog.recipe_or_missing("iron-plate", &[(ore, 5.0)], &[(plate, 5.0)]);
        assert_eq!(Some(live), catalog.recipe_id("iron-plate"));

        // Same name, different structure: two distinct missing recipes.
        let m1 = catalog.recipe_or_missing("iron-plate", &[(plate, 1.0)], &[(ore, 1.0)]);
        let m2 = catalog.recipe_or_missing("iron-plate", &[], &[(ore, 1.0)]);
        let m1_again = catalog.recipe_or_missing("iron-plate", &[(plate, 2.0)], &[(ore, 2.0)]);
        assert_ne!(m1, live);
        assert_ne!(m1, m2);
        assert_eq!(m1, m1_again);
        assert!(catalog.recipe(m1).unwrap().is_missing);
        assert_eq!(catalog.missing_recipe_count(), 2);
    }

    #[test]
    fn default_fuel_only_for_burners() {
        let mut b = setup_builder();
        b.mutate_item("iron-ore", |i| i.fuel_value = 1.0).unwrap();
        let ore = b.item_id("iron-ore").unwrap();
        b.mutate_assembler("stone-furnace", |a| {
            a.is_burner = true;
            a.fuels.push(ore);
        })
        .unwrap();
        b.register_assembler("electric-furnace", 2.0, 2).unwrap();
        let catalog = b.build().unwrap();

        let stone = catalog.assembler_id("stone-furnace").unwrap();
        let electric = catalog.assembler_id("electric-furnace").unwrap();
        assert_eq!(catalog.default_fuel(stone), Some(ore));
        assert_eq!(catalog.default_fuel(electric), None);
    }
}
