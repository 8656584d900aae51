//! Name-based recipe summaries carried inside graph snapshots.

use millwright_core::catalog::{Catalog, Recipe};
use millwright_core::id::RecipeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recipe as written to a snapshot: names instead of catalog ids, so it
/// can be matched against a different catalog on import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecipeShort {
    pub name: String,
    /// Snapshot-local key that recipe nodes refer to.
    #[serde(rename = "RecipeID")]
    pub recipe_id: i64,
    #[serde(rename = "isMissing")]
    pub is_missing: bool,
    pub ingredients: BTreeMap<String, f64>,
    pub products: BTreeMap<String, f64>,
}

impl RecipeShort {
    /// An empty summary for a name, with no snapshot key.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            recipe_id: -1,
            is_missing: false,
            ingredients: BTreeMap::new(),
            products: BTreeMap::new(),
        }
    }

    /// Summarise a catalog recipe. Entries naming unknown items are dropped.
    pub fn from_recipe(catalog: &Catalog, id: RecipeId, recipe: &Recipe) -> Self {
        let name_of = |item| catalog.item(item).map(|i| i.name.clone());

        let mut ingredients = BTreeMap::new();
        for ingredient in &recipe.ingredients {
            if let Some(name) = name_of(ingredient.item) {
                *ingredients.entry(name).or_insert(0.0) += ingredient.amount;
            }
        }
        let mut products = BTreeMap::new();
        for product in &recipe.products {
            if let Some(name) = name_of(product.item) {
                *products.entry(name).or_insert(0.0) += product.amount;
            }
        }

        Self {
            name: recipe.name.clone(),
            recipe_id: i64::from(id.0),
            is_missing: recipe.is_missing,
            ingredients,
            products,
        }
    }

    /// Same name and same ingredient/product item names; amounts ignored.
    pub fn same_structure(&self, other: &RecipeShort) -> bool {
        self.name == other.name
            && self.ingredients.keys().eq(other.ingredients.keys())
            && self.products.keys().eq(other.products.keys())
    }
}

/// Name plus every ingredient and product with its amount. The snapshot key
/// and missing flag do not take part.
impl PartialEq for RecipeShort {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ingredients == other.ingredients
            && self.products == other.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millwright_core::test_utils::*;

    fn short(name: &str, ingredients: &[(&str, f64)], products: &[(&str, f64)]) -> RecipeShort {
        let mut r = RecipeShort::named(name);
        r.ingredients = ingredients.iter().map(|&(n, a)| (n.to_string(), a)).collect();
        r.products = products.iter().map(|&(n, a)| (n.to_string(), a)).collect();
        r
    }

    #[test]
    fn from_catalog_recipe_uses_item_names() {
        let catalog = test_catalog();
        let id = gear_recipe().recipe;
        let recipe = catalog.recipe(id).unwrap();
        let s = RecipeShort::from_recipe(&catalog, id, recipe);

        assert_eq!(s.name, "iron-gear-wheel");
        assert_eq!(s.recipe_id, 2);
        assert!(!s.is_missing);
        assert_eq!(s.ingredients.get("iron-plate"), Some(&2.0));
        assert_eq!(s.products.get("iron-gear-wheel"), Some(&1.0));
    }

    #[test]
    fn equality_includes_amounts_but_not_key() {
        let mut a = short("gear", &[("plate", 2.0)], &[("gear", 1.0)]);
        let b = short("gear", &[("plate", 2.0)], &[("gear", 1.0)]);
        a.recipe_id = 7;
        a.is_missing = true;
        assert_eq!(a, b);

        let c = short("gear", &[("plate", 3.0)], &[("gear", 1.0)]);
        assert_ne!(a, c);
        assert!(a.same_structure(&c));
    }

    #[test]
    fn structure_compares_item_sets() {
        let a = short("x", &[("a", 1.0)], &[("b", 1.0)]);
        let b = short("x", &[("a", 1.0), ("c", 1.0)], &[("b", 1.0)]);
        let c = short("y", &[("a", 1.0)], &[("b", 1.0)]);
        assert!(!a.same_structure(&b));
        assert!(!a.same_structure(&c));
    }
}
