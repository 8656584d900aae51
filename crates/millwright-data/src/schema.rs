//! Serde structs for graph snapshots.
//!
//! Keys are PascalCase. Node and rate types are written as their integer
//! codes and positions as `"x,y"` strings. Optional fields are written as
//! `null` rather than omitted so the same structs also round-trip through
//! the binary encoding.

use crate::recipe_short::RecipeShort;
use millwright_core::node::{Position, RateMode};
use serde::{Deserialize, Serialize};

// ===========================================================================
// Snapshot
// ===========================================================================

/// A serialisable graph, or a subset of one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphSnapshot {
    /// Every item the included nodes touch, fuel and burnt items included.
    pub included_items: Vec<String>,
    /// Normal recipes first, then missing ones.
    pub included_recipes: Vec<RecipeShort>,
    pub included_assemblers: Vec<String>,
    pub included_modules: Vec<String>,
    pub included_beacons: Vec<String>,
    pub nodes: Vec<NodeData>,
    pub node_links: Vec<LinkData>,
}

// ===========================================================================
// Nodes
// ===========================================================================

/// Integer-coded node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeType {
    Supplier = 0,
    Consumer = 1,
    Passthrough = 2,
    Recipe = 3,
}

impl TryFrom<u8> for NodeType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NodeType::Supplier),
            1 => Ok(NodeType::Consumer),
            2 => Ok(NodeType::Passthrough),
            3 => Ok(NodeType::Recipe),
            other => Err(format!("unknown node type {other}")),
        }
    }
}

impl From<NodeType> for u8 {
    fn from(t: NodeType) -> u8 {
        t as u8
    }
}

/// Integer-coded rate mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RateType {
    #[default]
    Auto = 0,
    Manual = 1,
}

impl TryFrom<u8> for RateType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RateType::Auto),
            1 => Ok(RateType::Manual),
            other => Err(format!("unknown rate type {other}")),
        }
    }
}

impl From<RateType> for u8 {
    fn from(t: RateType) -> u8 {
        t as u8
    }
}

impl From<RateMode> for RateType {
    fn from(mode: RateMode) -> Self {
        match mode {
            RateMode::Auto => RateType::Auto,
            RateMode::Manual => RateType::Manual,
        }
    }
}

impl From<RateType> for RateMode {
    fn from(t: RateType) -> Self {
        match t {
            RateType::Auto => RateMode::Auto,
            RateType::Manual => RateMode::Manual,
        }
    }
}

/// A node position written as `"x,y"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(pub Position);

impl TryFrom<String> for Location {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("location '{s}' is not 'x,y'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|e| format!("location '{s}': {e}"))
        };
        Ok(Location(Position::new(parse(x)?, parse(y)?)))
    }
}

impl From<Location> for String {
    fn from(l: Location) -> String {
        format!("{},{}", l.0.x, l.0.y)
    }
}

/// One node. `Item` is set for supplier, consumer and pass-through nodes;
/// the recipe fields only for recipe nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeData {
    /// Snapshot-local id referenced by links.
    #[serde(rename = "NodeID")]
    pub node_id: u32,
    pub node_type: NodeType,
    pub location: Location,
    pub rate_type: RateType,
    #[serde(default)]
    pub desired_rate: f64,

    #[serde(default)]
    pub item: Option<String>,

    /// Key into [`GraphSnapshot::included_recipes`].
    #[serde(rename = "RecipeID", default)]
    pub recipe_id: Option<i64>,
    #[serde(default)]
    pub assembler: Option<String>,
    #[serde(default)]
    pub assembler_modules: Vec<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub burnt: Option<String>,
    #[serde(default)]
    pub beacon: Option<String>,
    #[serde(default)]
    pub beacon_modules: Vec<String>,
    #[serde(default)]
    pub beacon_count: f64,
}

impl NodeData {
    /// A single-item node with Auto rate and no recipe fields.
    pub fn item_node(node_id: u32, node_type: NodeType, item: &str, position: Position) -> Self {
        Self {
            node_id,
            node_type,
            location: Location(position),
            rate_type: RateType::Auto,
            desired_rate: 0.0,
            item: Some(item.to_string()),
            recipe_id: None,
            assembler: None,
            assembler_modules: Vec::new(),
            fuel: None,
            burnt: None,
            beacon: None,
            beacon_modules: Vec::new(),
            beacon_count: 0.0,
        }
    }

    /// A recipe node with Auto rate and no modules.
    pub fn recipe_node(node_id: u32, recipe_id: i64, assembler: &str, position: Position) -> Self {
        Self {
            node_id,
            node_type: NodeType::Recipe,
            location: Location(position),
            rate_type: RateType::Auto,
            desired_rate: 0.0,
            item: None,
            recipe_id: Some(recipe_id),
            assembler: Some(assembler.to_string()),
            assembler_modules: Vec::new(),
            fuel: None,
            burnt: None,
            beacon: None,
            beacon_modules: Vec::new(),
            beacon_count: 0.0,
        }
    }
}

// ===========================================================================
// Links
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    #[serde(rename = "SupplierID")]
    pub supplier_id: u32,
    #[serde(rename = "ConsumerID")]
    pub consumer_id: u32,
    #[serde(rename = "Item")]
    pub item: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_parses_and_prints() {
        let l = Location::try_from("12,-40".to_string()).unwrap();
        assert_eq!(l.0, Position::new(12, -40));
        assert_eq!(String::from(l), "12,-40");
        assert!(Location::try_from("12".to_string()).is_err());
        assert!(Location::try_from("a,b".to_string()).is_err());
    }

    #[test]
    fn node_uses_pascal_case_and_codes() {
        let node = NodeData::item_node(4, NodeType::Consumer, "iron-plate", Position::new(1, 2));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["NodeID"], 4);
        assert_eq!(json["NodeType"], 1);
        assert_eq!(json["Location"], "1,2");
        assert_eq!(json["RateType"], 0);
        assert_eq!(json["Item"], "iron-plate");
        assert!(json["RecipeID"].is_null());
    }

    #[test]
    fn unknown_node_type_rejected() {
        let json = r#"{"NodeID":0,"NodeType":9,"Location":"0,0","RateType":0}"#;
        let err = serde_json::from_str::<NodeData>(json).unwrap_err();
        assert!(err.to_string().contains("unknown node type 9"), "got: {err}");
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let json = r#"{"NodeID":3,"NodeType":0,"Location":"5,6","RateType":1,"DesiredRate":2.5,"Item":"coal"}"#;
        let node: NodeData = serde_json::from_str(json).unwrap();
        assert_eq!(node.rate_type, RateType::Manual);
        assert_eq!(node.desired_rate, 2.5);
        assert!(node.assembler.is_none());
        assert!(node.beacon_modules.is_empty());
    }

    #[test]
    fn link_keys() {
        let link = LinkData {
            supplier_id: 1,
            consumer_id: 2,
            item: "coal".into(),
        };
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(json, r#"{"SupplierID":1,"ConsumerID":2,"Item":"coal"}"#);
    }
}
