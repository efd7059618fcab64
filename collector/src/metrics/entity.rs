use super::MetricRecord;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

/// Identity of something metrics and inventory are reported for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub id_attributes: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            id_attributes: BTreeMap::new(),
        }
    }

    pub fn with_id_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.id_attributes.insert(key.into(), value.into());
        self
    }

    /// `<type>:<name>`, the way the entity is referenced from samples.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.entity_type, self.name)
    }
}

/// Inventory of one entity: item key, then field, then value.
pub type Inventory = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// Everything collected for a single entity in one cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityData {
    pub entity: Entity,
    pub metrics: Vec<MetricRecord>,
    pub inventory: Inventory,
}

impl EntityData {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            metrics: Vec::new(),
            inventory: Inventory::new(),
        }
    }
}
