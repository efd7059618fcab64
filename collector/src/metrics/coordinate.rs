use serde::{
    Deserialize,
    Serialize,
};

/// Network coordinate of one node as published by the agents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    #[serde(rename = "Vec", default)]
    pub vector: Vec<f64>,
    #[serde(rename = "Error", default)]
    pub error_estimate: f64,
    #[serde(rename = "Adjustment", default)]
    pub adjustment: f64,
    #[serde(rename = "Height", default)]
    pub height: f64,
}

/// Element of `/v1/coordinate/nodes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CoordinateEntry {
    pub node: String,
    #[serde(default)]
    pub segment: String,
    pub coord: Coordinate,
}

impl CoordinateEntry {
    pub fn new(node: impl Into<String>, coord: Coordinate) -> Self {
        Self {
            node: node.into(),
            segment: String::new(),
            coord,
        }
    }
}
